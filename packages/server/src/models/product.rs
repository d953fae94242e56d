use chrono::{DateTime, Utc};
use common::storage::FilePayload;
use serde::Serialize;

use crate::error::AppError;
use crate::extractors::form::ParsedForm;

use super::price::PriceOptionResponse;
use super::shared::{optional_max_len, parse_features, require_len, validate_slug_field};

/// Fields submitted by the admin product form (multipart).
pub struct ProductForm {
    pub name: String,
    pub slug: Option<String>,
    pub service_id: i32,
    pub description: Option<String>,
    pub features: serde_json::Value,
    pub is_active: bool,
    pub thumbnail: Option<FilePayload>,
    pub detail_image: Option<FilePayload>,
}

impl ProductForm {
    pub fn from_form(form: &mut ParsedForm) -> Result<Self, AppError> {
        let service_id = form
            .required_text("service_id")?
            .parse::<i32>()
            .map_err(|_| AppError::Validation("Service must be selected".into()))?;

        Ok(Self {
            name: form.required_text("name")?.to_string(),
            slug: form.text("slug").map(|s| s.to_string()),
            service_id,
            description: form.text("description").map(|s| s.to_string()),
            features: parse_features(form.text("features"))?,
            is_active: form.flag("is_active"),
            thumbnail: form.take_file("thumbnail"),
            detail_image: form.take_file("detail_image"),
        })
    }
}

pub fn validate_product_form(form: &ProductForm) -> Result<(), AppError> {
    require_len("Name", &form.name, 3, 256)?;
    if let Some(ref slug) = form.slug {
        validate_slug_field(slug)?;
    }
    optional_max_len("Description", form.description.as_deref(), 10_000)?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub service_id: i32,
    pub description: Option<String>,
    pub features: serde_json::Value,
    pub thumbnail: Option<String>,
    pub detail_image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::product::Model> for ProductResponse {
    fn from(m: crate::entity::product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            service_id: m.service_id,
            description: m.description,
            features: m.features,
            thumbnail: m.thumbnail,
            detail_image: m.detail_image,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Public product detail: the product plus its pricing tiers.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub price_options: Vec<PriceOptionResponse>,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn form_with(fields: &[(&str, &str)]) -> ParsedForm {
        ParsedForm::from_parts(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            HashMap::new(),
        )
    }

    #[test]
    fn parses_a_complete_form() {
        let mut form = form_with(&[
            ("name", "IBS Core Basic"),
            ("service_id", "3"),
            ("features", r#"["Teller module", "Reporting"]"#),
            ("is_active", "true"),
        ]);
        let parsed = ProductForm::from_form(&mut form).unwrap();
        assert_eq!(parsed.name, "IBS Core Basic");
        assert_eq!(parsed.service_id, 3);
        assert_eq!(
            parsed.features,
            serde_json::json!(["Teller module", "Reporting"])
        );
        assert!(parsed.is_active);
        assert!(validate_product_form(&parsed).is_ok());
    }

    #[test]
    fn missing_service_is_a_validation_error() {
        let mut form = form_with(&[("name", "IBS Core Basic")]);
        assert!(matches!(
            ProductForm::from_form(&mut form),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn non_numeric_service_is_a_validation_error() {
        let mut form = form_with(&[("name", "IBS Core Basic"), ("service_id", "core")]);
        assert!(matches!(
            ProductForm::from_form(&mut form),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn malformed_features_rejected() {
        let mut form = form_with(&[
            ("name", "IBS Core Basic"),
            ("service_id", "1"),
            ("features", "not-json"),
        ]);
        assert!(ProductForm::from_form(&mut form).is_err());
    }
}
