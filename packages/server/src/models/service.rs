use chrono::{DateTime, Utc};
use common::storage::FilePayload;
use serde::Serialize;

use crate::error::AppError;
use crate::extractors::form::ParsedForm;

use super::shared::{optional_max_len, require_len, validate_slug_field};

/// Fields submitted by the admin service form (multipart).
pub struct ServiceForm {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub meta_description: Option<String>,
    pub is_active: bool,
    pub hero_image: Option<FilePayload>,
}

impl ServiceForm {
    pub fn from_form(form: &mut ParsedForm) -> Result<Self, AppError> {
        Ok(Self {
            title: form.required_text("title")?.to_string(),
            slug: form.text("slug").map(|s| s.to_string()),
            description: form.text("description").map(|s| s.to_string()),
            meta_description: form.text("meta_description").map(|s| s.to_string()),
            is_active: form.flag("is_active"),
            hero_image: form.take_file("hero_image"),
        })
    }
}

pub fn validate_service_form(form: &ServiceForm) -> Result<(), AppError> {
    require_len("Title", &form.title, 3, 256)?;
    if let Some(ref slug) = form.slug {
        validate_slug_field(slug)?;
    }
    optional_max_len("Description", form.description.as_deref(), 10_000)?;
    optional_max_len("Meta description", form.meta_description.as_deref(), 160)?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ServiceResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub meta_description: Option<String>,
    pub hero_image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::service::Model> for ServiceResponse {
    fn from(m: crate::entity::service::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            slug: m.slug,
            description: m.description,
            meta_description: m.meta_description,
            hero_image: m.hero_image,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_form() -> ServiceForm {
        ServiceForm {
            title: "Core Banking".into(),
            slug: None,
            description: None,
            meta_description: None,
            is_active: true,
            hero_image: None,
        }
    }

    #[test]
    fn accepts_minimal_form() {
        assert!(validate_service_form(&base_form()).is_ok());
    }

    #[test]
    fn rejects_short_title() {
        let mut form = base_form();
        form.title = "ab".into();
        assert!(validate_service_form(&form).is_err());
    }

    #[test]
    fn rejects_overlong_meta_description() {
        let mut form = base_form();
        form.meta_description = Some("x".repeat(161));
        assert!(validate_service_form(&form).is_err());
    }

    #[test]
    fn rejects_bad_explicit_slug() {
        let mut form = base_form();
        form.slug = Some("Not A Slug".into());
        assert!(validate_service_form(&form).is_err());
    }
}
