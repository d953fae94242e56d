use chrono::{DateTime, Utc};
use common::storage::FilePayload;
use serde::Serialize;

use crate::error::AppError;
use crate::extractors::form::ParsedForm;

use super::shared::{optional_max_len, require_len};

/// Fields submitted by the admin client form (multipart).
pub struct ClientForm {
    pub name: String,
    pub industry: Option<String>,
    pub testimonial: Option<String>,
    pub is_featured: bool,
    pub logo: Option<FilePayload>,
}

impl ClientForm {
    pub fn from_form(form: &mut ParsedForm) -> Result<Self, AppError> {
        Ok(Self {
            name: form.required_text("name")?.to_string(),
            industry: form.text("industry").map(|s| s.to_string()),
            testimonial: form.text("testimonial").map(|s| s.to_string()),
            is_featured: form.flag("is_featured"),
            logo: form.take_file("logo"),
        })
    }
}

pub fn validate_client_form(form: &ClientForm) -> Result<(), AppError> {
    require_len("Name", &form.name, 1, 256)?;
    optional_max_len("Industry", form.industry.as_deref(), 256)?;
    optional_max_len("Testimonial", form.testimonial.as_deref(), 2_000)?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClientResponse {
    pub id: i32,
    pub name: String,
    pub logo: Option<String>,
    pub industry: Option<String>,
    pub testimonial: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::client::Model> for ClientResponse {
    fn from(m: crate::entity::client::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            logo: m.logo,
            industry: m.industry,
            testimonial: m.testimonial,
            is_featured: m.is_featured,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required() {
        let form = ClientForm {
            name: "".into(),
            industry: None,
            testimonial: None,
            is_featured: false,
            logo: None,
        };
        assert!(validate_client_form(&form).is_err());
    }

    #[test]
    fn overlong_testimonial_rejected() {
        let form = ClientForm {
            name: "BPR Sejahtera".into(),
            industry: Some("Rural banking".into()),
            testimonial: Some("x".repeat(2_001)),
            is_featured: true,
            logo: None,
        };
        assert!(validate_client_form(&form).is_err());
    }
}
