use chrono::{DateTime, NaiveDate, Utc};
use common::storage::FilePayload;
use serde::Serialize;

use crate::error::AppError;
use crate::extractors::form::ParsedForm;

use super::shared::{require_len, validate_slug_field, validate_status};

pub const PROJECT_STATUSES: &[&str] = &["Ongoing", "Completed"];

/// Fields submitted by the admin project form (multipart).
pub struct ProjectForm {
    pub title: String,
    pub slug: Option<String>,
    pub client_id: Option<i32>,
    pub service_id: Option<i32>,
    pub description: String,
    pub project_date: Option<NaiveDate>,
    pub status: String,
    pub thumbnail: Option<FilePayload>,
}

impl ProjectForm {
    pub fn from_form(form: &mut ParsedForm) -> Result<Self, AppError> {
        Ok(Self {
            title: form.required_text("title")?.to_string(),
            slug: form.text("slug").map(|s| s.to_string()),
            client_id: parse_optional_id(form, "client_id")?,
            service_id: parse_optional_id(form, "service_id")?,
            description: form.required_text("description")?.to_string(),
            project_date: parse_optional_date(form, "project_date")?,
            status: form.text("status").unwrap_or("Completed").to_string(),
            thumbnail: form.take_file("thumbnail"),
        })
    }
}

fn parse_optional_id(form: &ParsedForm, name: &str) -> Result<Option<i32>, AppError> {
    form.text(name)
        .map(|v| {
            v.parse::<i32>()
                .map_err(|_| AppError::Validation(format!("Field '{name}' must be a number")))
        })
        .transpose()
}

fn parse_optional_date(form: &ParsedForm, name: &str) -> Result<Option<NaiveDate>, AppError> {
    form.text(name)
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map_err(|_| AppError::Validation(format!("Field '{name}' must be YYYY-MM-DD")))
        })
        .transpose()
}

pub fn validate_project_form(form: &ProjectForm) -> Result<(), AppError> {
    require_len("Title", &form.title, 3, 256)?;
    if let Some(ref slug) = form.slug {
        validate_slug_field(slug)?;
    }
    require_len("Description", &form.description, 10, 10_000)?;
    validate_status("Status", &form.status, PROJECT_STATUSES)?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub client_id: Option<i32>,
    pub service_id: Option<i32>,
    pub description: String,
    pub project_date: Option<NaiveDate>,
    pub status: String,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::project::Model> for ProjectResponse {
    fn from(m: crate::entity::project::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            slug: m.slug,
            client_id: m.client_id,
            service_id: m.service_id,
            description: m.description,
            project_date: m.project_date,
            status: m.status,
            thumbnail: m.thumbnail,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
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
    fn status_defaults_to_completed() {
        let mut form = form_with(&[
            ("title", "BPR Migration"),
            ("description", "Full core migration for a rural bank"),
        ]);
        let parsed = ProjectForm::from_form(&mut form).unwrap();
        assert_eq!(parsed.status, "Completed");
        assert!(validate_project_form(&parsed).is_ok());
    }

    #[test]
    fn unknown_status_rejected() {
        let mut form = form_with(&[
            ("title", "BPR Migration"),
            ("description", "Full core migration for a rural bank"),
            ("status", "Paused"),
        ]);
        let parsed = ProjectForm::from_form(&mut form).unwrap();
        assert!(validate_project_form(&parsed).is_err());
    }

    #[test]
    fn bad_date_rejected() {
        let mut form = form_with(&[
            ("title", "BPR Migration"),
            ("description", "Full core migration for a rural bank"),
            ("project_date", "12/31/2025"),
        ]);
        assert!(ProjectForm::from_form(&mut form).is_err());
    }

    #[test]
    fn date_parses_iso_form() {
        let mut form = form_with(&[
            ("title", "BPR Migration"),
            ("description", "Full core migration for a rural bank"),
            ("project_date", "2025-11-30"),
        ]);
        let parsed = ProjectForm::from_form(&mut form).unwrap();
        assert_eq!(
            parsed.project_date,
            NaiveDate::from_ymd_opt(2025, 11, 30)
        );
    }
}
