use chrono::{DateTime, Utc};
use common::storage::FilePayload;
use serde::Serialize;

use crate::error::AppError;
use crate::extractors::form::ParsedForm;

use super::shared::{optional_max_len, require_len, validate_slug_field, validate_status};

pub const POST_STATUSES: &[&str] = &["draft", "published"];

/// Fields submitted by the admin blog post form (multipart).
pub struct PostForm {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub excerpt: Option<String>,
    pub meta_description: Option<String>,
    pub status: String,
    pub cover_image: Option<FilePayload>,
}

impl PostForm {
    pub fn from_form(form: &mut ParsedForm) -> Result<Self, AppError> {
        Ok(Self {
            title: form.required_text("title")?.to_string(),
            slug: form.text("slug").map(|s| s.to_string()),
            content: form.required_text("content")?.to_string(),
            excerpt: form.text("excerpt").map(|s| s.to_string()),
            meta_description: form.text("meta_description").map(|s| s.to_string()),
            status: form.text("status").unwrap_or("draft").to_string(),
            cover_image: form.take_file("cover_image"),
        })
    }
}

pub fn validate_post_form(form: &PostForm) -> Result<(), AppError> {
    require_len("Title", &form.title, 3, 256)?;
    if let Some(ref slug) = form.slug {
        validate_slug_field(slug)?;
    }
    if form.content.trim().chars().count() < 10 || form.content.len() > 1_000_000 {
        return Err(AppError::Validation(
            "Content must be at least 10 characters and at most 1MB".into(),
        ));
    }
    optional_max_len("Excerpt", form.excerpt.as_deref(), 500)?;
    optional_max_len("Meta description", form.meta_description.as_deref(), 160)?;
    validate_status("Status", &form.status, POST_STATUSES)?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub meta_description: Option<String>,
    pub cover_image: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::post::Model> for PostResponse {
    fn from(m: crate::entity::post::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            slug: m.slug,
            content: m.content,
            excerpt: m.excerpt,
            meta_description: m.meta_description,
            cover_image: m.cover_image,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// List item without the full content body.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PostListItem {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::post::Model> for PostListItem {
    fn from(m: crate::entity::post::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            slug: m.slug,
            excerpt: m.excerpt,
            cover_image: m.cover_image,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_form() -> PostForm {
        PostForm {
            title: "Choosing a core system".into(),
            slug: None,
            content: "A long enough body of content.".into(),
            excerpt: None,
            meta_description: None,
            status: "draft".into(),
            cover_image: None,
        }
    }

    #[test]
    fn accepts_a_draft() {
        assert!(validate_post_form(&base_form()).is_ok());
    }

    #[test]
    fn rejects_short_content() {
        let mut form = base_form();
        form.content = "too short".into();
        assert!(validate_post_form(&form).is_err());
    }

    #[test]
    fn rejects_unknown_status() {
        let mut form = base_form();
        form.status = "archived".into();
        assert!(validate_post_form(&form).is_err());
    }
}
