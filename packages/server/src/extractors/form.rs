use std::collections::HashMap;

use axum::extract::Multipart;
use common::storage::FilePayload;

use crate::error::AppError;

/// A fully drained multipart form: text fields plus any non-empty file
/// payloads, buffered so validation can run before any storage side effect.
pub struct ParsedForm {
    fields: HashMap<String, String>,
    files: HashMap<String, FilePayload>,
}

impl ParsedForm {
    /// Drain an axum multipart stream.
    ///
    /// Zero-length files are treated as "no file submitted": browsers post
    /// an empty part for untouched file inputs.
    pub async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut fields = HashMap::new();
        let mut files = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(|s| s.to_string()) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(|s| s.to_string()) {
                let content_type = match field.content_type() {
                    Some(ty) => ty.to_string(),
                    None => mime_guess::from_path(&file_name)
                        .first_or_octet_stream()
                        .to_string(),
                };
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;
                if !bytes.is_empty() {
                    files.insert(
                        name,
                        FilePayload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;
                fields.insert(name, text);
            }
        }

        Ok(Self { fields, files })
    }

    /// A text field, with blank values treated as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn required_text(&self, name: &str) -> Result<&str, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("Field '{name}' is required")))
    }

    /// A checkbox-style boolean field.
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.fields.get(name).map(|s| s.as_str()),
            Some("true") | Some("on") | Some("1")
        )
    }

    pub fn take_file(&mut self, name: &str) -> Option<FilePayload> {
        self.files.remove(name)
    }

    #[cfg(test)]
    pub fn from_parts(
        fields: HashMap<String, String>,
        files: HashMap<String, FilePayload>,
    ) -> Self {
        Self { fields, files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> ParsedForm {
        ParsedForm::from_parts(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            HashMap::new(),
        )
    }

    #[test]
    fn blank_text_counts_as_absent() {
        let f = form(&[("title", "  "), ("slug", "core")]);
        assert_eq!(f.text("title"), None);
        assert_eq!(f.text("slug"), Some("core"));
        assert!(f.required_text("title").is_err());
    }

    #[test]
    fn flags_accept_browser_spellings() {
        let f = form(&[("a", "true"), ("b", "on"), ("c", "1"), ("d", "false")]);
        assert!(f.flag("a"));
        assert!(f.flag("b"));
        assert!(f.flag("c"));
        assert!(!f.flag("d"));
        assert!(!f.flag("missing"));
    }
}
