use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::UploadCategory;
use super::error::StorageError;

/// Public URL prefix every stored reference lives under.
pub const UPLOAD_PREFIX: &str = "/uploads/";

/// A validated reference to a stored upload.
///
/// Always of the form `/uploads/<category>/<file>`: safe to embed directly
/// as a retrievable URL, and safe to resolve back to a path under the store
/// root. Construction goes through [`UploadRef::parse`], which rejects
/// unknown categories and any file name that could traverse out of its
/// namespace.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UploadRef {
    category: UploadCategory,
    file_name: String,
}

impl UploadRef {
    /// Trusted constructor for names the store generated itself.
    pub(crate) fn new(category: UploadCategory, file_name: String) -> Self {
        Self {
            category,
            file_name,
        }
    }

    /// Parse a stored reference string.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        let rest = s.strip_prefix(UPLOAD_PREFIX).ok_or_else(|| {
            StorageError::InvalidReference(format!("'{s}' does not start with {UPLOAD_PREFIX}"))
        })?;

        let (folder, file_name) = rest.split_once('/').ok_or_else(|| {
            StorageError::InvalidReference(format!("'{s}' is missing a category segment"))
        })?;

        let category = UploadCategory::parse(folder).ok_or_else(|| {
            StorageError::InvalidReference(format!("unknown upload category '{folder}'"))
        })?;

        validate_file_name(file_name)
            .map_err(|msg| StorageError::InvalidReference(format!("'{s}': {msg}")))?;

        Ok(Self {
            category,
            file_name: file_name.to_string(),
        })
    }

    pub fn category(&self) -> UploadCategory {
        self.category
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The root-relative URL form, as stored in attachment columns.
    pub fn as_url(&self) -> String {
        format!("{UPLOAD_PREFIX}{}/{}", self.category, self.file_name)
    }
}

fn validate_file_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty file name");
    }
    if name.contains('/') || name.contains('\\') {
        return Err("file name contains a path separator");
    }
    if name.contains('\0') || name.chars().any(|c| c.is_ascii_control()) {
        return Err("file name contains control characters");
    }
    if name == ".." || name.starts_with('.') {
        return Err("file name starts with '.'");
    }
    Ok(())
}

impl fmt::Debug for UploadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UploadRef({})", self.as_url())
    }
}

impl fmt::Display for UploadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_url())
    }
}

impl Serialize for UploadRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_url())
    }
}

impl<'de> Deserialize<'de> for UploadRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trip() {
        let reference = UploadRef::parse("/uploads/products/abc123.png").unwrap();
        assert_eq!(reference.category(), UploadCategory::Products);
        assert_eq!(reference.file_name(), "abc123.png");
        assert_eq!(reference.as_url(), "/uploads/products/abc123.png");
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        assert!(UploadRef::parse("uploads/products/a.png").is_err());
        assert!(UploadRef::parse("/files/products/a.png").is_err());
        assert!(UploadRef::parse("https://cdn.example/a.png").is_err());
    }

    #[test]
    fn parse_rejects_unknown_category() {
        assert!(UploadRef::parse("/uploads/secrets/a.png").is_err());
    }

    #[test]
    fn parse_rejects_traversal_and_nesting() {
        assert!(UploadRef::parse("/uploads/products/../../etc/passwd").is_err());
        assert!(UploadRef::parse("/uploads/products/..").is_err());
        assert!(UploadRef::parse("/uploads/products/sub/a.png").is_err());
        assert!(UploadRef::parse("/uploads/products/.hidden").is_err());
        assert!(UploadRef::parse("/uploads/products/").is_err());
    }

    #[test]
    fn serde_round_trip() {
        let reference = UploadRef::parse("/uploads/blog/cover.webp").unwrap();
        let json = serde_json::to_string(&reference).unwrap();
        let parsed: UploadRef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reference);
    }
}
