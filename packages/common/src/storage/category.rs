use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage namespace an upload is written into.
///
/// The set is closed: arbitrary folder names only enter through
/// [`UploadCategory::parse`], so a request naming an unlisted folder fails
/// before any I/O can happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UploadCategory {
    Services,
    Products,
    Clients,
    Blog,
    Team,
    Profiles,
    Projects,
}

impl UploadCategory {
    /// Every valid category, in a fixed order.
    pub const ALL: [UploadCategory; 7] = [
        UploadCategory::Services,
        UploadCategory::Products,
        UploadCategory::Clients,
        UploadCategory::Blog,
        UploadCategory::Team,
        UploadCategory::Profiles,
        UploadCategory::Projects,
    ];

    /// The folder name under the upload root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Products => "products",
            Self::Clients => "clients",
            Self::Blog => "blog",
            Self::Team => "team",
            Self::Profiles => "profiles",
            Self::Projects => "projects",
        }
    }

    /// Parse a folder name. Returns `None` for anything outside the allow-list.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for UploadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UploadCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UploadCategory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown upload category '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_listed_category() {
        for category in UploadCategory::ALL {
            assert_eq!(UploadCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn parse_rejects_unlisted_folders() {
        assert_eq!(UploadCategory::parse("etc"), None);
        assert_eq!(UploadCategory::parse("uploads"), None);
        assert_eq!(UploadCategory::parse(""), None);
        assert_eq!(UploadCategory::parse("Products"), None); // case sensitive
        assert_eq!(UploadCategory::parse("../products"), None);
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&UploadCategory::Blog).unwrap();
        assert_eq!(json, "\"blog\"");
        let parsed: UploadCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, UploadCategory::Blog);
    }

    #[test]
    fn deserialize_rejects_unknown() {
        assert!(serde_json::from_str::<UploadCategory>("\"attic\"").is_err());
    }
}
