use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for the admin settings form: every submitted key is
/// upserted in one transaction.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateSettingsRequest {
    pub settings: BTreeMap<String, String>,
}

pub fn validate_update_settings(req: &UpdateSettingsRequest) -> Result<(), AppError> {
    if req.settings.is_empty() {
        return Err(AppError::Validation("No settings submitted".into()));
    }
    for (key, value) in &req.settings {
        if key.trim().is_empty() || key.len() > 128 {
            return Err(AppError::Validation(
                "Setting keys must be 1-128 characters".into(),
            ));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(AppError::Validation(format!(
                "Setting key '{key}' may only contain lowercase letters, digits, and underscores"
            )));
        }
        if value.len() > 4_000 {
            return Err(AppError::Validation(format!(
                "Setting '{key}' exceeds the 4000 character limit"
            )));
        }
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SettingsResponse {
    pub settings: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(pairs: &[(&str, &str)]) -> UpdateSettingsRequest {
        UpdateSettingsRequest {
            settings: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn accepts_well_formed_keys() {
        assert!(validate_update_settings(&request(&[
            ("site_title", "Vitrin"),
            ("contact_email", "x@y.example"),
        ]))
        .is_ok());
    }

    #[test]
    fn rejects_empty_submission() {
        assert!(validate_update_settings(&request(&[])).is_err());
    }

    #[test]
    fn rejects_bad_key_shapes() {
        assert!(validate_update_settings(&request(&[("Site Title", "x")])).is_err());
        assert!(validate_update_settings(&request(&[("", "x")])).is_err());
    }
}
