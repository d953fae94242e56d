use crate::error::AppError;

/// Validate a trimmed text field length in Unicode characters.
pub fn require_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let count = value.trim().chars().count();
    if count < min || count > max {
        return Err(AppError::Validation(format!(
            "{field} must be {min}-{max} characters"
        )));
    }
    Ok(())
}

/// Validate an optional field's maximum length.
pub fn optional_max_len(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    if let Some(value) = value
        && value.trim().chars().count() > max
    {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Validate an explicitly supplied slug: 3-256 chars of lowercase
/// alphanumerics and hyphens.
pub fn validate_slug_field(slug: &str) -> Result<(), AppError> {
    require_len("Slug", slug, 3, 256)?;
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::Validation(
            "Slug may only contain lowercase letters, digits, and hyphens".into(),
        ));
    }
    Ok(())
}

/// Minimal email shape check; the unique constraint and the mail system are
/// the real arbiters.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.is_empty()
        || email.len() > 254
        || !email.contains('@')
        || email.starts_with('@')
        || email.ends_with('@')
    {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    Ok(())
}

/// Validate an optional http(s) URL field.
pub fn optional_http_url(field: &str, value: Option<&str>) -> Result<(), AppError> {
    if let Some(url) = value
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        return Err(AppError::Validation(format!(
            "{field} must be an http(s) URL"
        )));
    }
    Ok(())
}

/// Validate a status field against its closed set of values.
pub fn validate_status(field: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if !allowed.contains(&value) {
        return Err(AppError::Validation(format!(
            "{field} must be one of: {}",
            allowed.join(", ")
        )));
    }
    Ok(())
}

/// Parse a form-submitted features field: a JSON array of non-empty
/// strings, with an absent field meaning an empty list.
pub fn parse_features(raw: Option<&str>) -> Result<serde_json::Value, AppError> {
    let Some(raw) = raw else {
        return Ok(serde_json::Value::Array(Vec::new()));
    };
    let items: Vec<String> = serde_json::from_str(raw)
        .map_err(|_| AppError::Validation("Features must be a JSON array of strings".into()))?;
    features_to_json(items)
}

/// Normalize a feature list into its stored JSON form.
pub fn features_to_json(items: Vec<String>) -> Result<serde_json::Value, AppError> {
    if items.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::Validation("Features must not be blank".into()));
    }
    if items.len() > 100 {
        return Err(AppError::Validation("Too many features: max 100".into()));
    }
    Ok(serde_json::Value::Array(
        items
            .into_iter()
            .map(|f| serde_json::Value::String(f.trim().to_string()))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_len_bounds() {
        assert!(require_len("Title", "abc", 3, 10).is_ok());
        assert!(require_len("Title", "  abc  ", 3, 10).is_ok());
        assert!(require_len("Title", "ab", 3, 10).is_err());
        assert!(require_len("Title", "abcdefghijk", 3, 10).is_err());
    }

    #[test]
    fn slug_field_shape() {
        assert!(validate_slug_field("ibs-core-basic").is_ok());
        assert!(validate_slug_field("core2").is_ok());
        assert!(validate_slug_field("ab").is_err());
        assert!(validate_slug_field("Has Caps").is_err());
        assert!(validate_slug_field("under_score").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("staff@vitrin.example").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@leading").is_err());
    }

    #[test]
    fn http_url_shape() {
        assert!(optional_http_url("Link", None).is_ok());
        assert!(optional_http_url("Link", Some("https://wa.me/123")).is_ok());
        assert!(optional_http_url("Link", Some("javascript:alert(1)")).is_err());
    }

    #[test]
    fn features_parse_and_normalize() {
        let parsed = parse_features(Some(r#"["Multi-branch", "Sharia module"]"#)).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!(["Multi-branch", "Sharia module"])
        );
        assert_eq!(parse_features(None).unwrap(), serde_json::json!([]));
        assert!(parse_features(Some("not json")).is_err());
        assert!(parse_features(Some(r#"["", "x"]"#)).is_err());
    }

    #[test]
    fn status_membership() {
        assert!(validate_status("Status", "draft", &["draft", "published"]).is_ok());
        assert!(validate_status("Status", "archived", &["draft", "published"]).is_err());
    }
}
