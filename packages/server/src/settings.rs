use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use sea_orm::{ConnectionTrait, EntityTrait};

use crate::entity::setting;
use crate::error::AppError;

/// Cache tag dropped whenever a setting is written.
pub const SETTINGS_TAG: &str = "settings";

/// How long a loaded settings snapshot stays fresh.
pub const SETTINGS_TTL: Duration = Duration::from_secs(300);

/// Compiled-in defaults for every known settings key. A key missing from
/// the store, or stored blank, falls back to the value here.
pub const SITE_DEFAULTS: &[(&str, &str)] = &[
    // General
    ("site_title", "Vitrin Financial Systems"),
    (
        "site_description",
        "Core banking and microfinance software for rural banks, cooperatives and microfinance institutions.",
    ),
    ("footer_text", "PT Vitrin Financial Systems"),
    // Contact
    ("contact_email", "hello@vitrin.example"),
    ("contact_phone", "+62 811 0000 111"),
    ("contact_address", "Jl. Merdeka No. 1, Bandung, Jawa Barat"),
    ("whatsapp_number", "628110000111"),
    ("whatsapp_url", "https://wa.me/628110000111"),
    // Social media
    ("social_instagram", ""),
    ("social_facebook", ""),
    ("social_youtube", ""),
    ("social_linkedin", ""),
    ("social_twitter", ""),
];

struct CacheEntry {
    values: HashMap<String, String>,
    expires_at: Instant,
    tags: &'static [&'static str],
}

/// Explicit read-through cache over the `setting` table.
///
/// Holds one snapshot with an expiry and a tag set. Reads refresh it when it
/// is missing or expired; [`SettingsCache::invalidate`] drops it
/// synchronously, and is fired by every write that touches settings. No
/// hidden framework cache sits behind this.
pub struct SettingsCache {
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Return the stored settings, loading from the database only when the
    /// snapshot is missing or expired.
    pub async fn load<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<HashMap<String, String>, AppError> {
        if let Some(values) = self.fresh() {
            return Ok(values);
        }

        let rows = setting::Entity::find().all(db).await?;
        let values: HashMap<String, String> =
            rows.into_iter().map(|s| (s.key_name, s.value)).collect();

        let mut guard = self.entry.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(CacheEntry {
            values: values.clone(),
            expires_at: Instant::now() + self.ttl,
            tags: &[SETTINGS_TAG],
        });

        Ok(values)
    }

    fn fresh(&self) -> Option<HashMap<String, String>> {
        let guard = self.entry.read().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.values.clone())
    }

    /// Drop the snapshot if it carries `tag`.
    pub fn invalidate(&self, tag: &str) {
        let mut guard = self.entry.write().unwrap_or_else(|e| e.into_inner());
        if guard
            .as_ref()
            .is_some_and(|entry| entry.tags.contains(&tag))
        {
            *guard = None;
        }
    }
}

/// Merge stored values over the compiled-in defaults. Blank stored values
/// do not override their default.
pub fn merged_settings(stored: &HashMap<String, String>) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = SITE_DEFAULTS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    for (key, value) in stored {
        if !value.trim().is_empty() {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Look up one key, falling back to its compiled-in default when the stored
/// value is missing or blank.
pub fn setting_value<'a>(stored: &'a HashMap<String, String>, key: &str) -> &'a str {
    match stored.get(key).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => v,
        _ => SITE_DEFAULTS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .unwrap_or(""),
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn row(key: &str, value: &str) -> setting::Model {
        setting::Model {
            key_name: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn missing_key_falls_back_to_default() {
        let stored = HashMap::new();
        assert_eq!(
            setting_value(&stored, "site_title"),
            "Vitrin Financial Systems"
        );
    }

    #[test]
    fn blank_value_falls_back_to_default() {
        let mut stored = HashMap::new();
        stored.insert("site_title".to_string(), "   ".to_string());
        assert_eq!(
            setting_value(&stored, "site_title"),
            "Vitrin Financial Systems"
        );
    }

    #[test]
    fn stored_value_wins_over_default() {
        let mut stored = HashMap::new();
        stored.insert("site_title".to_string(), "Acme Banking".to_string());
        assert_eq!(setting_value(&stored, "site_title"), "Acme Banking");
    }

    #[test]
    fn unknown_key_without_default_is_empty() {
        let stored = HashMap::new();
        assert_eq!(setting_value(&stored, "no_such_key"), "");
    }

    #[test]
    fn merged_settings_keeps_defaults_for_blank_rows() {
        let mut stored = HashMap::new();
        stored.insert("contact_email".to_string(), "sales@acme.example".to_string());
        stored.insert("contact_phone".to_string(), "".to_string());

        let merged = merged_settings(&stored);
        assert_eq!(merged["contact_email"], "sales@acme.example");
        assert_eq!(merged["contact_phone"], "+62 811 0000 111");
        assert_eq!(merged["site_title"], "Vitrin Financial Systems");
    }

    #[tokio::test]
    async fn load_caches_until_ttl() {
        // One result set: a second query would make the mock fail, so a
        // passing second load proves it was served from the cache.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row("site_title", "Cached Title")]])
            .into_connection();

        let cache = SettingsCache::new(Duration::from_secs(60));
        let first = cache.load(&db).await.unwrap();
        let second = cache.load(&db).await.unwrap();
        assert_eq!(first.get("site_title"), Some(&"Cached Title".to_string()));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn expired_snapshot_reloads() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![row("site_title", "First")],
                vec![row("site_title", "Second")],
            ])
            .into_connection();

        let cache = SettingsCache::new(Duration::ZERO);
        let first = cache.load(&db).await.unwrap();
        let second = cache.load(&db).await.unwrap();
        assert_eq!(first.get("site_title"), Some(&"First".to_string()));
        assert_eq!(second.get("site_title"), Some(&"Second".to_string()));
    }

    #[tokio::test]
    async fn invalidate_drops_the_snapshot() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![row("site_title", "Before")],
                vec![row("site_title", "After")],
            ])
            .into_connection();

        let cache = SettingsCache::new(Duration::from_secs(60));
        let before = cache.load(&db).await.unwrap();
        cache.invalidate(SETTINGS_TAG);
        let after = cache.load(&db).await.unwrap();
        assert_eq!(before.get("site_title"), Some(&"Before".to_string()));
        assert_eq!(after.get("site_title"), Some(&"After".to_string()));
    }

    #[tokio::test]
    async fn invalidate_ignores_unrelated_tags() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row("site_title", "Sticky")]])
            .into_connection();

        let cache = SettingsCache::new(Duration::from_secs(60));
        cache.load(&db).await.unwrap();
        cache.invalidate("services");
        // Still cached: a reload would exhaust the mock.
        let again = cache.load(&db).await.unwrap();
        assert_eq!(again.get("site_title"), Some(&"Sticky".to_string()));
    }
}
