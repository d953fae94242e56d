use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::error::AppError;

/// Derive a URL slug from a human title: lowercase, with every run of
/// non-alphanumeric characters collapsed into a single hyphen and no
/// leading or trailing hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Choose the next free slug for `base`, given every existing slug that
/// could collide with it (`base` itself or `base-N`).
///
/// Picks one greater than the highest numeric suffix already in use rather
/// than the first gap: concurrent creators probing the same base land on
/// the same answer less often, at the cost of occasionally skipping numbers.
pub fn next_slug(base: &str, existing: &[String]) -> String {
    if !existing.iter().any(|s| s == base) {
        return base.to_string();
    }
    let mut max_suffix = 0u32;
    for s in existing {
        if let Some(rest) = s.strip_prefix(base).and_then(|r| r.strip_prefix('-'))
            && let Ok(n) = rest.parse::<u32>()
        {
            max_suffix = max_suffix.max(n);
        }
    }
    format!("{base}-{}", max_suffix + 1)
}

/// Resolve the slug for a create: an explicit slug is used verbatim, an
/// omitted one is derived from the title and probed against the entity's
/// existing slugs.
///
/// The probe is a best-effort pre-check only. The column's unique
/// constraint remains the authoritative guard; a concurrent create that
/// slips past the probe surfaces as a conflict at write time and is handled
/// like any other write failure.
pub async fn unique_slug<E, C>(
    db: &C,
    slug_col: E::Column,
    explicit: Option<String>,
    title: &str,
) -> Result<String, AppError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if let Some(slug) = explicit {
        return Ok(slug);
    }

    let mut base = slugify(title);
    if base.is_empty() {
        base = "untitled".to_string();
    }

    // `base` is hyphen/alphanumeric only, so no LIKE escaping is needed.
    let existing: Vec<String> = E::find()
        .select_only()
        .column(slug_col)
        .filter(
            Condition::any()
                .add(slug_col.eq(base.as_str()))
                .add(slug_col.like(format!("{base}-%"))),
        )
        .into_tuple()
        .all(db)
        .await?;

    Ok(next_slug(&base, &existing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slugs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn slugify_basic_title() {
        assert_eq!(slugify("IBS Core Basic"), "ibs-core-basic");
    }

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("Core -- Banking!! (v2)"), "core-banking-v2");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
    }

    #[test]
    fn slugify_trims_edge_hyphens() {
        assert_eq!(slugify("--edgy--"), "edgy");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Núcleo 3"), "caf-n-cleo-3");
    }

    #[test]
    fn next_slug_without_collision_keeps_base() {
        assert_eq!(next_slug("ibs-core-basic", &[]), "ibs-core-basic");
        assert_eq!(
            next_slug("ibs-core-basic", &slugs(&["ibs-core-basic-extra"])),
            "ibs-core-basic"
        );
    }

    #[test]
    fn next_slug_first_collision_gets_dash_one() {
        assert_eq!(
            next_slug("ibs-core-basic", &slugs(&["ibs-core-basic"])),
            "ibs-core-basic-1"
        );
    }

    #[test]
    fn next_slug_goes_past_the_highest_suffix() {
        let existing = slugs(&["ibs-core-basic", "ibs-core-basic-1", "ibs-core-basic-5"]);
        // One past the highest, not the first gap.
        assert_eq!(next_slug("ibs-core-basic", &existing), "ibs-core-basic-6");
    }

    #[test]
    fn next_slug_ignores_non_numeric_suffixes() {
        let existing = slugs(&["report", "report-final", "report-2"]);
        assert_eq!(next_slug("report", &existing), "report-3");
    }

    #[test]
    fn next_slug_ignores_longer_bases() {
        let existing = slugs(&["core", "core-banking-7"]);
        assert_eq!(next_slug("core", &existing), "core-1");
    }
}
