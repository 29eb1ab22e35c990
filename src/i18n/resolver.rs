//! Localized content resolution with default-language fallback.
//!
//! Resolution order for a requested language `L`:
//! 1. the `L` row, if its primary field is non-blank;
//! 2. the default-language row, if its primary field is non-blank;
//! 3. nothing (callers render only the entity's base fields).
//!
//! A row whose primary field is blank is a placeholder and never shadows
//! default-language content. No other language is ever served.

use crate::db::{decode_all, TranslationStore};
use crate::error::StoreResult;
use crate::i18n::{
    EntityKind, LanguageRegistry, Region, RegionName, TranslatableKind, Translation,
};
use serde::Serialize;

/// How a localized view was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Content in the requested language.
    Requested,
    /// Requested language missing or blank; default-language content served.
    Fallback,
    /// Neither the requested nor the default language has content.
    Unresolved,
}

/// Localized fields merged over an entity's non-localized base fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedView<B, F> {
    #[serde(flatten)]
    pub base: B,
    #[serde(flatten)]
    pub content: Option<F>,
    pub served_language: Option<String>,
    pub resolution: Resolution,
}

impl<B, F> LocalizedView<B, F> {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

/// Identity of an entity, used as the base of a view when the caller has no
/// richer base fields to merge under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

/// Pick the row to serve for `requested`, falling back to `default_language`.
pub fn select<'a, K: TranslatableKind>(
    rows: &'a [Translation<K::Fields>],
    requested: &str,
    default_language: &str,
) -> Option<&'a Translation<K::Fields>> {
    let usable = move |language: &str| {
        rows.iter()
            .find(|row| row.language == language && K::has_content(&row.fields))
    };

    usable(requested).or_else(|| usable(default_language))
}

/// Resolve the localized view of one entity from already-loaded rows.
pub fn resolve<K: TranslatableKind, B>(
    base: B,
    rows: &[Translation<K::Fields>],
    requested: &str,
    default_language: &str,
) -> LocalizedView<B, K::Fields> {
    match select::<K>(rows, requested, default_language) {
        Some(row) => LocalizedView {
            base,
            content: Some(row.fields.clone()),
            served_language: Some(row.language.clone()),
            resolution: if row.language == requested {
                Resolution::Requested
            } else {
                Resolution::Fallback
            },
        },
        None => LocalizedView {
            base,
            content: None,
            served_language: None,
            resolution: Resolution::Unresolved,
        },
    }
}

/// Fetch an entity's rows and resolve them.
///
/// Only store failures are errors; missing translations yield an empty view.
pub async fn resolve_entity<K: TranslatableKind>(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
    entity_id: &str,
    requested: &str,
) -> StoreResult<LocalizedView<EntityRef, K::Fields>> {
    let rows = decode_all::<K::Fields>(store.find_translations(K::KIND, entity_id).await?)?;

    let base = EntityRef {
        kind: K::KIND,
        id: entity_id.to_string(),
    };
    Ok(resolve::<K, _>(base, &rows, requested, registry.default_code()))
}

/// Display name of a region in the requested language, with how it was resolved.
pub async fn resolve_region_name(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
    region: Region,
    requested: &str,
) -> StoreResult<(Option<String>, Resolution)> {
    let view = resolve_entity::<RegionName>(store, registry, region.code(), requested).await?;
    Ok((view.content.map(|fields| fields.name), view.resolution))
}
