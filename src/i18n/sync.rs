//! Translation synchronization.
//!
//! Ensures every entity has one row per supported language by inserting
//! placeholder rows for the languages it lacks. Existing rows are never
//! touched, so running a sync twice writes nothing the second time.

use crate::db::{decode_all, encode_fields, TranslationStore};
use crate::error::{StoreError, StoreResult, TranslationError, TranslationResult};
use crate::i18n::{
    Apartment, EntityKind, LanguageRegistry, Partner, Project, Property, RegionName,
    TranslatableKind, Translation,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Result of synchronizing one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Languages a placeholder row was inserted for.
    pub created: Vec<String>,

    /// Languages another writer filled between the read and the insert.
    pub skipped: Vec<String>,
}

/// A per-entity failure recorded during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityFailure {
    pub entity_id: String,
    pub error: String,
}

/// Summary of a sweep over every entity of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub kind: EntityKind,

    /// Entities synchronized without error
    pub entities: usize,

    /// Rows inserted across all entities
    pub created: usize,

    pub failures: Vec<EntityFailure>,
}

impl SyncReport {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            entities: 0,
            created: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Supported languages with no row in `existing`, in registry order.
///
/// Blank placeholder rows count as present.
pub fn missing_languages<'r, F>(
    registry: &'r LanguageRegistry,
    existing: &[Translation<F>],
) -> Vec<&'r str> {
    registry
        .codes()
        .filter(|code| !existing.iter().any(|row| row.language == *code))
        .collect()
}

/// Placeholder content derived from the entity's default-language row.
pub fn placeholder_defaults<K: TranslatableKind>(
    registry: &LanguageRegistry,
    existing: &[Translation<K::Fields>],
) -> K::Fields {
    let base = existing
        .iter()
        .find(|row| row.language == registry.default_code())
        .map(|row| &row.fields);
    K::placeholder(base)
}

/// Insert a row carrying `defaults` for every supported language missing
/// from `existing`.
///
/// A language filled concurrently (the insert hits `DuplicateKey`) is
/// skipped, not reported as an error.
pub async fn sync_missing<K: TranslatableKind>(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
    entity_id: &str,
    existing: &[Translation<K::Fields>],
    defaults: &K::Fields,
) -> StoreResult<SyncOutcome> {
    let missing = missing_languages(registry, existing);
    let mut outcome = SyncOutcome::default();

    if missing.is_empty() {
        return Ok(outcome);
    }

    let fields = encode_fields(defaults)?;

    for language in missing {
        match store
            .insert_translation(K::KIND, entity_id, language, fields.clone())
            .await
        {
            Ok(_) => outcome.created.push(language.to_string()),
            Err(StoreError::DuplicateKey { .. }) => {
                debug!(
                    kind = %K::KIND,
                    entity_id,
                    language,
                    "Translation filled concurrently, skipping"
                );
                outcome.skipped.push(language.to_string());
            }
            Err(e) => return Err(e),
        }
    }

    if !outcome.created.is_empty() {
        info!(
            kind = %K::KIND,
            entity_id,
            created = ?outcome.created,
            "Synchronized missing translations"
        );
    }

    Ok(outcome)
}

/// Load an entity's rows and fill its gaps with placeholder content.
pub async fn sync_entity<K: TranslatableKind>(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
    entity_id: &str,
) -> StoreResult<SyncOutcome> {
    let existing = decode_all::<K::Fields>(store.find_translations(K::KIND, entity_id).await?)?;
    let defaults = placeholder_defaults::<K>(registry, &existing);
    sync_missing::<K>(store, registry, entity_id, &existing, &defaults).await
}

/// Synchronize an entity, then return its complete translation list.
///
/// Rows come back in registry order; rows for languages no longer
/// supported are kept and sorted after them by code.
pub async fn sync_then_read<K: TranslatableKind>(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
    entity_id: &str,
) -> TranslationResult<Vec<Translation<K::Fields>>> {
    if !store.entity_exists(K::KIND, entity_id).await? {
        return Err(TranslationError::not_found(format!(
            "{} {} does not exist",
            K::KIND,
            entity_id
        )));
    }

    sync_entity::<K>(store, registry, entity_id).await?;

    let mut rows = decode_all::<K::Fields>(store.find_translations(K::KIND, entity_id).await?)?;
    rows.sort_by(|a, b| {
        let rank = |row: &Translation<K::Fields>| {
            (
                registry.position(&row.language).unwrap_or(usize::MAX),
                row.language.clone(),
            )
        };
        rank(a).cmp(&rank(b))
    });

    Ok(rows)
}

/// Sweep every entity of kind `K`, filling gaps with `defaults_for`.
///
/// Each entity is an independent unit of work: a failure is logged and
/// recorded in the report, and the sweep moves on. Only failing to list
/// the entities aborts the sweep.
pub async fn sync_all_entities<K, D>(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
    defaults_for: D,
) -> StoreResult<SyncReport>
where
    K: TranslatableKind,
    D: Fn(&str, &[Translation<K::Fields>]) -> K::Fields + Send + Sync,
{
    let entity_ids = store.list_entity_ids(K::KIND).await?;
    let mut report = SyncReport::new(K::KIND);

    for entity_id in &entity_ids {
        let result = async {
            let existing =
                decode_all::<K::Fields>(store.find_translations(K::KIND, entity_id).await?)?;
            let defaults = defaults_for(entity_id, &existing);
            sync_missing::<K>(store, registry, entity_id, &existing, &defaults).await
        }
        .await;

        match result {
            Ok(outcome) => {
                report.entities += 1;
                report.created += outcome.created.len();
            }
            Err(e) => {
                warn!(kind = %K::KIND, entity_id = %entity_id, "Translation sync failed: {}", e);
                report.failures.push(EntityFailure {
                    entity_id: entity_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        kind = %K::KIND,
        entities = report.entities,
        created = report.created,
        failures = report.failures.len(),
        "Translation sweep finished"
    );

    Ok(report)
}

/// Sweep one kind using placeholder content from each default-language row.
pub async fn sync_all_with_placeholders<K: TranslatableKind>(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
) -> StoreResult<SyncReport> {
    sync_all_entities::<K, _>(store, registry, |_, existing| {
        placeholder_defaults::<K>(registry, existing)
    })
    .await
}

/// Sweep every translatable kind.
///
/// A kind whose entity listing fails is reported as a single failure with
/// an empty entity id.
pub async fn sync_every_kind(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
) -> Vec<SyncReport> {
    let mut reports = Vec::with_capacity(EntityKind::ALL.len());

    for kind in EntityKind::ALL {
        let result = match kind {
            EntityKind::Property => sync_all_with_placeholders::<Property>(store, registry).await,
            EntityKind::Project => sync_all_with_placeholders::<Project>(store, registry).await,
            EntityKind::Apartment => sync_all_with_placeholders::<Apartment>(store, registry).await,
            EntityKind::Partner => sync_all_with_placeholders::<Partner>(store, registry).await,
            EntityKind::Region => sync_all_with_placeholders::<RegionName>(store, registry).await,
        };

        reports.push(result.unwrap_or_else(|e| {
            warn!(kind = %kind, "Could not list entities for sweep: {}", e);
            let mut report = SyncReport::new(kind);
            report.failures.push(EntityFailure {
                entity_id: String::new(),
                error: e.to_string(),
            });
            report
        }));
    }

    reports
}
