//! Guarded translation writes.
//!
//! `upsert` replaces or creates exactly one row per `(entity, language)`;
//! `delete` removes one row and refuses to touch the default language,
//! which is the resolver's guaranteed fallback target.

use crate::db::{encode_fields, TranslationStore};
use crate::error::{StoreError, TranslationError, TranslationResult};
use crate::i18n::language::{is_well_formed, normalize_code};
use crate::i18n::{LanguageRegistry, TranslatableKind, Translation};
use tracing::info;

/// Normalize and check a caller-supplied language code.
fn supported_language(registry: &LanguageRegistry, raw: &str) -> TranslationResult<String> {
    let code = normalize_code(raw);

    if !is_well_formed(&code) {
        return Err(TranslationError::validation(format!(
            "invalid language code: '{}'",
            raw
        )));
    }
    if !registry.is_supported(&code) {
        return Err(TranslationError::validation(format!(
            "language '{}' is not supported",
            code
        )));
    }

    Ok(code)
}

/// Create or fully replace the translation of `entity_id` in `language`.
///
/// The supplied fields replace every stored field; optional fields the
/// caller wants cleared must be sent as null.
pub async fn upsert<K: TranslatableKind>(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
    entity_id: &str,
    language: &str,
    fields: K::Fields,
) -> TranslationResult<Translation<K::Fields>> {
    let language = supported_language(registry, language)?;
    K::validate(&fields).map_err(TranslationError::Validation)?;

    if !store.entity_exists(K::KIND, entity_id).await? {
        return Err(TranslationError::not_found(format!(
            "{} {} does not exist",
            K::KIND,
            entity_id
        )));
    }

    let encoded = encode_fields(&fields)?;
    let existing = store.find_translation(K::KIND, entity_id, &language).await?;

    let stored = match existing {
        Some(_) => match store
            .replace_translation(K::KIND, entity_id, &language, encoded)
            .await
        {
            Ok(row) => row,
            // Deleted between our read and the write
            Err(StoreError::Missing { .. }) => {
                return Err(TranslationError::conflict(format!(
                    "translation {}/{}/{} changed concurrently",
                    K::KIND,
                    entity_id,
                    language
                )))
            }
            Err(e) => return Err(e.into()),
        },
        None => match store
            .insert_translation(K::KIND, entity_id, &language, encoded)
            .await
        {
            Ok(row) => row,
            Err(StoreError::DuplicateKey { .. }) => {
                return Err(TranslationError::conflict(format!(
                    "translation {}/{}/{} was created concurrently",
                    K::KIND,
                    entity_id,
                    language
                )))
            }
            Err(e) => return Err(e.into()),
        },
    };

    info!(kind = %K::KIND, entity_id, language = %language, "Translation upserted");

    Ok(stored.decode()?)
}

/// Delete the translation of `entity_id` in `language`.
pub async fn delete<K: TranslatableKind>(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
    entity_id: &str,
    language: &str,
) -> TranslationResult<()> {
    let language = normalize_code(language);

    if registry.is_default(&language) {
        return Err(TranslationError::conflict(format!(
            "the default language '{}' translation cannot be deleted",
            language
        )));
    }

    match store
        .delete_translation(K::KIND, entity_id, &language)
        .await
    {
        Ok(()) => {
            info!(kind = %K::KIND, entity_id, language = %language, "Translation deleted");
            Ok(())
        }
        Err(StoreError::Missing { .. }) => Err(TranslationError::not_found(format!(
            "no '{}' translation for {} {}",
            language,
            K::KIND,
            entity_id
        ))),
        Err(e) => Err(e.into()),
    }
}
