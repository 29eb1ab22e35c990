//! Translation store contract and its backends.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::{StoreError, StoreResult};
use crate::i18n::{EntityKind, Translation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A translation row as persisted: field values are kept as JSON so one
/// store serves every entity kind.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTranslation {
    pub entity_id: String,
    pub language: String,
    pub fields: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl StoredTranslation {
    /// Decode into the typed row of an entity kind.
    pub fn decode<F: DeserializeOwned>(self) -> StoreResult<Translation<F>> {
        Ok(Translation {
            entity_id: self.entity_id,
            language: self.language,
            fields: serde_json::from_value(self.fields)?,
        })
    }
}

/// Encode typed fields for storage.
pub fn encode_fields<F: Serialize>(fields: &F) -> StoreResult<serde_json::Value> {
    Ok(serde_json::to_value(fields)?)
}

/// Decode a batch of stored rows.
pub fn decode_all<F: DeserializeOwned>(
    rows: Vec<StoredTranslation>,
) -> StoreResult<Vec<Translation<F>>> {
    rows.into_iter().map(StoredTranslation::decode).collect()
}

/// Persistence contract for translation rows keyed by
/// `(kind, entity_id, language)`.
///
/// Implementations must enforce uniqueness of that key: `insert_translation`
/// reports [`StoreError::DuplicateKey`] instead of creating a second row.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// All rows for one entity, in no particular order.
    async fn find_translations(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> StoreResult<Vec<StoredTranslation>>;

    async fn find_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
    ) -> StoreResult<Option<StoredTranslation>>;

    /// Insert a new row; fails with `DuplicateKey` if one exists.
    async fn insert_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
        fields: serde_json::Value,
    ) -> StoreResult<StoredTranslation>;

    /// Overwrite an existing row; fails with `Missing` if absent.
    async fn replace_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
        fields: serde_json::Value,
    ) -> StoreResult<StoredTranslation>;

    /// Remove an existing row; fails with `Missing` if absent.
    async fn delete_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
    ) -> StoreResult<()>;

    /// Whether the parent entity exists.
    async fn entity_exists(&self, kind: EntityKind, entity_id: &str) -> StoreResult<bool>;

    /// Ids of every entity of a kind.
    async fn list_entity_ids(&self, kind: EntityKind) -> StoreResult<Vec<String>>;
}

pub(crate) fn duplicate_key(kind: EntityKind, entity_id: &str, language: &str) -> StoreError {
    StoreError::DuplicateKey {
        kind: kind.to_string(),
        entity_id: entity_id.to_string(),
        language: language.to_string(),
    }
}

pub(crate) fn missing(kind: EntityKind, entity_id: &str, language: &str) -> StoreError {
    StoreError::Missing {
        kind: kind.to_string(),
        entity_id: entity_id.to_string(),
        language: language.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::PropertyTranslation;
    use serde_json::json;

    #[test]
    fn test_decode_stored_row() {
        let row = StoredTranslation {
            entity_id: "5".to_string(),
            language: "ru".to_string(),
            fields: json!({"title": "Вид на море", "description": null}),
            updated_at: Utc::now(),
        };

        let translation: Translation<PropertyTranslation> = row.decode().expect("decode");
        assert_eq!(translation.language, "ru");
        assert_eq!(translation.fields.title, "Вид на море");
        assert!(translation.fields.description.is_none());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let row = StoredTranslation {
            entity_id: "5".to_string(),
            language: "ru".to_string(),
            fields: json!({"title": 42}),
            updated_at: Utc::now(),
        };

        let result: StoreResult<Translation<PropertyTranslation>> = row.decode();
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_encode_fields_keeps_explicit_nulls() {
        let fields = PropertyTranslation {
            title: "Loft".to_string(),
            description: None,
            address: None,
        };
        let value = encode_fields(&fields).expect("encode");
        assert_eq!(value, json!({"title": "Loft", "description": null, "address": null}));
    }
}
