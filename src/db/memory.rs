use super::{duplicate_key, missing, StoredTranslation, TranslationStore};
use crate::error::StoreResult;
use crate::i18n::{EntityKind, Region};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

type RowKey = (EntityKind, String, String);

#[derive(Default)]
struct MemoryState {
    entities: BTreeSet<(EntityKind, String)>,
    rows: BTreeMap<RowKey, StoredTranslation>,
}

/// In-process translation store.
///
/// Every write takes the lock for its whole check-then-write, so the
/// `(kind, entity_id, language)` uniqueness holds under concurrent callers.
/// Regions always exist; other parents are registered with [`add_entity`].
///
/// [`add_entity`]: MemoryStore::add_entity
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parent entity.
    pub async fn add_entity(&self, kind: EntityKind, entity_id: &str) {
        let mut state = self.state.write().await;
        state.entities.insert((kind, entity_id.to_string()));
    }

    /// Remove a parent entity and cascade to its translations.
    pub async fn remove_entity(&self, kind: EntityKind, entity_id: &str) {
        let mut state = self.state.write().await;
        state.entities.remove(&(kind, entity_id.to_string()));
        state
            .rows
            .retain(|(row_kind, row_entity, _), _| !(*row_kind == kind && row_entity == entity_id));
    }

    /// Total number of rows for an entity (test and diagnostics helper).
    pub async fn row_count(&self, kind: EntityKind, entity_id: &str) -> usize {
        let state = self.state.read().await;
        state
            .rows
            .keys()
            .filter(|(row_kind, row_entity, _)| *row_kind == kind && row_entity == entity_id)
            .count()
    }
}

fn key(kind: EntityKind, entity_id: &str, language: &str) -> RowKey {
    (kind, entity_id.to_string(), language.to_string())
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn find_translations(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> StoreResult<Vec<StoredTranslation>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .filter(|((row_kind, row_entity, _), _)| *row_kind == kind && row_entity == entity_id)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn find_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
    ) -> StoreResult<Option<StoredTranslation>> {
        let state = self.state.read().await;
        Ok(state.rows.get(&key(kind, entity_id, language)).cloned())
    }

    async fn insert_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
        fields: serde_json::Value,
    ) -> StoreResult<StoredTranslation> {
        let mut state = self.state.write().await;
        let row_key = key(kind, entity_id, language);

        if state.rows.contains_key(&row_key) {
            return Err(duplicate_key(kind, entity_id, language));
        }

        let row = StoredTranslation {
            entity_id: entity_id.to_string(),
            language: language.to_string(),
            fields,
            updated_at: Utc::now(),
        };
        state.rows.insert(row_key, row.clone());
        Ok(row)
    }

    async fn replace_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
        fields: serde_json::Value,
    ) -> StoreResult<StoredTranslation> {
        let mut state = self.state.write().await;

        match state.rows.get_mut(&key(kind, entity_id, language)) {
            Some(row) => {
                row.fields = fields;
                row.updated_at = Utc::now();
                Ok(row.clone())
            }
            None => Err(missing(kind, entity_id, language)),
        }
    }

    async fn delete_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;

        match state.rows.remove(&key(kind, entity_id, language)) {
            Some(_) => Ok(()),
            None => Err(missing(kind, entity_id, language)),
        }
    }

    async fn entity_exists(&self, kind: EntityKind, entity_id: &str) -> StoreResult<bool> {
        if kind == EntityKind::Region {
            return Ok(Region::from_code(entity_id).is_some());
        }

        let state = self.state.read().await;
        Ok(state.entities.contains(&(kind, entity_id.to_string())))
    }

    async fn list_entity_ids(&self, kind: EntityKind) -> StoreResult<Vec<String>> {
        if kind == EntityKind::Region {
            return Ok(Region::ALL.iter().map(|r| r.code().to_string()).collect());
        }

        let state = self.state.read().await;
        Ok(state
            .entities
            .iter()
            .filter(|(entity_kind, _)| *entity_kind == kind)
            .map(|(_, id)| id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();
        store
            .insert_translation(EntityKind::Property, "1", "en", json!({"title": "Loft"}))
            .await
            .expect("insert");

        let row = store
            .find_translation(EntityKind::Property, "1", "en")
            .await
            .expect("find")
            .expect("row exists");
        assert_eq!(row.fields["title"], "Loft");

        let none = store
            .find_translation(EntityKind::Property, "1", "ka")
            .await
            .expect("find");
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_rejected() {
        let store = MemoryStore::new();
        store
            .insert_translation(EntityKind::Partner, "3", "en", json!({"company_name": "A"}))
            .await
            .expect("insert");

        let result = store
            .insert_translation(EntityKind::Partner, "3", "en", json!({"company_name": "B"}))
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
        assert_eq!(store.row_count(EntityKind::Partner, "3").await, 1);
    }

    #[tokio::test]
    async fn test_same_id_different_kind_is_independent() {
        let store = MemoryStore::new();
        store
            .insert_translation(EntityKind::Property, "1", "en", json!({"title": "A"}))
            .await
            .expect("insert");
        store
            .insert_translation(EntityKind::Project, "1", "en", json!({"project_name": "B"}))
            .await
            .expect("insert into another kind");

        let rows = store
            .find_translations(EntityKind::Project, "1")
            .await
            .expect("find");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields["project_name"], "B");
    }

    #[tokio::test]
    async fn test_replace_requires_existing_row() {
        let store = MemoryStore::new();
        let result = store
            .replace_translation(EntityKind::Property, "1", "ka", json!({"title": "x"}))
            .await;
        assert!(matches!(result, Err(StoreError::Missing { .. })));
    }

    #[tokio::test]
    async fn test_replace_overwrites_all_fields() {
        let store = MemoryStore::new();
        store
            .insert_translation(
                EntityKind::Property,
                "1",
                "ka",
                json!({"title": "old", "description": "old"}),
            )
            .await
            .expect("insert");

        let row = store
            .replace_translation(
                EntityKind::Property,
                "1",
                "ka",
                json!({"title": "new", "description": null}),
            )
            .await
            .expect("replace");
        assert_eq!(row.fields, json!({"title": "new", "description": null}));
    }

    #[tokio::test]
    async fn test_delete_missing_row() {
        let store = MemoryStore::new();
        let result = store
            .delete_translation(EntityKind::Property, "1", "ka")
            .await;
        assert!(matches!(result, Err(StoreError::Missing { .. })));
    }

    #[tokio::test]
    async fn test_entity_registry_and_cascade() {
        let store = MemoryStore::new();
        assert!(!store.entity_exists(EntityKind::Property, "9").await.expect("exists"));

        store.add_entity(EntityKind::Property, "9").await;
        store
            .insert_translation(EntityKind::Property, "9", "en", json!({"title": "x"}))
            .await
            .expect("insert");
        assert!(store.entity_exists(EntityKind::Property, "9").await.expect("exists"));

        store.remove_entity(EntityKind::Property, "9").await;
        assert!(!store.entity_exists(EntityKind::Property, "9").await.expect("exists"));
        assert_eq!(store.row_count(EntityKind::Property, "9").await, 0);
    }

    #[tokio::test]
    async fn test_regions_always_exist() {
        let store = MemoryStore::new();
        assert!(store.entity_exists(EntityKind::Region, "tbilisi").await.expect("exists"));
        assert!(!store.entity_exists(EntityKind::Region, "atlantis").await.expect("exists"));

        let ids = store.list_entity_ids(EntityKind::Region).await.expect("list");
        assert_eq!(ids.len(), Region::ALL.len());
    }

    #[tokio::test]
    async fn test_list_entity_ids_filters_kind() {
        let store = MemoryStore::new();
        store.add_entity(EntityKind::Property, "1").await;
        store.add_entity(EntityKind::Property, "2").await;
        store.add_entity(EntityKind::Partner, "1").await;

        let ids = store.list_entity_ids(EntityKind::Property).await.expect("list");
        assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_keep_one_row() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();

        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_translation(
                        EntityKind::Property,
                        "1",
                        "ka",
                        json!({ "title": format!("t{}", i) }),
                    )
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.expect("join").is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.row_count(EntityKind::Property, "1").await, 1);
    }
}
