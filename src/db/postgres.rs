use super::{duplicate_key, missing, StoredTranslation, TranslationStore};
use crate::error::{StoreError, StoreResult};
use crate::i18n::{EntityKind, Region};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed translation store.
///
/// All kinds share one `entity_translations` table whose primary key is
/// `(entity_kind, entity_id, language)`; that key is what prevents duplicate
/// rows when two writers race.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the translations table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Create tables (safe to run always)
    pub async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS entity_translations (
                entity_kind TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                language TEXT NOT NULL,
                fields JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (entity_kind, entity_id, language)
            )",
        )
        .execute(&self.pool)
        .await?;

        info!("✓ Translation table ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Platform table holding the parent entities of a kind.
fn parent_table(kind: EntityKind) -> Option<&'static str> {
    match kind {
        EntityKind::Property => Some("properties"),
        EntityKind::Project => Some("projects"),
        EntityKind::Apartment => Some("apartments"),
        EntityKind::Partner => Some("partners"),
        EntityKind::Region => None,
    }
}

/// Parent tables are keyed by integer `id`; anything else cannot exist there.
fn parent_key(entity_id: &str) -> Option<i64> {
    entity_id.trim().parse().ok()
}

fn row_to_translation(row: &PgRow) -> StoreResult<StoredTranslation> {
    Ok(StoredTranslation {
        entity_id: row.try_get::<String, _>("entity_id")?,
        language: row.try_get::<String, _>("language")?,
        fields: row.try_get::<serde_json::Value, _>("fields")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl TranslationStore for PgStore {
    async fn find_translations(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> StoreResult<Vec<StoredTranslation>> {
        let rows = sqlx::query(
            "SELECT entity_id, language, fields, updated_at
             FROM entity_translations
             WHERE entity_kind = $1 AND entity_id = $2
             ORDER BY language",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_translation).collect()
    }

    async fn find_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
    ) -> StoreResult<Option<StoredTranslation>> {
        let row = sqlx::query(
            "SELECT entity_id, language, fields, updated_at
             FROM entity_translations
             WHERE entity_kind = $1 AND entity_id = $2 AND language = $3",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(language)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_translation).transpose()
    }

    async fn insert_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
        fields: serde_json::Value,
    ) -> StoreResult<StoredTranslation> {
        let result = sqlx::query(
            "INSERT INTO entity_translations (entity_kind, entity_id, language, fields, updated_at)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING entity_id, language, fields, updated_at",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(language)
        .bind(&fields)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row_to_translation(&row),
            Err(e) if is_unique_violation(&e) => Err(duplicate_key(kind, entity_id, language)),
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn replace_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
        fields: serde_json::Value,
    ) -> StoreResult<StoredTranslation> {
        let row = sqlx::query(
            "UPDATE entity_translations
             SET fields = $4, updated_at = NOW()
             WHERE entity_kind = $1 AND entity_id = $2 AND language = $3
             RETURNING entity_id, language, fields, updated_at",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(language)
        .bind(&fields)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_translation(&row),
            None => Err(missing(kind, entity_id, language)),
        }
    }

    async fn delete_translation(
        &self,
        kind: EntityKind,
        entity_id: &str,
        language: &str,
    ) -> StoreResult<()> {
        let rows_affected = sqlx::query(
            "DELETE FROM entity_translations
             WHERE entity_kind = $1 AND entity_id = $2 AND language = $3",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(language)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(missing(kind, entity_id, language));
        }
        Ok(())
    }

    async fn entity_exists(&self, kind: EntityKind, entity_id: &str) -> StoreResult<bool> {
        let Some(table) = parent_table(kind) else {
            return Ok(Region::from_code(entity_id).is_some());
        };

        let Some(id) = parent_key(entity_id) else {
            return Ok(false);
        };

        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            table
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_entity_ids(&self, kind: EntityKind) -> StoreResult<Vec<String>> {
        let Some(table) = parent_table(kind) else {
            return Ok(Region::ALL.iter().map(|r| r.code().to_string()).collect());
        };

        let ids: Vec<String> =
            sqlx::query_scalar(&format!("SELECT id::text FROM {} ORDER BY id", table))
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_tables() {
        assert_eq!(parent_table(EntityKind::Property), Some("properties"));
        assert_eq!(parent_table(EntityKind::Project), Some("projects"));
        assert_eq!(parent_table(EntityKind::Apartment), Some("apartments"));
        assert_eq!(parent_table(EntityKind::Partner), Some("partners"));
        assert_eq!(parent_table(EntityKind::Region), None);
    }

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn test_parent_key() {
        assert_eq!(parent_key("42"), Some(42));
        assert_eq!(parent_key(" 7 "), Some(7));
        assert_eq!(parent_key("abc"), None);
        assert_eq!(parent_key(""), None);
    }

    // ==================== Live database ====================
    //
    // Run with: DATABASE_URL=postgres://... cargo test -- --ignored

    async fn live_store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        PgStore::connect(&url, 2).await.expect("connect")
    }

    /// Entity id no other run will reuse; region rows need no parent table.
    fn scratch_id(label: &str) -> String {
        format!("{}-{}", label, Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_live_duplicate_insert_is_rejected() {
        let store = live_store().await;
        let id = scratch_id("dup");

        let row = store
            .insert_translation(EntityKind::Region, &id, "ka", serde_json::json!({ "name": "ა" }))
            .await
            .expect("first insert");
        assert_eq!(row.entity_id, id);
        assert_eq!(row.language, "ka");
        assert_eq!(row.fields["name"], "ა");

        let second = store
            .insert_translation(EntityKind::Region, &id, "ka", serde_json::json!({ "name": "ბ" }))
            .await;
        assert!(matches!(second, Err(StoreError::DuplicateKey { .. })));

        let rows = store
            .find_translations(EntityKind::Region, &id)
            .await
            .expect("find");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields["name"], "ა");

        store
            .delete_translation(EntityKind::Region, &id, "ka")
            .await
            .expect("cleanup");
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_live_replace_and_delete_report_missing_rows() {
        let store = live_store().await;
        let id = scratch_id("missing");

        let replace = store
            .replace_translation(EntityKind::Region, &id, "ru", serde_json::json!({ "name": "x" }))
            .await;
        assert!(matches!(replace, Err(StoreError::Missing { .. })));

        store
            .insert_translation(EntityKind::Region, &id, "ru", serde_json::json!({ "name": "old" }))
            .await
            .expect("insert");
        let replaced = store
            .replace_translation(EntityKind::Region, &id, "ru", serde_json::json!({ "name": "new" }))
            .await
            .expect("replace");
        assert_eq!(replaced.fields["name"], "new");

        store
            .delete_translation(EntityKind::Region, &id, "ru")
            .await
            .expect("delete");
        let again = store.delete_translation(EntityKind::Region, &id, "ru").await;
        assert!(matches!(again, Err(StoreError::Missing { .. })));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_live_region_existence_skips_parent_tables() {
        let store = live_store().await;

        assert!(store.entity_exists(EntityKind::Region, "tbilisi").await.expect("exists"));
        assert!(!store.entity_exists(EntityKind::Region, "atlantis").await.expect("exists"));
        assert_eq!(
            store.list_entity_ids(EntityKind::Region).await.expect("list").len(),
            Region::ALL.len()
        );
    }
}
