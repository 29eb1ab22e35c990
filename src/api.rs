//! HTTP surface over the translation operations.
//!
//! Every translatable kind gets the same set of routes under its collection
//! segment (`/api/properties`, `/api/projects`, ...). Translation listing,
//! mutation and sweeps are admin routes guarded by `X-API-Key`; localized
//! reads are public.

use crate::db::TranslationStore;
use crate::error::{TranslationError, TranslationResult};
use crate::i18n::language::normalize_code;
use crate::i18n::resolver::{self, EntityRef, LocalizedView};
use crate::i18n::sync::{self, SyncReport};
use crate::i18n::{
    guard, Apartment, LanguageConfig, LanguageRegistry, MetricsReport, Partner, Project, Property,
    Region, RegionName, ResolutionMetrics, TranslatableKind, Translation,
};
use crate::security;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TranslationStore>,
    pub registry: Arc<LanguageRegistry>,
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TranslationStore>,
        registry: LanguageRegistry,
        api_key: Option<String>,
    ) -> Self {
        Self {
            store,
            registry: Arc::new(registry),
            api_key,
        }
    }
}

/// Body of `PATCH .../translations`: the language plus the full field set.
#[derive(Debug, Deserialize)]
pub struct UpsertTranslationRequest<F> {
    pub language: String,
    #[serde(flatten)]
    pub fields: F,
}

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegionNameResponse {
    pub region: Region,
    pub name: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/languages", get(list_languages))
        .route("/api/regions/:id/name", get(region_name))
        .merge(localized_routes::<Property>())
        .merge(localized_routes::<Project>())
        .merge(localized_routes::<Apartment>())
        .merge(localized_routes::<Partner>())
        .merge(localized_routes::<RegionName>());

    let admin = Router::new()
        .merge(translation_routes::<Property>())
        .merge(translation_routes::<Project>())
        .merge(translation_routes::<Apartment>())
        .merge(translation_routes::<Partner>())
        .merge(translation_routes::<RegionName>())
        .route("/api/admin/sync", post(sync_all_kinds))
        .route("/api/admin/metrics", get(metrics))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    public
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn localized_routes<K: TranslatableKind>() -> Router<AppState> {
    Router::new().route(
        &format!("/api/{}/:id/localized", K::KIND.collection()),
        get(localized::<K>),
    )
}

fn translation_routes<K: TranslatableKind>() -> Router<AppState> {
    let base = format!("/api/{}/:id/translations", K::KIND.collection());

    Router::new()
        .route(
            &base,
            get(list_translations::<K>).patch(upsert_translation::<K>),
        )
        .route(
            &format!("{}/:language", base),
            delete(delete_translation::<K>),
        )
        .route(
            &format!("/api/admin/{}/sync", K::KIND.collection()),
            post(sync_kind::<K>),
        )
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !security::is_authorized(state.api_key.as_deref(), provided) {
        warn!(path = %request.uri().path(), "Rejected admin request: invalid or missing API key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid or missing API key" })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_languages(State(state): State<AppState>) -> Json<Vec<LanguageConfig>> {
    Json(state.registry.list().to_vec())
}

/// Requested language from `?lang=`, defaulting to the default language.
fn requested_language(registry: &LanguageRegistry, raw: Option<&str>) -> String {
    raw.map(normalize_code)
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| registry.default_code().to_string())
}

async fn localized<K: TranslatableKind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> TranslationResult<Json<LocalizedView<EntityRef, K::Fields>>> {
    if !state.store.entity_exists(K::KIND, &id).await? {
        return Err(TranslationError::not_found(format!(
            "{} {} does not exist",
            K::KIND,
            id
        )));
    }

    let requested = requested_language(&state.registry, query.lang.as_deref());
    let view =
        resolver::resolve_entity::<K>(state.store.as_ref(), &state.registry, &id, &requested)
            .await?;

    ResolutionMetrics::global().record_resolution(view.resolution);
    Ok(Json(view))
}

async fn region_name(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<LangQuery>,
) -> TranslationResult<Json<RegionNameResponse>> {
    let region = Region::from_code(&code)
        .ok_or_else(|| TranslationError::not_found(format!("unknown region '{}'", code)))?;

    let requested = requested_language(&state.registry, query.lang.as_deref());
    let (name, resolution) =
        resolver::resolve_region_name(state.store.as_ref(), &state.registry, region, &requested)
            .await?;

    ResolutionMetrics::global().record_resolution(resolution);
    Ok(Json(RegionNameResponse { region, name }))
}

async fn list_translations<K: TranslatableKind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> TranslationResult<Json<Vec<Translation<K::Fields>>>> {
    let rows = sync::sync_then_read::<K>(state.store.as_ref(), &state.registry, &id).await?;
    Ok(Json(rows))
}

async fn upsert_translation<K: TranslatableKind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpsertTranslationRequest<K::Fields>>, JsonRejection>,
) -> TranslationResult<Json<Translation<K::Fields>>> {
    let Json(body) = body.map_err(|rejection| {
        TranslationError::validation(format!("invalid request body: {}", rejection.body_text()))
    })?;

    let row = guard::upsert::<K>(
        state.store.as_ref(),
        &state.registry,
        &id,
        &body.language,
        body.fields,
    )
    .await?;
    Ok(Json(row))
}

async fn delete_translation<K: TranslatableKind>(
    State(state): State<AppState>,
    Path((id, language)): Path<(String, String)>,
) -> TranslationResult<StatusCode> {
    guard::delete::<K>(state.store.as_ref(), &state.registry, &id, &language).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn record_sweep(report: &SyncReport) {
    let metrics = ResolutionMetrics::global();
    metrics.record_rows_synced(report.created);
    metrics.record_sync_failures(report.failures.len());
}

async fn sync_kind<K: TranslatableKind>(
    State(state): State<AppState>,
) -> TranslationResult<Json<SyncReport>> {
    let report =
        sync::sync_all_with_placeholders::<K>(state.store.as_ref(), &state.registry).await?;
    record_sweep(&report);
    Ok(Json(report))
}

async fn sync_all_kinds(State(state): State<AppState>) -> Json<Vec<SyncReport>> {
    let reports = sync::sync_every_kind(state.store.as_ref(), &state.registry).await;
    reports.iter().for_each(record_sweep);
    Json(reports)
}

async fn metrics() -> Json<MetricsReport> {
    Json(ResolutionMetrics::global().report())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_language_defaults() {
        let registry = LanguageRegistry::default();
        assert_eq!(requested_language(&registry, None), "en");
        assert_eq!(requested_language(&registry, Some("")), "en");
        assert_eq!(requested_language(&registry, Some("  ")), "en");
        assert_eq!(requested_language(&registry, Some("KA")), "ka");
        assert_eq!(requested_language(&registry, Some("fr")), "fr");
    }

    #[test]
    fn test_upsert_request_flattens_fields() {
        let body: UpsertTranslationRequest<crate::i18n::PropertyTranslation> =
            serde_json::from_str(r#"{"language": "ka", "title": "სათაური", "description": null}"#)
                .expect("deserialize");

        assert_eq!(body.language, "ka");
        assert_eq!(body.fields.title, "სათაური");
        assert_eq!(body.fields.description, None);
        assert_eq!(body.fields.address, None);
    }
}
