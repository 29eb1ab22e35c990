//! Multi-language content for listings.
//!
//! Every translatable entity (property, project, apartment, partner, region)
//! keeps one translation row per supported language. This module holds the
//! three operations that keep that content coherent:
//!
//! - `resolver`: serve the best available content for a requested language,
//!   falling back to the default language
//! - `sync`: insert placeholder rows for languages an entity lacks
//! - `guard`: upsert/delete single rows without breaking uniqueness or
//!   removing the default-language row
//!
//! Supporting pieces:
//!
//! - `registry`: the supported-language set, passed explicitly
//! - `language`: code normalization and known-language metadata
//! - `kinds`: per-kind translation shapes plugged into the generic operations
//! - `metrics`: counters for how reads were served
//!
//! # Example
//!
//! ```rust,ignore
//! use estate_i18n::i18n::{guard, resolver, LanguageRegistry, Property};
//!
//! let registry = LanguageRegistry::default();
//! guard::upsert::<Property>(&store, &registry, "42", "ka", fields).await?;
//! let view = resolver::resolve_entity::<Property>(&store, &registry, "42", "ka").await?;
//! ```

pub mod guard;
mod kinds;
pub mod language;
mod metrics;
mod registry;
pub mod resolver;
pub mod sync;

pub use kinds::{
    Apartment, ApartmentTranslation, EntityKind, Partner, PartnerTranslation, Project,
    ProjectTranslation, Property, PropertyTranslation, Region, RegionName, RegionTranslation,
    TranslatableKind, Translation,
};
pub use metrics::{MetricsReport, ResolutionMetrics};
pub use registry::{LanguageConfig, LanguageRegistry, DEFAULT_LANGUAGE, DEFAULT_LANGUAGE_CODES};
pub use resolver::{EntityRef, LocalizedView, Resolution};
pub use sync::{SyncOutcome, SyncReport};
