//! Translatable entity kinds and their per-kind translation shapes.
//!
//! Every kind plugs into the generic resolver, synchronizer and guard through
//! [`TranslatableKind`], which names its field shape, the primary field used
//! for fallback decisions, and how placeholder rows are built.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of entities that own localized content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Property,
    Project,
    Apartment,
    Partner,
    Region,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Property,
        EntityKind::Project,
        EntityKind::Apartment,
        EntityKind::Partner,
        EntityKind::Region,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Property => "property",
            EntityKind::Project => "project",
            EntityKind::Apartment => "apartment",
            EntityKind::Partner => "partner",
            EntityKind::Region => "region",
        }
    }

    /// URL collection segment (`/api/properties/...`).
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Property => "properties",
            EntityKind::Project => "projects",
            EntityKind::Apartment => "apartments",
            EntityKind::Partner => "partners",
            EntityKind::Region => "regions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.collection() == s)
            .ok_or_else(|| format!("Unknown entity kind: '{}'", s))
    }
}

/// Regions listings can be filed under. Region names are translated like
/// any other entity, keyed by the region code instead of a numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Tbilisi,
    Adjara,
    Imereti,
    Kakheti,
    KvemoKartli,
    ShidaKartli,
    MtskhetaMtianeti,
    SamegreloZemoSvaneti,
    SamtskheJavakheti,
    Guria,
    RachaLechkhumi,
}

impl Region {
    pub const ALL: [Region; 11] = [
        Region::Tbilisi,
        Region::Adjara,
        Region::Imereti,
        Region::Kakheti,
        Region::KvemoKartli,
        Region::ShidaKartli,
        Region::MtskhetaMtianeti,
        Region::SamegreloZemoSvaneti,
        Region::SamtskheJavakheti,
        Region::Guria,
        Region::RachaLechkhumi,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Region::Tbilisi => "tbilisi",
            Region::Adjara => "adjara",
            Region::Imereti => "imereti",
            Region::Kakheti => "kakheti",
            Region::KvemoKartli => "kvemo_kartli",
            Region::ShidaKartli => "shida_kartli",
            Region::MtskhetaMtianeti => "mtskheta_mtianeti",
            Region::SamegreloZemoSvaneti => "samegrelo_zemo_svaneti",
            Region::SamtskheJavakheti => "samtskhe_javakheti",
            Region::Guria => "guria",
            Region::RachaLechkhumi => "racha_lechkhumi",
        }
    }

    pub fn from_code(code: &str) -> Option<Region> {
        Region::ALL.into_iter().find(|region| region.code() == code)
    }
}

/// One translation row: the localized fields of one entity in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation<F> {
    pub entity_id: String,
    pub language: String,
    #[serde(flatten)]
    pub fields: F,
}

/// Per-kind adapter plugged into the generic translation operations.
pub trait TranslatableKind: Send + Sync + 'static {
    type Fields: Clone
        + fmt::Debug
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    const KIND: EntityKind;

    /// Name of the field that decides whether a row has real content.
    const PRIMARY_FIELD: &'static str;

    /// Value of the primary field.
    fn primary(fields: &Self::Fields) -> &str;

    /// Row content for a language that has no translation yet.
    ///
    /// Required fields are copied from `base` (empty when there is no base),
    /// optional fields are left null.
    fn placeholder(base: Option<&Self::Fields>) -> Self::Fields;

    /// Validate caller-supplied fields before they reach the store.
    fn validate(fields: &Self::Fields) -> Result<(), String> {
        if Self::primary(fields).trim().is_empty() {
            return Err(format!("{} must not be blank", Self::PRIMARY_FIELD));
        }
        Ok(())
    }

    /// Whether the primary field carries real content.
    fn has_content(fields: &Self::Fields) -> bool {
        !Self::primary(fields).trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyTranslation {
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectTranslation {
    pub project_name: String,
    pub street: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApartmentTranslation {
    pub description: String,
    pub layout: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerTranslation {
    pub company_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionTranslation {
    pub name: String,
}

pub struct Property;
pub struct Project;
pub struct Apartment;
pub struct Partner;
pub struct RegionName;

impl TranslatableKind for Property {
    type Fields = PropertyTranslation;
    const KIND: EntityKind = EntityKind::Property;
    const PRIMARY_FIELD: &'static str = "title";

    fn primary(fields: &Self::Fields) -> &str {
        &fields.title
    }

    fn placeholder(base: Option<&Self::Fields>) -> Self::Fields {
        PropertyTranslation {
            title: base.map(|b| b.title.clone()).unwrap_or_default(),
            description: None,
            address: None,
        }
    }
}

impl TranslatableKind for Project {
    type Fields = ProjectTranslation;
    const KIND: EntityKind = EntityKind::Project;
    const PRIMARY_FIELD: &'static str = "project_name";

    fn primary(fields: &Self::Fields) -> &str {
        &fields.project_name
    }

    fn placeholder(base: Option<&Self::Fields>) -> Self::Fields {
        ProjectTranslation {
            project_name: base.map(|b| b.project_name.clone()).unwrap_or_default(),
            street: None,
            description: None,
        }
    }
}

impl TranslatableKind for Apartment {
    type Fields = ApartmentTranslation;
    const KIND: EntityKind = EntityKind::Apartment;
    const PRIMARY_FIELD: &'static str = "description";

    fn primary(fields: &Self::Fields) -> &str {
        &fields.description
    }

    fn placeholder(base: Option<&Self::Fields>) -> Self::Fields {
        ApartmentTranslation {
            description: base.map(|b| b.description.clone()).unwrap_or_default(),
            layout: None,
        }
    }
}

impl TranslatableKind for Partner {
    type Fields = PartnerTranslation;
    const KIND: EntityKind = EntityKind::Partner;
    const PRIMARY_FIELD: &'static str = "company_name";

    fn primary(fields: &Self::Fields) -> &str {
        &fields.company_name
    }

    fn placeholder(base: Option<&Self::Fields>) -> Self::Fields {
        PartnerTranslation {
            company_name: base.map(|b| b.company_name.clone()).unwrap_or_default(),
            description: None,
        }
    }
}

impl TranslatableKind for RegionName {
    type Fields = RegionTranslation;
    const KIND: EntityKind = EntityKind::Region;
    const PRIMARY_FIELD: &'static str = "name";

    fn primary(fields: &Self::Fields) -> &str {
        &fields.name
    }

    fn placeholder(base: Option<&Self::Fields>) -> Self::Fields {
        RegionTranslation {
            name: base.map(|b| b.name.clone()).unwrap_or_default(),
        }
    }
}
