mod query;
mod template;


use std::num::NonZeroU32;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use crate::query::{build_query, CANONICAL_VARIABLE, OUTPUT_VARIABLE, PRIMARY_VARIABLE};


/// Prefix prepended to entity and property IDs to turn them into Wikidata item IRIs.
pub const ENTITY_PREFIX: &str = "wd:";

/// The "coextensive with" property.
pub const COEXTENSIVE_WITH_PROPERTY: &str = "P3403";


/// The entities whose sub-regions are queried.
///
/// A single entity is equivalent to a list containing only that entity.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RootEntities {
    Single(String),
    Multiple(Vec<String>),
}
impl RootEntities {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(entity) => std::slice::from_ref(entity),
            Self::Multiple(entities) => entities.as_slice(),
        }
    }
}
impl From<&str> for RootEntities {
    fn from(entity: &str) -> Self {
        Self::Single(entity.to_owned())
    }
}
impl From<String> for RootEntities {
    fn from(entity: String) -> Self {
        Self::Single(entity)
    }
}
impl From<Vec<String>> for RootEntities {
    fn from(entities: Vec<String>) -> Self {
        Self::Multiple(entities)
    }
}
impl From<&[&str]> for RootEntities {
    fn from(entities: &[&str]) -> Self {
        Self::Multiple(entities.iter().map(|e| (*e).to_owned()).collect())
    }
}


/// Decides which identifier a result row is finally reported under.
///
/// Every variant binds the canonical variable (`?canonical`) in terms of the primary variable
/// (`?item`). Rows where the canonical variable stays unbound keep their primary identifier.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalIdRule {
    /// Looks up the canonical identifier through a property of the primary entity.
    Property(String),

    /// Graph patterns supplied verbatim; each one is wrapped in its own `OPTIONAL` block and is
    /// expected to bind `?canonical`.
    Clauses(Vec<String>),

    /// Reports entity `from` under the identifier of entity `to`.
    Rewrite { from: String, to: String },
}
impl CanonicalIdRule {
    /// Collapses entities onto the entity they are "coextensive with".
    pub fn coextensive() -> Self {
        Self::Property(COEXTENSIVE_WITH_PROPERTY.to_owned())
    }
}


fn default_depth() -> NonZeroU32 {
    NonZeroU32::MIN
}


/// Describes which sub-regions to select and which values to attach to each of them.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RegionQuery {
    pub root_entities: RootEntities,

    /// Language codes for which a label is attached, as `?label_{lang}`.
    #[serde(default)]
    pub languages: Vec<String>,

    /// Output variable name to property ID.
    #[serde(default)]
    pub fields: IndexMap<String, String>,

    /// How many times the containment relation is followed from the root entities.
    #[serde(default = "default_depth")]
    pub depth: NonZeroU32,

    /// Raw SPARQL expression used as an additional filter once all values are bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_id_rule: Option<CanonicalIdRule>,
}
impl RegionQuery {
    pub fn new<R: Into<RootEntities>>(root_entities: R) -> Self {
        Self {
            root_entities: root_entities.into(),
            languages: Vec::new(),
            fields: IndexMap::new(),
            depth: default_depth(),
            condition: None,
            canonical_id_rule: None,
        }
    }

    pub fn with_languages<I: IntoIterator<Item = S>, S: Into<String>>(mut self, languages: I) -> Self {
        self.languages = languages.into_iter().map(|l| l.into()).collect();
        self
    }

    pub fn with_field<V: Into<String>, P: Into<String>>(mut self, variable: V, property: P) -> Self {
        self.fields.insert(variable.into(), property.into());
        self
    }

    pub fn with_depth(mut self, depth: NonZeroU32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_condition<C: Into<String>>(mut self, condition: C) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_canonical_id_rule(mut self, rule: CanonicalIdRule) -> Self {
        self.canonical_id_rule = Some(rule);
        self
    }
}
