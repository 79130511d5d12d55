use std::{fmt, io};

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod detail;
pub mod fetch;
pub mod output;

pub use catalog::{fetch_catalog, Catalog, SpellFailure};
pub use fetch::RetryPolicy;

/// One spell as printed on its library detail page. Built in a single parse
/// pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub name: Option<String>,
    pub formula: Option<String>,
    pub vocation_to_cast: Vec<String>,
    pub group: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub cooldown: Option<String>,
    pub group_cooldown: Option<String>,
    pub minimum_level: u32,
    pub mana_cost: u32,
    pub price_to_learn: u32,
    pub cities_to_learn: Vec<String>,
    pub premium_only: bool,
    pub soul_points: u32,
    pub charges: u32,
    pub damage_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocation {
    Druid,
    Sorcerer,
    Paladin,
    Knight,
}

impl fmt::Display for Vocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the listing form expects lowercase vocation names
        f.write_str(match self {
            Self::Druid => "druid",
            Self::Sorcerer => "sorcerer",
            Self::Paladin => "paladin",
            Self::Knight => "knight",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpellGroup {
    Attack,
    Healing,
    Support,
}

impl fmt::Display for SpellGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attack => "Attack",
            Self::Healing => "Healing",
            Self::Support => "Support",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpellType {
    Instant,
    Rune,
}

impl fmt::Display for SpellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Instant => "Instant",
            Self::Rune => "Rune",
        })
    }
}

/// Listing filter. `Default` requests the full unfiltered catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellFilter {
    pub vocation: Option<Vocation>,
    pub group: Option<SpellGroup>,
    pub kind: Option<SpellType>,
    pub premium_only: bool,
}

impl SpellFilter {
    /// Form fields for the listing POST. Unset filters encode as the empty
    /// string; the premium flag encodes as literal "yes" or empty.
    pub(crate) fn as_form(&self) -> [(&'static str, String); 4] {
        fn text(v: Option<impl fmt::Display>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }
        [
            ("vocation", text(self.vocation)),
            ("group", text(self.group)),
            ("type", text(self.kind)),
            ("premium", if self.premium_only { "yes".into() } else { String::new() }),
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Reqwest({0})")]
    Reqwest(#[from] reqwest::Error),
    #[error("Io({0})")]
    Io(#[from] io::Error),
    #[error("Json({0})")]
    Json(#[from] serde_json::Error),
    #[error("spell listing request failed with status {0}")]
    Listing(reqwest::StatusCode),
    #[error("spell listing response had an empty body")]
    EmptyListing,
}
