//! Compile-time table of capitals and representative municipalities.
//!
//! The table lives in `data/localities.toml` and is embedded with
//! `include_str!`. Only the municipalities listed under `representative`
//! are queried for alerts when a UF is expanded on the map; UFs without
//! that list stay at state level.

use std::sync::LazyLock;

use serde::Deserialize;

use crate::{MunicipalityCode, UfCode};

const LOCALITIES_TOML: &str = include_str!("../data/localities.toml");

/// A municipality with its geocode and display name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Locality {
    /// IBGE geocode.
    pub code: MunicipalityCode,
    /// Display name.
    pub name: String,
}

/// Catalog entry for one UF.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitLocalities {
    /// The UF this entry describes.
    pub uf: UfCode,
    /// State capital.
    pub capital: Locality,
    /// Municipalities queried when the UF is expanded.
    #[serde(default)]
    pub representative: Vec<Locality>,
}

#[derive(Deserialize)]
struct LocalitiesFile {
    unit: Vec<UnitLocalities>,
}

static LOCALITIES: LazyLock<Vec<UnitLocalities>> = LazyLock::new(|| {
    toml::de::from_str::<LocalitiesFile>(LOCALITIES_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded localities table: {e}"))
        .unit
});

/// Returns the catalog entries for every UF.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed. The file is a compile-time
/// constant, so this indicates a development error caught by the tests.
#[must_use]
pub fn all_units() -> &'static [UnitLocalities] {
    &LOCALITIES
}

/// The capital of a UF.
#[must_use]
pub fn capital(uf: UfCode) -> Option<&'static Locality> {
    all_units()
        .iter()
        .find(|entry| entry.uf == uf)
        .map(|entry| &entry.capital)
}

/// Iterates over `(uf, capital)` pairs for the whole country.
pub fn capitals() -> impl Iterator<Item = (UfCode, &'static Locality)> {
    all_units().iter().map(|entry| (entry.uf, &entry.capital))
}

/// The curated municipalities for a UF, or `None` when the UF has no
/// curated list.
#[must_use]
pub fn representative_municipalities(uf: UfCode) -> Option<&'static [Locality]> {
    all_units()
        .iter()
        .find(|entry| entry.uf == uf)
        .map(|entry| entry.representative.as_slice())
        .filter(|list| !list.is_empty())
}
