#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Static region catalog for the surveillance map.
//!
//! Lookup tables only: UF codes and abbreviations, macro-regions and their
//! framing boxes, sewage coverage per UF, capitals and the curated
//! municipalities queried when a UF is expanded. Nothing here performs
//! I/O beyond parsing data embedded at compile time.

pub mod localities;
pub mod region;
pub mod sanitation;
pub mod uf;

use serde::{Deserialize, Serialize};

pub use region::Region;
pub use sanitation::{Sanitation, SanitationMetric};

/// IBGE numeric code of a federative unit (state or the Federal District).
///
/// Only codes present in [`uf::UF_CODES`] can be constructed outside this
/// crate, so holding a `UfCode` means the unit is part of the national
/// enumeration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct UfCode(u8);

impl UfCode {
    /// Used only for the compile-time tables in this crate.
    pub(crate) const fn known(code: u8) -> Self {
        Self(code)
    }

    /// Returns the code if it belongs to the national enumeration.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        uf::UF_CODES.iter().copied().find(|uf| u32::from(uf.0) == code)
    }

    /// Looks up a UF by its two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn from_abbr(abbr: &str) -> Option<Self> {
        uf::abbr_to_uf(abbr)
    }

    /// The numeric IBGE code.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Two-letter abbreviation (e.g. `"SP"`).
    #[must_use]
    pub fn abbr(self) -> &'static str {
        uf::uf_abbr(self)
    }

    /// Full name (e.g. `"São Paulo"`).
    #[must_use]
    pub fn name(self) -> &'static str {
        uf::uf_name(self)
    }

    /// Macro-region the UF belongs to.
    #[must_use]
    pub fn region(self) -> Region {
        uf::uf_region(self)
    }
}

impl std::fmt::Display for UfCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for UfCode {
    type Error = UnknownUfError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(UnknownUfError { code })
    }
}

impl From<UfCode> for u32 {
    fn from(uf: UfCode) -> Self {
        Self::from(uf.0)
    }
}

/// Error returned for a code outside the national UF enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownUfError {
    /// The rejected code.
    pub code: u32,
}

impl std::fmt::Display for UnknownUfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown UF code {}", self.code)
    }
}

impl std::error::Error for UnknownUfError {}

/// 7-digit IBGE municipality geocode (e.g. `3550308` for São Paulo).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MunicipalityCode(pub u32);

impl MunicipalityCode {
    /// The UF encoded in the first two digits of the geocode.
    #[must_use]
    pub fn uf(self) -> Option<UfCode> {
        UfCode::from_code(self.0 / 100_000)
    }
}

impl std::fmt::Display for MunicipalityCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
