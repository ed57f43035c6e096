//! Macro-regions used by the region filter.

use epi_map_geography_models::BoundingBox;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::UfCode;

/// IBGE macro-region, plus `All` for "no filter".
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Region {
    /// Norte
    North,
    /// Nordeste
    Northeast,
    /// Sudeste
    Southeast,
    /// Sul
    South,
    /// Centro-Oeste
    CenterWest,
    /// The whole country.
    #[default]
    All,
}

impl Region {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::North,
            Self::Northeast,
            Self::Southeast,
            Self::South,
            Self::CenterWest,
            Self::All,
        ]
    }

    /// Rectangle used to frame the map when the region is selected.
    #[must_use]
    pub const fn bounds(self) -> BoundingBox {
        match self {
            Self::North => BoundingBox::new(-74.0, -13.7, -46.0, 5.3),
            Self::Northeast => BoundingBox::new(-48.8, -18.4, -34.7, -1.0),
            Self::Southeast => BoundingBox::new(-53.2, -25.4, -39.6, -14.2),
            Self::South => BoundingBox::new(-57.7, -33.8, -48.0, -22.5),
            Self::CenterWest => BoundingBox::new(-61.7, -24.1, -45.9, -7.3),
            Self::All => BoundingBox::new(-74.0, -33.8, -34.7, 5.3),
        }
    }

    /// Whether the UF falls inside this filter. `All` contains every UF.
    #[must_use]
    pub fn contains(self, uf: UfCode) -> bool {
        self == Self::All || uf.region() == self
    }

    /// Portuguese display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::North => "Norte",
            Self::Northeast => "Nordeste",
            Self::Southeast => "Sudeste",
            Self::South => "Sul",
            Self::CenterWest => "Centro-Oeste",
            Self::All => "Brasil",
        }
    }
}
