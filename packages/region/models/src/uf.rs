//! Brazilian federative unit (UF) code utilities.
//!
//! Provides mappings between IBGE numeric UF codes, two-letter
//! abbreviations, full names and macro-regions for the 26 states plus the
//! Federal District.

use crate::{Region, UfCode};

/// IBGE codes for the 26 states + DF, in ascending order.
pub const UF_CODES: &[UfCode] = &[
    UfCode::known(11),
    UfCode::known(12),
    UfCode::known(13),
    UfCode::known(14),
    UfCode::known(15),
    UfCode::known(16),
    UfCode::known(17),
    UfCode::known(21),
    UfCode::known(22),
    UfCode::known(23),
    UfCode::known(24),
    UfCode::known(25),
    UfCode::known(26),
    UfCode::known(27),
    UfCode::known(28),
    UfCode::known(29),
    UfCode::known(31),
    UfCode::known(32),
    UfCode::known(33),
    UfCode::known(35),
    UfCode::known(41),
    UfCode::known(42),
    UfCode::known(43),
    UfCode::known(50),
    UfCode::known(51),
    UfCode::known(52),
    UfCode::known(53),
];

/// Maps a UF code to its two-letter abbreviation.
#[must_use]
pub const fn uf_abbr(uf: UfCode) -> &'static str {
    match uf.value() {
        11 => "RO",
        12 => "AC",
        13 => "AM",
        14 => "RR",
        15 => "PA",
        16 => "AP",
        17 => "TO",
        21 => "MA",
        22 => "PI",
        23 => "CE",
        24 => "RN",
        25 => "PB",
        26 => "PE",
        27 => "AL",
        28 => "SE",
        29 => "BA",
        31 => "MG",
        32 => "ES",
        33 => "RJ",
        35 => "SP",
        41 => "PR",
        42 => "SC",
        43 => "RS",
        50 => "MS",
        51 => "MT",
        52 => "GO",
        53 => "DF",
        _ => "??",
    }
}

/// Maps a UF code to its full name.
#[must_use]
pub const fn uf_name(uf: UfCode) -> &'static str {
    match uf.value() {
        11 => "Rondônia",
        12 => "Acre",
        13 => "Amazonas",
        14 => "Roraima",
        15 => "Pará",
        16 => "Amapá",
        17 => "Tocantins",
        21 => "Maranhão",
        22 => "Piauí",
        23 => "Ceará",
        24 => "Rio Grande do Norte",
        25 => "Paraíba",
        26 => "Pernambuco",
        27 => "Alagoas",
        28 => "Sergipe",
        29 => "Bahia",
        31 => "Minas Gerais",
        32 => "Espírito Santo",
        33 => "Rio de Janeiro",
        35 => "São Paulo",
        41 => "Paraná",
        42 => "Santa Catarina",
        43 => "Rio Grande do Sul",
        50 => "Mato Grosso do Sul",
        51 => "Mato Grosso",
        52 => "Goiás",
        53 => "Distrito Federal",
        _ => "Desconhecido",
    }
}

/// Maps a UF code to its macro-region. The first digit of the code is the
/// IBGE region number.
#[must_use]
pub const fn uf_region(uf: UfCode) -> Region {
    match uf.value() / 10 {
        1 => Region::North,
        2 => Region::Northeast,
        3 => Region::Southeast,
        4 => Region::South,
        5 => Region::CenterWest,
        _ => Region::All,
    }
}

/// Maps a two-letter abbreviation to its UF code (case-insensitive).
#[must_use]
pub fn abbr_to_uf(abbr: &str) -> Option<UfCode> {
    let abbr = abbr.trim();
    UF_CODES
        .iter()
        .copied()
        .find(|uf| uf_abbr(*uf).eq_ignore_ascii_case(abbr))
}
