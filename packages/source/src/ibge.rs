//! IBGE locality directory and mesh endpoints.
//!
//! Directory: `{localities}/estados`, `{localities}/estados/{uf}/municipios`
//! and `{localities}/municipios`. Meshes are requested as `GeoJSON` at the
//! lowest quality IBGE offers, split by the next administrative level down
//! so each feature's `codarea` is a UF code (national mesh) or a
//! municipality geocode (state mesh).

use epi_map_region_models::{MunicipalityCode, UfCode};
use serde::Deserialize;

use crate::{MunicipalityEntry, StateEntry};

const MESH_FORMAT: &str = "formato=application/vnd.geo+json&qualidade=minima";

/// `GET /estados` row.
#[derive(Debug, Deserialize)]
pub struct IbgeState {
    /// Numeric UF code.
    pub id: u32,
    /// Abbreviation.
    pub sigla: String,
    /// Name.
    pub nome: String,
}

/// `GET /municipios` row. Only the fields the map uses are decoded.
#[derive(Debug, Deserialize)]
pub struct IbgeMunicipality {
    /// 7-digit geocode.
    pub id: u32,
    /// Name.
    pub nome: String,
}

/// URL of the state list.
#[must_use]
pub fn states_url(base: &str) -> String {
    format!("{}/estados", base.trim_end_matches('/'))
}

/// URL of one UF's municipality list.
#[must_use]
pub fn municipalities_url(base: &str, uf: UfCode) -> String {
    format!("{}/estados/{uf}/municipios", base.trim_end_matches('/'))
}

/// URL of the national municipality list.
#[must_use]
pub fn all_municipalities_url(base: &str) -> String {
    format!("{}/municipios", base.trim_end_matches('/'))
}

/// URL of the national mesh split by UF.
#[must_use]
pub fn national_mesh_url(base: &str) -> String {
    format!(
        "{}/paises/BR?{MESH_FORMAT}&intrarregiao=UF",
        base.trim_end_matches('/')
    )
}

/// URL of one UF's mesh split by municipality.
#[must_use]
pub fn unit_mesh_url(base: &str, uf: UfCode) -> String {
    format!(
        "{}/estados/{uf}?{MESH_FORMAT}&intrarregiao=municipio",
        base.trim_end_matches('/')
    )
}

/// Converts directory rows, dropping codes outside the UF enumeration.
#[must_use]
pub fn into_states(rows: Vec<IbgeState>) -> Vec<StateEntry> {
    let mut states: Vec<StateEntry> = rows
        .into_iter()
        .filter_map(|row| {
            let Some(uf) = UfCode::from_code(row.id) else {
                log::warn!("Unknown UF {} ({}) in IBGE directory", row.id, row.nome);
                return None;
            };
            Some(StateEntry {
                uf,
                abbr: row.sigla,
                name: row.nome,
            })
        })
        .collect();
    states.sort_by_key(|s| s.uf);
    states
}

/// Converts directory rows into municipality entries.
#[must_use]
pub fn into_municipalities(rows: Vec<IbgeMunicipality>) -> Vec<MunicipalityEntry> {
    rows.into_iter()
        .map(|row| MunicipalityEntry {
            code: MunicipalityCode(row.id),
            name: row.nome,
        })
        .collect()
}
