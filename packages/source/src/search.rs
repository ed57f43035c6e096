//! Locality search over the IBGE directory.
//!
//! Names are folded before matching: lowercased, Portuguese diacritics
//! stripped and punctuation turned into single spaces, so `"sao jose"`
//! finds "São José dos Campos" and `"d'oeste"` finds "Alta Floresta
//! D'Oeste". The same folding runs at index time and query time.

use std::cmp::Ordering;
use std::sync::LazyLock;

use epi_map_region_models::UfCode;
use regex::Regex;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::{MunicipalityEntry, StateEntry};

/// Runs of anything that is not a letter or digit.
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));

/// What kind of locality a match is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LocalityKind {
    /// Federative unit.
    State,
    /// Municipality.
    Municipality,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalityMatch {
    /// State or municipality.
    pub kind: LocalityKind,
    /// UF code or municipality geocode.
    pub code: u32,
    /// Display name.
    pub name: String,
    /// UF the locality is in (itself, for states).
    pub uf: UfCode,
}

struct IndexedLocality {
    locality: LocalityMatch,
    folded: String,
    abbr: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchTier {
    Prefix,
    Substring,
}

/// In-memory index of states and municipalities.
pub struct LocalitySearch {
    entries: Vec<IndexedLocality>,
}

impl LocalitySearch {
    /// Indexes the given directory listings.
    ///
    /// Municipalities whose geocode doesn't map to a known UF are left
    /// out.
    #[must_use]
    pub fn new(states: &[StateEntry], municipalities: &[MunicipalityEntry]) -> Self {
        let states = states.iter().map(|s| IndexedLocality {
            folded: fold(&s.name),
            abbr: Some(s.abbr.to_lowercase()),
            locality: LocalityMatch {
                kind: LocalityKind::State,
                code: u32::from(s.uf),
                name: s.name.clone(),
                uf: s.uf,
            },
        });

        let municipalities = municipalities.iter().filter_map(|m| {
            let uf = m.uf()?;
            Some(IndexedLocality {
                folded: fold(&m.name),
                abbr: None,
                locality: LocalityMatch {
                    kind: LocalityKind::Municipality,
                    code: m.code.0,
                    name: m.name.clone(),
                    uf,
                },
            })
        });

        let entries: Vec<IndexedLocality> = states.chain(municipalities).collect();
        log::info!("Indexed {} localities for search", entries.len());
        Self { entries }
    }

    /// Number of indexed localities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `limit` localities matching `query`.
    ///
    /// Names starting with the query come first, then names containing
    /// it; each group is ordered by name. A state's abbreviation typed in
    /// full counts as a prefix match. A blank query matches nothing.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<&LocalityMatch> {
        let needle = fold(query);
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<(MatchTier, &IndexedLocality)> = self
            .entries
            .iter()
            .filter_map(|entry| tier(entry, &needle).map(|t| (t, entry)))
            .collect();

        hits.sort_by(|(ta, a), (tb, b)| {
            ta.cmp(tb)
                .then_with(|| a.folded.cmp(&b.folded))
                .then_with(|| compare_kind_and_code(&a.locality, &b.locality))
        });

        hits.into_iter()
            .take(limit)
            .map(|(_, entry)| &entry.locality)
            .collect()
    }
}

fn tier(entry: &IndexedLocality, needle: &str) -> Option<MatchTier> {
    if entry.folded.starts_with(needle) || entry.abbr.as_deref() == Some(needle) {
        Some(MatchTier::Prefix)
    } else if entry.folded.contains(needle) {
        Some(MatchTier::Substring)
    } else {
        None
    }
}

fn compare_kind_and_code(a: &LocalityMatch, b: &LocalityMatch) -> Ordering {
    a.kind.cmp(&b.kind).then(a.code.cmp(&b.code))
}

/// Folds a name for matching.
#[must_use]
pub fn fold(input: &str) -> String {
    let stripped: String = input.to_lowercase().chars().map(strip_diacritic).collect();
    let spaced = SEPARATOR_RE.replace_all(&stripped, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

const fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epi_map_region_models::MunicipalityCode;

    fn state(code: u32, abbr: &str, name: &str) -> StateEntry {
        StateEntry {
            uf: UfCode::from_code(code).unwrap(),
            abbr: abbr.to_string(),
            name: name.to_string(),
        }
    }

    fn municipality(code: u32, name: &str) -> MunicipalityEntry {
        MunicipalityEntry {
            code: MunicipalityCode(code),
            name: name.to_string(),
        }
    }

    fn index() -> LocalitySearch {
        LocalitySearch::new(
            &[
                state(35, "SP", "São Paulo"),
                state(25, "PB", "Paraíba"),
                state(41, "PR", "Paraná"),
            ],
            &[
                municipality(3_550_308, "São Paulo"),
                municipality(3_549_904, "São José dos Campos"),
                municipality(2_507_507, "João Pessoa"),
                municipality(4_106_902, "Curitiba"),
                municipality(1_100_015, "Alta Floresta D'Oeste"),
                municipality(9_900_001, "Nowhere"),
            ],
        )
    }

    #[test]
    fn folding_is_accent_and_case_insensitive() {
        assert_eq!(fold("  SÃO José-dos  Campos "), "sao jose dos campos");
        assert_eq!(fold("Alta Floresta D'Oeste"), "alta floresta d oeste");
        assert_eq!(fold("Paraíba"), "paraiba");
    }

    #[test]
    fn unknown_uf_municipalities_are_not_indexed() {
        assert_eq!(index().len(), 8);
    }

    #[test]
    fn prefix_matches_rank_before_substring_matches() {
        let index = index();
        let names: Vec<&str> = index
            .search("sao", 10)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["São José dos Campos", "São Paulo", "São Paulo"]);

        let pessoa = index.search("pessoa", 10);
        assert_eq!(pessoa.len(), 1);
        assert_eq!(pessoa[0].code, 2_507_507);

        let para = index.search("para", 10);
        assert_eq!(para[0].name, "Paraíba");
        assert_eq!(para[1].name, "Paraná");
    }

    #[test]
    fn same_name_orders_states_first() {
        let index = index();
        let hits = index.search("são paulo", 10);
        assert_eq!(hits[0].kind, LocalityKind::State);
        assert_eq!(hits[1].kind, LocalityKind::Municipality);
    }

    #[test]
    fn abbreviation_finds_the_state() {
        let index = index();
        let hits = index.search("PB", 5);
        assert_eq!(hits[0].kind, LocalityKind::State);
        assert_eq!(hits[0].code, 25);
    }

    #[test]
    fn punctuation_in_query_is_ignored() {
        let hits = index().search("d'oeste", 5).len();
        assert_eq!(hits, 1);
    }

    #[test]
    fn blank_query_and_zero_limit_return_nothing() {
        let index = index();
        assert!(index.search("   ", 10).is_empty());
        assert!(index.search("sao", 0).is_empty());
        assert_eq!(index.search("a", 2).len(), 2);
    }
}
