//! Known station codes.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::Crs;

use super::error::StationError;

/// One entry of the station reference list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    pub crs_code: String,
    pub name: String,
}

/// Accepted layouts of the reference file: a bare list or `{"stations": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum StationFile {
    List(Vec<StationDto>),
    Wrapped { stations: Vec<StationDto> },
}

/// The fixed allow-set of station codes.
///
/// Cheap to clone; all clones share the same read-only map.
#[derive(Debug, Clone)]
pub struct StationCodes {
    inner: Arc<HashMap<Crs, String>>,
}

impl StationCodes {
    /// Load the station list from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| StationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file: StationFile =
            serde_json::from_str(&contents).map_err(|e| StationError::Json {
                message: e.to_string(),
            })?;
        let stations = match file {
            StationFile::List(stations) | StationFile::Wrapped { stations } => stations,
        };

        let codes = Self::from_stations(stations);
        if codes.is_empty() {
            return Err(StationError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(codes)
    }

    /// Build the allow-set from station entries, dropping invalid codes.
    pub fn from_stations(stations: impl IntoIterator<Item = StationDto>) -> Self {
        Self {
            inner: Arc::new(build_map(stations)),
        }
    }

    /// Whether `code` names a known station (case-insensitive).
    pub fn validate(&self, code: &str) -> bool {
        self.resolve(code).is_some()
    }

    /// Whether both codes name known stations.
    pub fn validate_pair(&self, first: &str, second: &str) -> bool {
        self.validate(first) && self.validate(second)
    }

    /// The CRS for `code` if it names a known station.
    pub fn resolve(&self, code: &str) -> Option<Crs> {
        Crs::parse_normalized(code)
            .ok()
            .filter(|crs| self.inner.contains_key(crs))
    }

    /// Look up a station name by CRS code.
    pub fn name(&self, crs: &Crs) -> Option<&str> {
        self.inner.get(crs).map(String::as_str)
    }

    /// All stations, ordered by name.
    pub fn by_name(&self) -> Vec<(Crs, &str)> {
        let mut stations: Vec<_> = self
            .inner
            .iter()
            .map(|(crs, name)| (*crs, name.as_str()))
            .collect();
        stations.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(&b.0)));
        stations
    }

    /// Get the number of known stations.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Build the CRS → name map from station DTOs.
fn build_map(stations: impl IntoIterator<Item = StationDto>) -> HashMap<Crs, String> {
    stations
        .into_iter()
        .filter_map(|s| Crs::parse_normalized(s.crs_code.trim()).ok().map(|crs| (crs, s.name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn dto(code: &str, name: &str) -> StationDto {
        StationDto {
            crs_code: code.to_string(),
            name: name.to_string(),
        }
    }

    fn sample() -> StationCodes {
        StationCodes::from_stations([
            dto("KGX", "London Kings Cross"),
            dto("pad", "London Paddington"),
            dto("invalid", "Bad Station"),
        ])
    }

    #[test]
    fn build_map_filters_invalid_and_upper_cases() {
        let codes = sample();
        assert_eq!(codes.len(), 2);
        assert_eq!(
            codes.name(&Crs::parse("PAD").unwrap()),
            Some("London Paddington")
        );
    }

    #[test]
    fn validate_is_case_insensitive() {
        let codes = sample();
        assert!(codes.validate("KGX"));
        assert!(codes.validate("kgx"));
        assert!(codes.validate("Pad"));
        assert!(!codes.validate("ZZZ"));
        assert!(!codes.validate(""));
        assert!(!codes.validate("KGXX"));
        assert!(!codes.validate(" KGX"));
        assert!(!codes.validate("kgx "));
    }

    #[test]
    fn validate_pair_requires_both() {
        let codes = sample();
        assert!(codes.validate_pair("KGX", "PAD"));
        assert!(!codes.validate_pair("KGX", "ZZZ"));
        assert!(!codes.validate_pair("ZZZ", "PAD"));
    }

    #[test]
    fn by_name_is_sorted() {
        let codes = StationCodes::from_stations([
            dto("YRK", "York"),
            dto("ABD", "Aberdeen"),
            dto("KGX", "London Kings Cross"),
        ]);
        let names: Vec<_> = codes.by_name().into_iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["Aberdeen", "London Kings Cross", "York"]);
    }

    #[test]
    fn load_bare_and_wrapped_lists() {
        let dir = tempdir().unwrap();

        let bare = dir.path().join("bare.json");
        std::fs::write(&bare, r#"[{"crsCode": "KGX", "name": "London Kings Cross"}]"#).unwrap();
        assert!(StationCodes::load(&bare).unwrap().validate("KGX"));

        let wrapped = dir.path().join("wrapped.json");
        std::fs::write(
            &wrapped,
            r#"{"stations": [{"crsCode": "yrk", "name": "York"}]}"#,
        )
        .unwrap();
        assert!(StationCodes::load(&wrapped).unwrap().validate("YRK"));
    }

    #[test]
    fn load_rejects_missing_and_empty_files() {
        let dir = tempdir().unwrap();

        let missing = StationCodes::load(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(StationError::Io { .. })));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert!(matches!(
            StationCodes::load(&empty),
            Err(StationError::Empty { .. })
        ));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "Code,Station name").unwrap();
        assert!(matches!(
            StationCodes::load(&garbage),
            Err(StationError::Json { .. })
        ));
    }
}
