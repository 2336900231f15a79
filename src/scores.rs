//! Per-domain depth scores and where they come from
//!
//! Scores are read once when the view mounts. Any failure along the way is
//! logged and replaced by `DomainScores::default()`; the simulator never
//! sees an error.

use crate::domain::Domain;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest depth a single domain can start with
pub const MAX_DEPTH_SCORE: u32 = 200;

/// Scores used when the source has nothing to offer
const DEFAULT_DEPTHS: [u32; 5] = [3, 2, 2, 1, 1];

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("score request failed: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("could not read score file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON scores: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed TOML scores: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("expected an object of domain scores, got {0}")]
    Shape(&'static str),
}

/// Depth counts for all five domains
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomainScores {
    depths: [u32; 5],
}

impl Default for DomainScores {
    fn default() -> Self {
        Self { depths: DEFAULT_DEPTHS }
    }
}

impl DomainScores {
    pub fn zero() -> Self {
        Self { depths: [0; 5] }
    }

    pub fn get(&self, domain: Domain) -> u32 {
        self.depths[domain.index()]
    }

    pub fn with(mut self, domain: Domain, depth: u32) -> Self {
        self.depths[domain.index()] = depth.min(MAX_DEPTH_SCORE);
        self
    }

    /// Build scores from raw key/value pairs. Unknown keys are skipped,
    /// missing domains stay at zero.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut scores = Self::zero();
        for (key, value) in pairs {
            match Domain::from_key(key) {
                Some(domain) => scores = scores.with(domain, normalize(value)),
                None => debug!("ignoring unknown score key '{}'", key),
            }
        }
        scores
    }

    pub fn to_map(&self) -> BTreeMap<Domain, u32> {
        Domain::ALL.iter().map(|d| (*d, self.get(*d))).collect()
    }
}

/// Clamp a raw score into a usable depth
fn normalize(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value.round() as u32).min(MAX_DEPTH_SCORE)
}

/// Where domain scores are read from
#[derive(Clone, Debug, PartialEq)]
pub enum ScoreSource {
    Defaults,
    File(PathBuf),
    Remote { endpoint: String, user: String },
}

impl ScoreSource {
    /// Read scores. `Ok(None)` means the source answered but had no data.
    pub fn fetch(&self) -> Result<Option<DomainScores>, ScoreError> {
        match self {
            ScoreSource::Defaults => Ok(None),
            ScoreSource::File(path) => read_file(path),
            ScoreSource::Remote { endpoint, user } => fetch_remote(endpoint, user),
        }
    }

    /// Read scores, falling back to defaults on absence or failure
    pub fn load(&self) -> DomainScores {
        match self.fetch() {
            Ok(Some(scores)) => {
                info!("loaded domain scores from {:?}: {:?}", self, scores.to_map());
                scores
            }
            Ok(None) => {
                info!("no domain scores available, using defaults");
                DomainScores::default()
            }
            Err(e) => {
                warn!("failed to load domain scores ({}), using defaults", e);
                DomainScores::default()
            }
        }
    }
}

fn read_file(path: &Path) -> Result<Option<DomainScores>, ScoreError> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let value: Value = if is_toml {
        let table: toml::Table = toml::from_str(&content)?;
        serde_json::to_value(table)?
    } else {
        serde_json::from_str(&content)?
    };
    parse_value(&value)
}

fn fetch_remote(endpoint: &str, user: &str) -> Result<Option<DomainScores>, ScoreError> {
    let url = format!("{}?user_id={}", endpoint, urlencoding::encode(user));
    debug!("requesting domain scores from {}", url);

    let response = ureq::get(&url).call().map_err(Box::new)?;
    let value: Value = response.into_json()?;
    parse_value(&value)
}

/// Accepts a flat object or an array of rows (first row wins)
pub fn parse_value(value: &Value) -> Result<Option<DomainScores>, ScoreError> {
    let object = match value {
        Value::Object(map) => map,
        Value::Array(rows) => match rows.first() {
            Some(Value::Object(map)) => map,
            Some(_) => return Err(ScoreError::Shape("an array of non-objects")),
            None => return Ok(None),
        },
        Value::Null => return Ok(None),
        _ => return Err(ScoreError::Shape("a scalar")),
    };

    let pairs = object
        .iter()
        .filter_map(|(key, v)| v.as_f64().map(|n| (key.as_str(), n)));
    Ok(Some(DomainScores::from_pairs(pairs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn defaults_are_small_and_positive() {
        let scores = DomainScores::default();
        for domain in Domain::ALL {
            let depth = scores.get(domain);
            assert!((1..=3).contains(&depth));
        }
    }

    #[test]
    fn missing_keys_are_zero_in_present_map() {
        let value = json!({ "self_awareness": 3, "life-sciences": 0, "universal_laws": 6 });
        let scores = parse_value(&value).unwrap().unwrap();
        assert_eq!(scores.get(Domain::SelfAwareness), 3);
        assert_eq!(scores.get(Domain::LifeSciences), 0);
        assert_eq!(scores.get(Domain::UniversalLaws), 6);
        assert_eq!(scores.get(Domain::CreativeExpression), 0);
        assert_eq!(scores.get(Domain::SocialConnection), 0);
    }

    #[test]
    fn invalid_numbers_are_normalized() {
        let scores = DomainScores::from_pairs([
            ("self_awareness", -4.0),
            ("life_sciences", f64::NAN),
            ("universal_laws", 2.6),
            ("creative_expression", 1e9),
        ]);
        assert_eq!(scores.get(Domain::SelfAwareness), 0);
        assert_eq!(scores.get(Domain::LifeSciences), 0);
        assert_eq!(scores.get(Domain::UniversalLaws), 3);
        assert_eq!(scores.get(Domain::CreativeExpression), MAX_DEPTH_SCORE);
    }

    #[test]
    fn row_arrays_use_first_row() {
        let value = json!([{ "social_connection": 4, "user_id": "abc" }, { "social_connection": 9 }]);
        let scores = parse_value(&value).unwrap().unwrap();
        assert_eq!(scores.get(Domain::SocialConnection), 4);
    }

    #[test]
    fn empty_rows_mean_no_data() {
        assert_eq!(parse_value(&json!([])).unwrap(), None);
        assert_eq!(parse_value(&Value::Null).unwrap(), None);
        assert!(parse_value(&json!(7)).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let source = ScoreSource::File(PathBuf::from("/nonexistent/mindroots/scores.json"));
        assert!(source.fetch().is_err());
        assert_eq!(source.load(), DomainScores::default());
    }

    #[test]
    fn toml_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "self-awareness = 5\nlife_sciences = 1.4").unwrap();

        let scores = ScoreSource::File(path).load();
        assert_eq!(scores.get(Domain::SelfAwareness), 5);
        assert_eq!(scores.get(Domain::LifeSciences), 1);
        assert_eq!(scores.get(Domain::UniversalLaws), 0);
    }

    #[test]
    fn defaults_source_yields_default_scores() {
        assert_eq!(ScoreSource::Defaults.load(), DomainScores::default());
    }
}
