//! Engine runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the
//! engine's components explicitly. Nothing in this module reads environment
//! variables during request handling; the binaries resolve their environment
//! up front and construct an immutable [`EngineConfig`] from it.

use crate::{TriageError, TriageResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use triage_types::SymptomCode;

/// Default bound on concurrent outbound routing calls during resolution.
pub const DEFAULT_MAX_CONCURRENT_ROUTES: usize = 4;

/// Relative path of the vocabulary file searched for when no override is
/// given.
pub const VOCABULARY_FILE: &str = "config/vocabulary.yaml";

#[derive(Debug, serde::Deserialize)]
struct VocabularyEntry {
    critical: bool,
}

/// The configured symptom vocabulary: every recognised symptom code together
/// with its is-critical flag.
///
/// Loaded once at startup and read-only thereafter; no interior mutability,
/// so it can be shared freely between request handlers without locking.
#[derive(Debug, Clone)]
pub struct SymptomVocabulary {
    entries: BTreeMap<SymptomCode, bool>,
}

impl SymptomVocabulary {
    /// Builds a vocabulary from `(code, critical)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidConfig` if the resulting vocabulary is
    /// empty.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (SymptomCode, bool)>,
    ) -> TriageResult<Self> {
        let entries: BTreeMap<SymptomCode, bool> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(TriageError::InvalidConfig(
                "symptom vocabulary cannot be empty".into(),
            ));
        }
        Ok(Self { entries })
    }

    /// Loads a vocabulary from a YAML file of `code: { critical: bool }`
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns a `TriageError` if the file cannot be read, fails to parse,
    /// contains an invalid code, or is empty.
    pub fn load_from_file(path: &Path) -> TriageResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(TriageError::ConfigRead)?;
        let raw: BTreeMap<String, VocabularyEntry> =
            serde_yaml::from_str(&contents).map_err(TriageError::ConfigParse)?;

        let mut entries = BTreeMap::new();
        for (code, entry) in raw {
            let code = SymptomCode::new(&code).map_err(|e| {
                TriageError::InvalidConfig(format!("invalid vocabulary code {code:?}: {e}"))
            })?;
            entries.insert(code, entry.critical);
        }

        Self::from_entries(entries)
    }

    /// Whether the vocabulary recognises `code`.
    pub fn contains(&self, code: &SymptomCode) -> bool {
        self.entries.contains_key(code)
    }

    /// Whether `code` is flagged as contributing to high-risk classification.
    /// Unknown codes are not critical.
    pub fn is_critical(&self, code: &SymptomCode) -> bool {
        self.entries.get(code).copied().unwrap_or(false)
    }

    /// The configured critical codes, in deterministic order.
    pub fn critical_codes(&self) -> impl Iterator<Item = &SymptomCode> {
        self.entries
            .iter()
            .filter(|(_, critical)| **critical)
            .map(|(code, _)| code)
    }

    /// All configured codes with their critical flag, in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&SymptomCode, bool)> {
        self.entries.iter().map(|(code, critical)| (code, *critical))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Engine configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    vocabulary: SymptomVocabulary,
    max_concurrent_routes: usize,
}

impl EngineConfig {
    /// Create a new `EngineConfig`.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidConfig` if the fan-out bound is zero.
    pub fn new(
        vocabulary: SymptomVocabulary,
        max_concurrent_routes: usize,
    ) -> TriageResult<Self> {
        if max_concurrent_routes == 0 {
            return Err(TriageError::InvalidConfig(
                "max_concurrent_routes must be at least 1".into(),
            ));
        }

        Ok(Self {
            vocabulary,
            max_concurrent_routes,
        })
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    pub fn max_concurrent_routes(&self) -> usize {
        self.max_concurrent_routes
    }
}

/// Resolve the vocabulary file without reading environment variables.
///
/// If `override_path` is provided, it must be an existing file. Otherwise
/// this checks `config/vocabulary.yaml` relative to the current working
/// directory and then walks up from `CARGO_MANIFEST_DIR`.
pub fn resolve_vocabulary_path(override_path: Option<PathBuf>) -> TriageResult<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Ok(path);
        }
        return Err(TriageError::InvalidConfig(format!(
            "vocabulary override is not a file: {}",
            path.display()
        )));
    }

    let cwd_relative = PathBuf::from(VOCABULARY_FILE);
    if cwd_relative.is_file() {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(VOCABULARY_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(TriageError::InvalidConfig(format!(
        "could not locate {VOCABULARY_FILE}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn code(s: &str) -> SymptomCode {
        SymptomCode::new(s).expect("valid code")
    }

    #[test]
    fn vocabulary_rejects_empty_entries() {
        let err = SymptomVocabulary::from_entries([]).expect_err("should reject empty vocabulary");
        assert!(matches!(err, TriageError::InvalidConfig(msg) if msg.contains("empty")));
    }

    #[test]
    fn vocabulary_reports_critical_flags() {
        let vocabulary = SymptomVocabulary::from_entries([
            (code("desidratacao_grave"), true),
            (code("febre"), false),
        ])
        .expect("valid vocabulary");

        assert!(vocabulary.contains(&code("febre")));
        assert!(vocabulary.is_critical(&code("desidratacao_grave")));
        assert!(!vocabulary.is_critical(&code("febre")));
        assert!(!vocabulary.is_critical(&code("inexistente")));
        assert_eq!(vocabulary.critical_codes().count(), 1);
    }

    #[test]
    fn vocabulary_loads_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "diarreia_agua_de_arroz:\n  critical: true\nfebre:\n  critical: false"
        )
        .expect("write fixture");

        let vocabulary =
            SymptomVocabulary::load_from_file(file.path()).expect("should load fixture");
        assert_eq!(vocabulary.len(), 2);
        assert!(vocabulary.is_critical(&code("diarreia_agua_de_arroz")));
    }

    #[test]
    fn vocabulary_load_rejects_malformed_yaml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "febre: [not, a, mapping]").expect("write fixture");

        let err = SymptomVocabulary::load_from_file(file.path()).expect_err("should reject");
        assert!(matches!(err, TriageError::ConfigParse(_)));
    }

    #[test]
    fn vocabulary_load_reports_missing_file() {
        let err = SymptomVocabulary::load_from_file(Path::new("/nonexistent/vocabulary.yaml"))
            .expect_err("should report read failure");
        assert!(matches!(err, TriageError::ConfigRead(_)));
    }

    #[test]
    fn engine_config_rejects_zero_fan_out() {
        let vocabulary =
            SymptomVocabulary::from_entries([(code("febre"), false)]).expect("valid vocabulary");
        let err = EngineConfig::new(vocabulary, 0).expect_err("should reject zero bound");
        assert!(matches!(err, TriageError::InvalidConfig(_)));
    }

    #[test]
    fn resolve_vocabulary_path_rejects_missing_override() {
        let err = resolve_vocabulary_path(Some(PathBuf::from("/nonexistent/vocab.yaml")))
            .expect_err("should reject missing override");
        assert!(matches!(err, TriageError::InvalidConfig(_)));
    }

    #[test]
    fn resolve_vocabulary_path_accepts_file_override() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let resolved = resolve_vocabulary_path(Some(file.path().to_path_buf()))
            .expect("override should resolve");
        assert_eq!(resolved, file.path());
    }
}
