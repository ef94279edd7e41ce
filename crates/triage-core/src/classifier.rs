//! Risk classification from reported symptom codes.

use crate::{EngineConfig, TriageError, TriageResult};
use std::collections::BTreeSet;
use std::sync::Arc;
use triage_types::{RiskLevel, SymptomCode};

/// Number of critical symptoms at or above which an intake is classified
/// high-risk. This is the single clinical decision rule in the system;
/// changing it changes classification outcomes for the whole population.
pub const HIGH_RISK_CRITICAL_THRESHOLD: usize = 2;

/// Classifies a set of reported symptoms against the configured vocabulary.
///
/// Purely a function of its inputs and the startup configuration: no side
/// effects, no mutable state. The same symptom set (in any order, with any
/// duplication) always classifies to the same [`RiskLevel`].
#[derive(Clone)]
pub struct RiskClassifier {
    cfg: Arc<EngineConfig>,
}

impl RiskClassifier {
    pub fn new(cfg: Arc<EngineConfig>) -> Self {
        Self { cfg }
    }

    /// Validates the reported codes and computes the risk level.
    ///
    /// Duplicates are collapsed before counting. The whole set is rejected if
    /// any code is absent from the vocabulary; no partial classification is
    /// ever returned.
    ///
    /// # Errors
    ///
    /// - `TriageError::EmptySymptoms` if no symptoms were reported
    /// - `TriageError::UnknownSymptoms` listing every code missing from the
    ///   vocabulary
    pub fn classify(&self, symptoms: &[SymptomCode]) -> TriageResult<RiskLevel> {
        let symptoms: BTreeSet<&SymptomCode> = symptoms.iter().collect();
        if symptoms.is_empty() {
            return Err(TriageError::EmptySymptoms);
        }

        let vocabulary = self.cfg.vocabulary();
        let unknown: Vec<SymptomCode> = symptoms
            .iter()
            .filter(|code| !vocabulary.contains(code))
            .map(|code| (*code).clone())
            .collect();
        if !unknown.is_empty() {
            return Err(TriageError::UnknownSymptoms(unknown));
        }

        let critical_count = symptoms
            .iter()
            .filter(|code| vocabulary.is_critical(code))
            .count();

        if critical_count >= HIGH_RISK_CRITICAL_THRESHOLD {
            Ok(RiskLevel::High)
        } else {
            Ok(RiskLevel::Low)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymptomVocabulary;

    fn code(s: &str) -> SymptomCode {
        SymptomCode::new(s).expect("valid code")
    }

    fn classifier() -> RiskClassifier {
        let vocabulary = SymptomVocabulary::from_entries([
            (code("diarreia_agua_de_arroz"), true),
            (code("vomitos_frequentes"), true),
            (code("desidratacao_grave"), true),
            (code("febre"), false),
            (code("dor_de_cabeca"), false),
            (code("caimbras"), false),
        ])
        .expect("valid vocabulary");
        let cfg = EngineConfig::new(vocabulary, 4).expect("valid config");
        RiskClassifier::new(Arc::new(cfg))
    }

    #[test]
    fn two_critical_symptoms_classify_high() {
        let risk = classifier()
            .classify(&[code("diarreia_agua_de_arroz"), code("vomitos_frequentes")])
            .expect("should classify");
        assert_eq!(risk, RiskLevel::High);
    }

    #[test]
    fn non_critical_symptoms_classify_low() {
        let risk = classifier()
            .classify(&[code("febre"), code("dor_de_cabeca")])
            .expect("should classify");
        assert_eq!(risk, RiskLevel::Low);
    }

    #[test]
    fn exactly_one_critical_symptom_classifies_low() {
        let risk = classifier()
            .classify(&[code("diarreia_agua_de_arroz"), code("febre")])
            .expect("should classify");
        assert_eq!(risk, RiskLevel::Low);
    }

    #[test]
    fn duplicated_critical_symptom_counts_once() {
        // The same critical code reported twice is one symptom, not two.
        let risk = classifier()
            .classify(&[
                code("vomitos_frequentes"),
                code("vomitos_frequentes"),
                code("febre"),
            ])
            .expect("should classify");
        assert_eq!(risk, RiskLevel::Low);
    }

    #[test]
    fn classification_is_order_independent() {
        let forward = classifier()
            .classify(&[code("desidratacao_grave"), code("vomitos_frequentes")])
            .expect("should classify");
        let reversed = classifier()
            .classify(&[code("vomitos_frequentes"), code("desidratacao_grave")])
            .expect("should classify");
        assert_eq!(forward, reversed);
        assert_eq!(forward, RiskLevel::High);
    }

    #[test]
    fn empty_symptom_set_is_rejected() {
        let err = classifier().classify(&[]).expect_err("should reject empty set");
        assert!(matches!(err, TriageError::EmptySymptoms));
    }

    #[test]
    fn unknown_symptom_rejects_whole_set() {
        let err = classifier()
            .classify(&[
                code("diarreia_agua_de_arroz"),
                code("vomitos_frequentes"),
                code("sintoma_desconhecido"),
            ])
            .expect_err("should reject unknown code");
        assert!(
            matches!(err, TriageError::UnknownSymptoms(unknown) if unknown == vec![code("sintoma_desconhecido")])
        );
    }

    #[test]
    fn all_unknown_symptoms_are_listed() {
        let err = classifier()
            .classify(&[code("zzz"), code("aaa"), code("febre")])
            .expect_err("should reject unknown codes");
        match err {
            TriageError::UnknownSymptoms(unknown) => {
                assert_eq!(unknown, vec![code("aaa"), code("zzz")]);
            }
            other => panic!("expected UnknownSymptoms, got {other:?}"),
        }
    }
}
