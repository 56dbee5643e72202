//! Correction records: the structured result of analysing one student text.
//!
//! The model answers with a loosely shaped JSON document ([`RawCorrection`]).
//! It may use English or Spanish keys, give errors grouped by category or as
//! a flat list, and write scores as integers or decimals. `into_record`
//! normalizes all of that into a [`CorrectionRecord`] and rejects documents
//! that are structurally valid JSON but unusable as feedback.

use crate::error::{CorrigeError, Result};
use crate::types::ErrorCategory;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const MAX_SCORE: u8 = 10;

// ---------------------------------------------------------------------------
// Normalized record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorItem {
    pub fragment: String,
    pub correction: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    /// 0 to 10.
    pub score: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualAnalysis {
    pub coherence: DimensionScore,
    pub cohesion: DimensionScore,
    pub register: DimensionScore,
    pub cultural_fit: DimensionScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_register: Option<String>,
}

impl ContextualAnalysis {
    pub fn dimensions(&self) -> [(&'static str, &DimensionScore); 4] {
        [
            ("coherence", &self.coherence),
            ("cohesion", &self.cohesion),
            ("register", &self.register),
            ("cultural_fit", &self.cultural_fit),
        ]
    }

    pub fn average(&self) -> f32 {
        let sum: u32 = self.dimensions().iter().map(|(_, d)| d.score as u32).sum();
        sum as f32 / 4.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    #[serde(default)]
    pub errors: BTreeMap<ErrorCategory, Vec<ErrorItem>>,
    pub corrected_text: String,
    pub contextual: ContextualAnalysis,
    #[serde(default)]
    pub advice: String,
}

impl CorrectionRecord {
    /// Error count for every category, including zero counts.
    pub fn error_counts(&self) -> BTreeMap<ErrorCategory, u32> {
        ErrorCategory::all()
            .iter()
            .map(|c| (*c, self.errors.get(c).map_or(0, |v| v.len() as u32)))
            .collect()
    }

    pub fn total_errors(&self) -> u32 {
        self.errors.values().map(|v| v.len() as u32).sum()
    }

    /// Errors per 100 words.
    pub fn error_rate(&self, word_count: usize) -> f32 {
        if word_count == 0 {
            return 0.0;
        }
        self.total_errors() as f32 * 100.0 / word_count as f32
    }
}

static WORD_RE: OnceLock<Regex> = OnceLock::new();

/// Count whitespace-separated tokens that contain at least one letter or
/// digit. Stray punctuation ("-", "...") does not count as a word.
pub fn word_count(text: &str) -> usize {
    let re = WORD_RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}]").unwrap());
    text.split_whitespace().filter(|t| re.is_match(t)).count()
}

// ---------------------------------------------------------------------------
// Raw model output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawErrorItem {
    #[serde(alias = "fragmento_erroneo", alias = "fragmento", alias = "original")]
    pub fragment: String,
    #[serde(default, alias = "correccion", alias = "corrected")]
    pub correction: String,
    #[serde(default, alias = "explicacion")]
    pub explanation: String,
    /// Only present in the flat-list shape.
    #[serde(default, alias = "categoria")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawErrors {
    ByCategory(BTreeMap<String, Vec<RawErrorItem>>),
    Flat(Vec<RawErrorItem>),
}

impl Default for RawErrors {
    fn default() -> Self {
        RawErrors::ByCategory(BTreeMap::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDimension {
    #[serde(alias = "puntuacion", alias = "puntuación")]
    pub score: f64,
    #[serde(default, alias = "comentario")]
    pub comment: String,
    #[serde(default, alias = "sugerencias")]
    pub suggestions: Vec<String>,
    #[serde(default, alias = "tipo_detectado")]
    pub detected: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawContextual {
    #[serde(alias = "coherencia")]
    pub coherence: RawDimension,
    #[serde(alias = "cohesión")]
    pub cohesion: RawDimension,
    #[serde(alias = "registro_linguistico", alias = "registro")]
    pub register: RawDimension,
    #[serde(alias = "adecuacion_cultural", alias = "cultural")]
    pub cultural_fit: RawDimension,
    #[serde(default, alias = "registro_detectado")]
    pub detected_register: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCorrection {
    #[serde(default, alias = "errores")]
    pub errors: RawErrors,
    #[serde(alias = "texto_corregido")]
    pub corrected_text: String,
    #[serde(alias = "analisis_contextual", alias = "análisis_contextual")]
    pub contextual: RawContextual,
    #[serde(default, alias = "consejo_final", alias = "consejo")]
    pub advice: String,
}

impl RawCorrection {
    /// Validate and normalize into a [`CorrectionRecord`].
    pub fn into_record(self) -> Result<CorrectionRecord> {
        if self.corrected_text.trim().is_empty() {
            return Err(CorrigeError::InvalidCorrection(
                "corrected_text is empty".to_string(),
            ));
        }

        let items: Vec<(ErrorCategory, RawErrorItem)> = match self.errors {
            RawErrors::ByCategory(map) => map
                .into_iter()
                .flat_map(|(key, items)| {
                    let cat = ErrorCategory::from_label(&key);
                    items.into_iter().map(move |i| (cat, i))
                })
                .collect(),
            RawErrors::Flat(list) => list
                .into_iter()
                .map(|i| {
                    let cat = i
                        .category
                        .as_deref()
                        .map(ErrorCategory::from_label)
                        .unwrap_or(ErrorCategory::Other);
                    (cat, i)
                })
                .collect(),
        };

        let mut errors: BTreeMap<ErrorCategory, Vec<ErrorItem>> = BTreeMap::new();
        for (cat, item) in items {
            if item.fragment.trim().is_empty() {
                return Err(CorrigeError::InvalidCorrection(format!(
                    "error item in '{cat}' has an empty fragment"
                )));
            }
            errors.entry(cat).or_default().push(ErrorItem {
                fragment: item.fragment.trim().to_string(),
                correction: item.correction.trim().to_string(),
                explanation: item.explanation.trim().to_string(),
            });
        }

        let c = self.contextual;
        let detected_register = c
            .detected_register
            .or_else(|| c.register.detected.clone())
            .filter(|s| !s.trim().is_empty());
        let contextual = ContextualAnalysis {
            coherence: dimension("coherence", c.coherence)?,
            cohesion: dimension("cohesion", c.cohesion)?,
            register: dimension("register", c.register)?,
            cultural_fit: dimension("cultural_fit", c.cultural_fit)?,
            detected_register,
        };

        Ok(CorrectionRecord {
            errors,
            corrected_text: self.corrected_text.trim().to_string(),
            contextual,
            advice: self.advice.trim().to_string(),
        })
    }
}

fn dimension(name: &str, raw: RawDimension) -> Result<DimensionScore> {
    if !raw.score.is_finite() || raw.score < 0.0 || raw.score > MAX_SCORE as f64 {
        return Err(CorrigeError::InvalidCorrection(format!(
            "{name} score {} is outside 0-{MAX_SCORE}",
            raw.score
        )));
    }
    Ok(DimensionScore {
        score: raw.score.round() as u8,
        comment: raw.comment.trim().to_string(),
        suggestions: raw
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A complete record used by other modules' tests.
    pub(crate) fn sample_record() -> CorrectionRecord {
        let raw: RawCorrection = serde_json::from_str(SAMPLE_ENGLISH).unwrap();
        raw.into_record().unwrap()
    }

    const SAMPLE_ENGLISH: &str = r#"{
        "errors": {
            "grammar": [
                {"fragment": "yo soy cansado", "correction": "yo estoy cansado", "explanation": "estados temporales con estar"}
            ],
            "spelling": [
                {"fragment": "echo de menos", "correction": "hecho de menos", "explanation": "confusión echo/hecho"},
                {"fragment": "tambien", "correction": "también", "explanation": "tilde en aguda terminada en n"}
            ]
        },
        "corrected_text": "Ayer yo estaba cansado y también triste.",
        "contextual": {
            "coherence": {"score": 7, "comment": "Ideas ordenadas"},
            "cohesion": {"score": 6, "comment": "Pocos conectores", "suggestions": ["usa además", " "]},
            "register": {"score": 8, "comment": "Informal adecuado", "detected": "informal"},
            "cultural_fit": {"score": 9, "comment": "Bien"}
        },
        "advice": "Repasa ser y estar."
    }"#;

    #[test]
    fn english_shape_normalizes() {
        let rec = sample_record();
        assert_eq!(rec.total_errors(), 3);
        assert_eq!(rec.errors[&ErrorCategory::Spelling].len(), 2);
        assert_eq!(rec.contextual.detected_register.as_deref(), Some("informal"));
        assert_eq!(rec.contextual.cohesion.suggestions, vec!["usa además"]);
        assert!((rec.contextual.average() - 7.5).abs() < f32::EPSILON);
    }

    #[test]
    fn spanish_keys_are_accepted() {
        let json = r#"{
            "errores": {
                "Gramática": [{"fragmento_erroneo": "la problema", "correccion": "el problema", "explicacion": "género"}],
                "Léxico": [{"fragmento_erroneo": "realizar una foto", "correccion": "hacer una foto", "explicacion": "colocación"}],
                "gramatica": [{"fragmento_erroneo": "si tendría", "correccion": "si tuviera", "explicacion": "condicional"}]
            },
            "texto_corregido": "El problema es que si tuviera tiempo haría una foto.",
            "analisis_contextual": {
                "coherencia": {"puntuacion": 6.6, "comentario": "aceptable"},
                "cohesion": {"puntuacion": 5, "comentario": "mejorable"},
                "registro_linguistico": {"puntuacion": 7, "comentario": "neutro", "tipo_detectado": "neutro"},
                "adecuacion_cultural": {"puntuacion": 8, "comentario": "correcta"}
            },
            "consejo_final": "Sigue practicando."
        }"#;
        let raw: RawCorrection = serde_json::from_str(json).unwrap();
        let rec = raw.into_record().unwrap();
        assert_eq!(rec.errors[&ErrorCategory::Grammar].len(), 2);
        assert_eq!(rec.errors[&ErrorCategory::Vocabulary].len(), 1);
        assert_eq!(rec.contextual.coherence.score, 7);
        assert_eq!(rec.contextual.detected_register.as_deref(), Some("neutro"));
        assert_eq!(rec.advice, "Sigue practicando.");
    }

    #[test]
    fn flat_error_list_is_grouped() {
        let json = r#"{
            "errors": [
                {"category": "punctuation", "fragment": "Hola como estas", "correction": "Hola, ¿cómo estás?"},
                {"fragment": "algo raro", "correction": "algo distinto"}
            ],
            "corrected_text": "Hola, ¿cómo estás?",
            "contextual": {
                "coherence": {"score": 5}, "cohesion": {"score": 5},
                "register": {"score": 5}, "cultural_fit": {"score": 5}
            }
        }"#;
        let rec = serde_json::from_str::<RawCorrection>(json)
            .unwrap()
            .into_record()
            .unwrap();
        assert_eq!(rec.errors[&ErrorCategory::Punctuation].len(), 1);
        assert_eq!(rec.errors[&ErrorCategory::Other].len(), 1);
        assert!(rec.advice.is_empty());
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let json = r#"{
            "corrected_text": "Texto.",
            "contextual": {
                "coherence": {"score": 11}, "cohesion": {"score": 5},
                "register": {"score": 5}, "cultural_fit": {"score": 5}
            }
        }"#;
        let err = serde_json::from_str::<RawCorrection>(json)
            .unwrap()
            .into_record()
            .unwrap_err();
        assert!(err.to_string().contains("coherence"));
    }

    #[test]
    fn empty_corrected_text_is_rejected() {
        let json = r#"{
            "corrected_text": "  ",
            "contextual": {
                "coherence": {"score": 5}, "cohesion": {"score": 5},
                "register": {"score": 5}, "cultural_fit": {"score": 5}
            }
        }"#;
        let raw: RawCorrection = serde_json::from_str(json).unwrap();
        assert!(matches!(
            raw.into_record(),
            Err(CorrigeError::InvalidCorrection(_))
        ));
    }

    #[test]
    fn error_counts_include_zero_categories() {
        let rec = sample_record();
        let counts = rec.error_counts();
        assert_eq!(counts.len(), ErrorCategory::all().len());
        assert_eq!(counts[&ErrorCategory::Grammar], 1);
        assert_eq!(counts[&ErrorCategory::Punctuation], 0);
    }

    #[test]
    fn error_rate_per_hundred_words() {
        let rec = sample_record();
        assert!((rec.error_rate(150) - 2.0).abs() < 1e-6);
        assert_eq!(rec.error_rate(0), 0.0);
    }

    #[test]
    fn word_count_ignores_bare_punctuation() {
        assert_eq!(word_count("Hola, ¿qué tal? - bien ..."), 4);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("Tengo 3 años"), 3);
    }
}
