use crate::error::CorrigeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase, strip Spanish diacritics and collapse separators so that
/// "Estructura Textual", "estructura_textual" and "estructura-textual"
/// compare equal.
pub(crate) fn fold_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = false;
    for ch in s.trim().chars().flat_map(char::to_lowercase) {
        let ch = match ch {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            '_' | '-' => ' ',
            c => c,
        };
        if ch.is_whitespace() {
            if !last_space && !out.is_empty() {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out.trim_end().to_string()
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// CEFR proficiency level of the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Level {
    pub fn all() -> &'static [Level] {
        &[
            Level::A1,
            Level::A2,
            Level::B1,
            Level::B2,
            Level::C1,
            Level::C2,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
            Level::C1 => "C1",
            Level::C2 => "C2",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = CorrigeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Level::all()
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CorrigeError::InvalidLevel(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// TaskType
// ---------------------------------------------------------------------------

/// Kind of writing task the student was asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Essay,
    Email,
    Letter,
    Story,
    Opinion,
    Report,
    Description,
}

impl TaskType {
    pub fn all() -> &'static [TaskType] {
        &[
            TaskType::Essay,
            TaskType::Email,
            TaskType::Letter,
            TaskType::Story,
            TaskType::Opinion,
            TaskType::Report,
            TaskType::Description,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Essay => "essay",
            TaskType::Email => "email",
            TaskType::Letter => "letter",
            TaskType::Story => "story",
            TaskType::Opinion => "opinion",
            TaskType::Report => "report",
            TaskType::Description => "description",
        }
    }

    /// Spanish name used in prompts and exported reports.
    pub fn label(self) -> &'static str {
        match self {
            TaskType::Essay => "redacción",
            TaskType::Email => "correo electrónico",
            TaskType::Letter => "carta",
            TaskType::Story => "relato",
            TaskType::Opinion => "texto de opinión",
            TaskType::Report => "informe",
            TaskType::Description => "descripción",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskType {
    type Err = CorrigeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_key(s).as_str() {
            "essay" | "redaccion" => Ok(TaskType::Essay),
            "email" | "e mail" | "correo" | "correo electronico" => Ok(TaskType::Email),
            "letter" | "carta" => Ok(TaskType::Letter),
            "story" | "relato" | "narracion" => Ok(TaskType::Story),
            "opinion" | "texto de opinion" => Ok(TaskType::Opinion),
            "report" | "informe" => Ok(TaskType::Report),
            "description" | "descripcion" => Ok(TaskType::Description),
            _ => Err(CorrigeError::InvalidTaskType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Grammar,
    Vocabulary,
    Spelling,
    Punctuation,
    Structure,
    Other,
}

impl ErrorCategory {
    pub fn all() -> &'static [ErrorCategory] {
        &[
            ErrorCategory::Grammar,
            ErrorCategory::Vocabulary,
            ErrorCategory::Spelling,
            ErrorCategory::Punctuation,
            ErrorCategory::Structure,
            ErrorCategory::Other,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Grammar => "grammar",
            ErrorCategory::Vocabulary => "vocabulary",
            ErrorCategory::Spelling => "spelling",
            ErrorCategory::Punctuation => "punctuation",
            ErrorCategory::Structure => "structure",
            ErrorCategory::Other => "other",
        }
    }

    /// Spanish display label.
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Grammar => "Gramática",
            ErrorCategory::Vocabulary => "Léxico",
            ErrorCategory::Spelling => "Ortografía",
            ErrorCategory::Punctuation => "Puntuación",
            ErrorCategory::Structure => "Estructura textual",
            ErrorCategory::Other => "Otros",
        }
    }

    /// Map a free-form category key from model output onto a category.
    /// Unrecognized keys land in `Other` so no reported error is dropped.
    pub fn from_label(key: &str) -> ErrorCategory {
        match fold_key(key).as_str() {
            "grammar" | "gramatica" | "gramatical" => ErrorCategory::Grammar,
            "vocabulary" | "lexico" | "vocabulario" | "lexical" => ErrorCategory::Vocabulary,
            "spelling" | "ortografia" | "ortografico" | "orthography" => ErrorCategory::Spelling,
            "punctuation" | "puntuacion" => ErrorCategory::Punctuation,
            "structure" | "estructura" | "estructura textual" | "text structure" => {
                ErrorCategory::Structure
            }
            _ => ErrorCategory::Other,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parse_is_case_insensitive() {
        assert_eq!("b2".parse::<Level>().unwrap(), Level::B2);
        assert_eq!(" C1 ".parse::<Level>().unwrap(), Level::C1);
        assert!("B3".parse::<Level>().is_err());
    }

    #[test]
    fn level_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Level::A2).unwrap(), "\"A2\"");
        let parsed: Level = serde_yaml::from_str("C2").unwrap();
        assert_eq!(parsed, Level::C2);
    }

    #[test]
    fn task_type_accepts_spanish_names() {
        assert_eq!("Redacción".parse::<TaskType>().unwrap(), TaskType::Essay);
        assert_eq!(
            "correo electrónico".parse::<TaskType>().unwrap(),
            TaskType::Email
        );
        assert_eq!("INFORME".parse::<TaskType>().unwrap(), TaskType::Report);
        assert!("poema".parse::<TaskType>().is_err());
    }

    #[test]
    fn error_category_from_label_variants() {
        assert_eq!(ErrorCategory::from_label("Gramática"), ErrorCategory::Grammar);
        assert_eq!(ErrorCategory::from_label("LÉXICO"), ErrorCategory::Vocabulary);
        assert_eq!(ErrorCategory::from_label("ortografia"), ErrorCategory::Spelling);
        assert_eq!(
            ErrorCategory::from_label("Estructura_textual"),
            ErrorCategory::Structure
        );
        assert_eq!(ErrorCategory::from_label("punctuation"), ErrorCategory::Punctuation);
        assert_eq!(ErrorCategory::from_label("registro"), ErrorCategory::Other);
    }

    #[test]
    fn fold_key_collapses_separators() {
        assert_eq!(fold_key("  Estructura   Textual "), "estructura textual");
        assert_eq!(fold_key("estructura-textual"), "estructura textual");
    }
}
