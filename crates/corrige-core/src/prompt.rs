use crate::criteria::LevelGuidance;
use crate::types::{ErrorCategory, Level, TaskType};

const SCHEMA: &str = r#"{
  "errors": {
    "<category>": [
      { "fragment": "<text exactly as the student wrote it>",
        "correction": "<corrected fragment>",
        "explanation": "<short explanation in Spanish>" }
    ]
  },
  "corrected_text": "<the full corrected text>",
  "contextual": {
    "coherence":    { "score": 0-10, "comment": "...", "suggestions": ["..."] },
    "cohesion":     { "score": 0-10, "comment": "...", "suggestions": ["..."] },
    "register":     { "score": 0-10, "comment": "...", "suggestions": ["..."], "detected": "formal|neutral|informal" },
    "cultural_fit": { "score": 0-10, "comment": "...", "suggestions": ["..."] }
  },
  "advice": "<one paragraph of personalised advice in Spanish>"
}"#;

/// System prompt: tutor persona plus the exact response schema.
pub fn system_prompt() -> String {
    let categories: Vec<&str> = ErrorCategory::all().iter().map(|c| c.as_str()).collect();
    format!(
        "Eres un profesor experto de español como lengua extranjera (ELE). \
         Corriges textos de estudiantes con precisión y tono alentador.\n\n\
         Responde ÚNICAMENTE con un objeto JSON válido, sin texto adicional ni \
         bloques de código, con esta estructura exacta:\n{SCHEMA}\n\n\
         Las categorías de error permitidas son: {}. Omite las categorías sin errores. \
         Cada fragmento debe aparecer literalmente en el texto original.",
        categories.join(", ")
    )
}

/// User prompt for one submission.
pub fn user_prompt(
    text: &str,
    level: Level,
    task: TaskType,
    guidance: &LevelGuidance,
    criteria: &[&str],
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Nivel del estudiante: {} (extensión recomendada {}-{} palabras, {} minutos).\n",
        level, guidance.min_words, guidance.max_words, guidance.duration_minutes
    ));
    out.push_str(&format!("Aspectos a vigilar en este nivel: {}.\n", guidance.focus));
    out.push_str(&format!("Tipo de texto: {}.\n", task.label()));
    if !criteria.is_empty() {
        out.push_str("Criterios de evaluación:\n");
        for c in criteria {
            out.push_str(&format!("- {c}\n"));
        }
    }
    out.push_str("\nTexto del estudiante:\n\"\"\"\n");
    out.push_str(text.trim());
    out.push_str("\n\"\"\"\n");
    out
}

/// Instruction appended to the user prompt after an unusable response.
pub fn retry_suffix(error: &str) -> String {
    format!(
        "\n\nTu respuesta anterior no era válida ({error}). \
         Responde SOLO con el objeto JSON descrito, sin comentarios ni texto adicional."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{level_guidance, task_criteria};

    #[test]
    fn system_prompt_lists_schema_and_categories() {
        let p = system_prompt();
        assert!(p.contains("\"corrected_text\""));
        assert!(p.contains("cultural_fit"));
        assert!(p.contains("grammar, vocabulary, spelling, punctuation, structure, other"));
    }

    #[test]
    fn user_prompt_embeds_guidance_and_text() {
        let g = level_guidance(Level::B2);
        let p = user_prompt(
            "  Querido Juan: te escribo...  ",
            Level::B2,
            TaskType::Letter,
            &g,
            task_criteria(TaskType::Letter),
        );
        assert!(p.contains("Nivel del estudiante: B2"));
        assert!(p.contains("150-180 palabras"));
        assert!(p.contains("Tipo de texto: carta"));
        assert!(p.contains("- fórmulas de encabezamiento y cierre"));
        assert!(p.contains("\"\"\"\nQuerido Juan: te escribo...\n\"\"\""));
    }

    #[test]
    fn retry_suffix_names_the_error() {
        let s = retry_suffix("missing field `corrected_text`");
        assert!(s.contains("missing field `corrected_text`"));
    }
}
