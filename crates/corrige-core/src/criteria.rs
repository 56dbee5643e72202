//! Static lookup tables: recommended length and writing time per CEFR level,
//! and the evaluation criteria applied to each task type.

use crate::types::{Level, TaskType};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Level guidance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelGuidance {
    pub level: Level,
    pub min_words: usize,
    pub max_words: usize,
    pub duration_minutes: u32,
    pub focus: &'static str,
}

pub fn level_guidance(level: Level) -> LevelGuidance {
    let (min_words, max_words, duration_minutes, focus) = match level {
        Level::A1 => (
            40,
            60,
            20,
            "frases sencillas, presente de indicativo, vocabulario cotidiano",
        ),
        Level::A2 => (
            60,
            80,
            25,
            "pasados básicos, conectores simples (y, pero, porque)",
        ),
        Level::B1 => (
            100,
            150,
            40,
            "contraste de pasados, subjuntivo en expresiones frecuentes, párrafos organizados",
        ),
        Level::B2 => (
            150,
            180,
            50,
            "subjuntivo, argumentación, conectores discursivos variados",
        ),
        Level::C1 => (
            180,
            220,
            60,
            "precisión léxica, registro adecuado, cohesión compleja",
        ),
        Level::C2 => (
            220,
            280,
            70,
            "matices estilísticos, idiomaticidad, adecuación cultural",
        ),
    };
    LevelGuidance {
        level,
        min_words,
        max_words,
        duration_minutes,
        focus,
    }
}

// ---------------------------------------------------------------------------
// Task criteria
// ---------------------------------------------------------------------------

pub fn task_criteria(task: TaskType) -> &'static [&'static str] {
    match task {
        TaskType::Essay => &[
            "introducción, desarrollo y conclusión reconocibles",
            "ideas relacionadas con el tema propuesto",
            "párrafos conectados con marcadores discursivos",
        ],
        TaskType::Email => &[
            "saludo y despedida adecuados al destinatario",
            "propósito del mensaje claro desde el inicio",
            "registro coherente (formal o informal) en todo el texto",
        ],
        TaskType::Letter => &[
            "fórmulas de encabezamiento y cierre",
            "fecha y lugar cuando corresponde",
            "tratamiento (tú/usted) mantenido de principio a fin",
        ],
        TaskType::Story => &[
            "secuencia temporal clara",
            "uso correcto de pretérito indefinido e imperfecto",
            "descripción de personajes y ambiente",
        ],
        TaskType::Opinion => &[
            "tesis explícita",
            "argumentos apoyados con ejemplos",
            "expresiones de opinión y de acuerdo o desacuerdo",
        ],
        TaskType::Report => &[
            "estructura con apartados",
            "lenguaje objetivo e impersonal",
            "datos y conclusiones diferenciados",
        ],
        TaskType::Description => &[
            "orden espacial o lógico en la descripción",
            "adjetivos precisos y variados",
            "uso adecuado de ser, estar y haber",
        ],
    }
}

// ---------------------------------------------------------------------------
// Combined table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TaskCriteria {
    pub task_type: TaskType,
    pub label: &'static str,
    pub criteria: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct CriteriaTable {
    pub levels: Vec<LevelGuidance>,
    pub tasks: Vec<TaskCriteria>,
}

pub fn criteria_table() -> CriteriaTable {
    CriteriaTable {
        levels: Level::all().iter().map(|l| level_guidance(*l)).collect(),
        tasks: TaskType::all()
            .iter()
            .map(|t| TaskCriteria {
                task_type: *t,
                label: t.label(),
                criteria: task_criteria(*t),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Length check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthVerdict {
    TooShort,
    Within,
    TooLong,
}

pub fn length_check(level: Level, word_count: usize) -> LengthVerdict {
    let g = level_guidance(level);
    if word_count < g.min_words {
        LengthVerdict::TooShort
    } else if word_count > g.max_words {
        LengthVerdict::TooLong
    } else {
        LengthVerdict::Within
    }
}
