//! Human-readable rendering of a submission for the terminal.

use corrige_core::export::{dimension_label, length_notice};
use corrige_core::submission::Submission;
use std::fmt::Write as _;

pub fn render(sub: &Submission) -> String {
    let rec = &sub.record;
    let mut out = String::new();

    let title = sub.title.as_deref().unwrap_or("(sin título)");
    let _ = writeln!(out, "{title} · {} · {} · {}", sub.student, sub.level, sub.task_type.label());
    let _ = writeln!(
        out,
        "id {} · {} · {} palabras",
        sub.id,
        sub.created_at.format("%Y-%m-%d %H:%M UTC"),
        sub.word_count
    );

    if let Some(notice) = length_notice(sub) {
        let _ = writeln!(out, "Aviso: {notice}.");
    }

    let _ = writeln!(
        out,
        "\nErrores: {} ({:.2} por cada 100 palabras)",
        rec.total_errors(),
        rec.error_rate(sub.word_count)
    );
    for (cat, items) in &rec.errors {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n  {} ({})", cat.label(), items.len());
        for item in items {
            let _ = write!(out, "    - \"{}\" → \"{}\"", item.fragment, item.correction);
            if !item.explanation.is_empty() {
                let _ = write!(out, ": {}", item.explanation);
            }
            out.push('\n');
        }
    }

    let _ = writeln!(out, "\nTexto corregido:\n  {}", rec.corrected_text.replace('\n', "\n  "));

    let _ = writeln!(out, "\nAnálisis contextual (media {:.1}/10):", rec.contextual.average());
    for (key, dim) in rec.contextual.dimensions() {
        let _ = writeln!(out, "  {:<20} {:>2}/10  {}", dimension_label(key), dim.score, dim.comment);
        for s in &dim.suggestions {
            let _ = writeln!(out, "  {:<20}        · {s}", "");
        }
    }
    if let Some(reg) = &rec.contextual.detected_register {
        let _ = writeln!(out, "  Registro detectado: {reg}");
    }

    if !rec.advice.is_empty() {
        let _ = writeln!(out, "\nConsejo: {}", rec.advice);
    }
    out
}
