//! Export renderers: CSV (spreadsheet view of the tracking sheet), Markdown
//! and standalone HTML reports for a single submission.

use crate::correction::DimensionScore;
use crate::criteria::{length_check, level_guidance, LengthVerdict};
use crate::error::CorrigeError;
use crate::submission::Submission;
use crate::tracking::TrackingRow;
use crate::types::ErrorCategory;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Html,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = CorrigeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "html" | "htm" => Ok(ExportFormat::Html),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(CorrigeError::InvalidExportFormat(s.to_string())),
        }
    }
}

pub fn render(sub: &Submission, format: ExportFormat) -> String {
    match format {
        ExportFormat::Csv => tracking_csv(&[sub.to_tracking_row()]),
        ExportFormat::Html => submission_html(sub),
        ExportFormat::Markdown => submission_markdown(sub),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Quote a field when it contains a delimiter, quote or line break
/// (RFC 4180). Embedded quotes are doubled.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn tracking_csv(rows: &[TrackingRow]) -> String {
    let mut header: Vec<String> = [
        "submission_id",
        "student",
        "submitted_at",
        "level",
        "task_type",
        "word_count",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(ErrorCategory::all().iter().map(|c| format!("errors_{c}")));
    header.extend(
        [
            "total_errors",
            "error_rate",
            "coherence",
            "cohesion",
            "register",
            "cultural_fit",
            "contextual_average",
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    let mut out = header.join(",");
    out.push_str("\r\n");
    for r in rows {
        let mut fields = vec![
            csv_field(&r.submission_id),
            csv_field(&r.student),
            r.submitted_at.to_rfc3339(),
            r.level.to_string(),
            r.task_type.to_string(),
            r.word_count.to_string(),
        ];
        fields.extend(
            ErrorCategory::all()
                .iter()
                .map(|c| r.errors_in(*c).to_string()),
        );
        fields.extend([
            r.total_errors.to_string(),
            format!("{:.2}", r.error_rate),
            r.coherence.to_string(),
            r.cohesion.to_string(),
            r.register.to_string(),
            r.cultural_fit.to_string(),
            format!("{:.2}", r.contextual_average),
        ]);
        out.push_str(&fields.join(","));
        out.push_str("\r\n");
    }
    out
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

pub fn submission_markdown(sub: &Submission) -> String {
    let rec = &sub.record;
    let mut out = String::new();
    let title = sub.title.as_deref().unwrap_or("Corrección");
    let _ = writeln!(out, "# {title}\n");
    let _ = writeln!(
        out,
        "**Estudiante:** {} · **Nivel:** {} · **Tipo:** {} · **Fecha:** {} · **Palabras:** {}\n",
        sub.student,
        sub.level,
        sub.task_type.label(),
        sub.created_at.format("%Y-%m-%d %H:%M UTC"),
        sub.word_count
    );
    if let Some(notice) = length_notice(sub) {
        let _ = writeln!(out, "> Aviso: {notice}\n");
    }

    let _ = writeln!(out, "## Texto original\n\n{}\n", sub.original_text.trim());
    let _ = writeln!(out, "## Texto corregido\n\n{}\n", rec.corrected_text);

    let _ = writeln!(
        out,
        "## Errores ({}, {:.2} por cada 100 palabras)\n",
        rec.total_errors(),
        rec.error_rate(sub.word_count)
    );
    if rec.errors.is_empty() {
        out.push_str("Sin errores detectados.\n\n");
    }
    for (cat, items) in &rec.errors {
        let _ = writeln!(out, "### {}\n", cat.label());
        for item in items {
            let _ = write!(out, "- ~~{}~~ → **{}**", item.fragment, item.correction);
            if !item.explanation.is_empty() {
                let _ = write!(out, ": {}", item.explanation);
            }
            out.push('\n');
        }
        out.push('\n');
    }

    let ctx = &rec.contextual;
    out.push_str("## Análisis contextual\n\n");
    out.push_str("| Dimensión | Puntuación | Comentario | Sugerencias |\n|---|---|---|---|\n");
    for (name, d) in ctx.dimensions() {
        let _ = writeln!(
            out,
            "| {} | {}/10 | {} | {} |",
            dimension_label(name),
            d.score,
            d.comment.replace('|', "\\|"),
            suggestions(d).replace('|', "\\|")
        );
    }
    if let Some(reg) = &ctx.detected_register {
        let _ = writeln!(out, "\nRegistro detectado: {reg}");
    }
    let _ = writeln!(out, "\nMedia contextual: {:.1}/10\n", ctx.average());

    if !rec.advice.is_empty() {
        let _ = writeln!(out, "## Consejo final\n\n{}", rec.advice);
    }
    out
}

/// Suggestions joined for a single table cell.
fn suggestions(d: &DimensionScore) -> String {
    d.suggestions.join("; ")
}

/// Warning when the text falls outside the recommended length for its level.
pub fn length_notice(sub: &Submission) -> Option<String> {
    let g = level_guidance(sub.level);
    let kind = match length_check(sub.level, sub.word_count) {
        LengthVerdict::Within => return None,
        LengthVerdict::TooShort => "corto",
        LengthVerdict::TooLong => "largo",
    };
    Some(format!(
        "texto {kind} para {} ({}-{} palabras)",
        sub.level, g.min_words, g.max_words
    ))
}

pub fn dimension_label(name: &str) -> &'static str {
    match name {
        "coherence" => "Coherencia",
        "cohesion" => "Cohesión",
        "register" => "Registro",
        _ => "Adecuación cultural",
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn submission_html(sub: &Submission) -> String {
    let rec = &sub.record;
    let title = escape_html(sub.title.as_deref().unwrap_or("Corrección"));
    let mut body = String::new();

    let _ = writeln!(body, "<h1>{title}</h1>");
    let _ = writeln!(
        body,
        "<p class=\"meta\">{} · {} · {} · {} · {} palabras</p>",
        escape_html(&sub.student),
        sub.level,
        escape_html(sub.task_type.label()),
        sub.created_at.format("%Y-%m-%d %H:%M UTC"),
        sub.word_count
    );
    if let Some(notice) = length_notice(sub) {
        let _ = writeln!(body, "<p class=\"notice\">Aviso: {notice}</p>");
    }
    let _ = writeln!(body, "<h2>Texto original</h2>\n{}", paragraphs(&sub.original_text));
    let _ = writeln!(body, "<h2>Texto corregido</h2>\n{}", paragraphs(&rec.corrected_text));

    let _ = writeln!(
        body,
        "<h2>Errores ({}, {:.2} por cada 100 palabras)</h2>",
        rec.total_errors(),
        rec.error_rate(sub.word_count)
    );
    if rec.errors.is_empty() {
        body.push_str("<p>Sin errores detectados.</p>\n");
    }
    for (cat, items) in &rec.errors {
        let _ = writeln!(body, "<h3>{}</h3>\n<ul>", escape_html(cat.label()));
        for item in items {
            let _ = writeln!(
                body,
                "<li><del>{}</del> → <strong>{}</strong> <span class=\"why\">{}</span></li>",
                escape_html(&item.fragment),
                escape_html(&item.correction),
                escape_html(&item.explanation)
            );
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<h2>Análisis contextual</h2>\n<table>\n");
    body.push_str(
        "<tr><th>Dimensión</th><th>Puntuación</th><th>Comentario</th><th>Sugerencias</th></tr>\n",
    );
    for (name, d) in rec.contextual.dimensions() {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}/10</td><td>{}</td><td>{}</td></tr>",
            dimension_label(name),
            d.score,
            escape_html(&d.comment),
            escape_html(&suggestions(d))
        );
    }
    body.push_str("</table>\n");
    if let Some(reg) = &rec.contextual.detected_register {
        let _ = writeln!(body, "<p>Registro detectado: {}</p>", escape_html(reg));
    }
    let _ = writeln!(
        body,
        "<p>Media contextual: {:.1}/10</p>",
        rec.contextual.average()
    );
    if !rec.advice.is_empty() {
        let _ = writeln!(body, "<h2>Consejo final</h2>\n{}", paragraphs(&rec.advice));
    }

    format!(
        "<!doctype html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n\
         body{{font-family:sans-serif;max-width:48rem;margin:2rem auto;line-height:1.5}}\n\
         del{{color:#b00}} strong{{color:#070}} .why{{color:#555}} .meta{{color:#666}} .notice{{color:#a60}}\n\
         table{{border-collapse:collapse}} td,th{{border:1px solid #ccc;padding:.3rem .6rem}}\n\
         </style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::tests::sample_record;
    use crate::tracking::tests::row;
    use crate::types::{Level, TaskType};

    fn sample() -> Submission {
        Submission::new(
            "Ana <admin>",
            Some("Carta a \"Juan\"".to_string()),
            Level::B1,
            TaskType::Letter,
            "Querido Juan:\n\nYo soy cansado.",
            sample_record(),
            "m",
        )
    }

    #[test]
    fn format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let csv = tracking_csv(&[row("Ana", 1, 3, 100, 7), row("Pérez, Luis", 2, 1, 50, 8)]);
        let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("submission_id,student,submitted_at"));
        assert!(lines[0].contains("errors_grammar,errors_vocabulary"));
        assert!(lines[2].contains("\"Pérez, Luis\""));
        assert!(lines[1].contains(",3.00,"));
    }

    #[test]
    fn csv_field_doubles_quotes() {
        assert_eq!(csv_field("di \"hola\""), "\"di \"\"hola\"\"\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn markdown_contains_sections() {
        let md = submission_markdown(&sample());
        assert!(md.starts_with("# Carta a \"Juan\""));
        assert!(md.contains("## Texto corregido"));
        assert!(md.contains("### Ortografía"));
        assert!(md.contains("~~tambien~~ → **también**"));
        assert!(md.contains("| Coherencia | 7/10 |"));
        assert!(md.contains("Media contextual: 7.5/10"));
    }

    #[test]
    fn html_escapes_user_text() {
        let html = submission_html(&sample());
        assert!(html.contains("Ana &lt;admin&gt;"));
        assert!(html.contains("<title>Carta a &quot;Juan&quot;</title>"));
        assert!(!html.contains("<admin>"));
        assert!(html.contains("<p>Querido Juan:</p>"));
    }

    #[test]
    fn reports_carry_the_same_contextual_detail() {
        let sub = sample();
        let md = submission_markdown(&sub);
        let html = submission_html(&sub);
        for doc in [&md, &html] {
            assert!(doc.contains("Registro detectado: informal"), "{doc}");
            assert!(doc.contains("usa además"), "{doc}");
            assert!(doc.contains("Media contextual: 7.5/10"), "{doc}");
            assert!(doc.contains("Aviso: texto corto para B1 (100-150 palabras)"), "{doc}");
            assert!(doc.contains("por cada 100 palabras"), "{doc}");
        }
    }

    #[test]
    fn length_notice_only_outside_guidance() {
        let mut sub = sample();
        sub.word_count = 120;
        assert_eq!(length_notice(&sub), None);
        sub.word_count = 400;
        assert_eq!(
            length_notice(&sub).as_deref(),
            Some("texto largo para B1 (100-150 palabras)")
        );
    }

    #[test]
    fn render_csv_is_single_row() {
        let csv = render(&sample(), ExportFormat::Csv);
        assert_eq!(csv.matches("\r\n").count(), 2);
    }
}
