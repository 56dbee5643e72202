use crate::cmd::write_output;
use corrige_core::export::{self, ExportFormat};
use corrige_core::submission::Submission;
use corrige_core::tracking;
use corrige_core::CorrigeError;
use std::path::Path;

pub fn submission(
    root: &Path,
    id: &str,
    format: ExportFormat,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let sub = Submission::load(root, id)?;
    write_output(out, export::render(&sub, format).as_bytes())
}

pub fn history(root: &Path, student: &str, out: Option<&Path>) -> anyhow::Result<()> {
    let rows = tracking::history(root, student)?;
    if rows.is_empty() {
        return Err(CorrigeError::StudentNotFound(student.to_string()).into());
    }
    write_output(out, export::tracking_csv(&rows).as_bytes())
}
