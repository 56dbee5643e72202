use crate::error::{CorrigeError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CORRIGE_DIR: &str = ".corrige";
pub const SUBMISSIONS_DIR: &str = ".corrige/submissions";

pub const CONFIG_FILE: &str = ".corrige/config.yaml";
pub const TRACKING_FILE: &str = ".corrige/tracking.jsonl";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn corrige_dir(root: &Path) -> PathBuf {
    root.join(CORRIGE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn tracking_path(root: &Path) -> PathBuf {
    root.join(TRACKING_FILE)
}

pub fn submissions_dir(root: &Path) -> PathBuf {
    root.join(SUBMISSIONS_DIR)
}

pub fn submission_path(root: &Path, id: &str) -> PathBuf {
    submissions_dir(root).join(format!("{id}.yaml"))
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap())
}

/// Submission ids are lowercase hyphenated uuids. Anything else is rejected
/// before it is joined onto a filesystem path.
pub fn validate_submission_id(id: &str) -> Result<()> {
    if !id_re().is_match(id) {
        return Err(CorrigeError::InvalidSubmissionId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        validate_submission_id("3f2b8c1e-7a4d-4e2f-9b1a-0c5d6e7f8a9b").unwrap();
        let fresh = uuid::Uuid::new_v4().to_string();
        validate_submission_id(&fresh).unwrap();
    }

    #[test]
    fn invalid_ids() {
        for id in [
            "",
            "../etc/passwd",
            "3F2B8C1E-7A4D-4E2F-9B1A-0C5D6E7F8A9B",
            "3f2b8c1e7a4d4e2f9b1a0c5d6e7f8a9b",
            "not-a-uuid",
        ] {
            assert!(validate_submission_id(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/clase");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/clase/.corrige/config.yaml")
        );
        assert_eq!(
            tracking_path(root),
            PathBuf::from("/tmp/clase/.corrige/tracking.jsonl")
        );
        assert_eq!(
            submission_path(root, "abc"),
            PathBuf::from("/tmp/clase/.corrige/submissions/abc.yaml")
        );
    }
}
