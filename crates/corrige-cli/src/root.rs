use corrige_core::paths::CORRIGE_DIR;
use std::path::{Path, PathBuf};

/// Resolve the workspace root.
///
/// Priority:
/// 1. `--root` flag / `CORRIGE_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `start` containing `.corrige/`
/// 3. `start` itself
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_root_from(&cwd)
}

fn find_root_from(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(CORRIGE_DIR).is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_nearest_workspace_above() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".corrige")).unwrap();
        let deep = dir.path().join("clase/tareas");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(find_root_from(&deep), dir.path());
    }

    #[test]
    fn falls_back_to_start() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sin-proyecto");
        std::fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_root_from(&sub), sub);
    }
}
