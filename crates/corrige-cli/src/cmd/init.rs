use anyhow::Context;
use corrige_core::config::Config;
use corrige_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let project_name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "corrige".to_string());

    println!("Initializing corrige in: {}", root.display());

    for dir in [paths::CORRIGE_DIR, paths::SUBMISSIONS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::new(&project_name)
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    if io::write_if_missing(&paths::tracking_path(root), b"")? {
        println!("  created: {}", paths::TRACKING_FILE);
    } else {
        println!("  exists:  {}", paths::TRACKING_FILE);
    }

    let config = Config::load(root)?;
    if config.llm.api_key().is_none() {
        println!(
            "\nSet {} before running 'corrige check'.",
            config.llm.api_key_env
        );
    }
    Ok(())
}
