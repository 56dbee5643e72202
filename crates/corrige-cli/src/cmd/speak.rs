use crate::cmd::runtime;
use anyhow::Context;
use corrige_core::config::Config;
use corrige_core::submission::Submission;
use corrige_server::Providers;
use std::path::Path;

/// Narrate the corrected text of a submission to an MP3 file.
pub fn run(root: &Path, id: &str, out: &Path) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let Some(speech) = Providers::from_config(&config)?.speech else {
        anyhow::bail!("speech narration is disabled (speech.enabled in config.yaml)");
    };
    let sub = Submission::load(root, id)?;

    let audio = runtime()?
        .block_on(speech.synthesize(&sub.record.corrected_text))
        .context("speech synthesis failed")?;
    corrige_core::io::atomic_write(out, &audio)
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!("wrote {} ({} bytes)", out.display(), audio.len());
    Ok(())
}
