pub mod check;
pub mod config;
pub mod criteria;
pub mod export;
pub mod init;
pub mod report;
pub mod serve;
pub mod speak;
pub mod students;
pub mod submissions;

/// Commands are synchronous; the ones that talk to the model or serve HTTP
/// run their async part on a dedicated runtime.
pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// Write `data` to `out`, or to stdout when no path is given.
pub(crate) fn write_output(out: Option<&std::path::Path>, data: &[u8]) -> anyhow::Result<()> {
    use anyhow::Context;
    use std::io::Write;

    match out {
        Some(path) => {
            corrige_core::io::atomic_write(path, data)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
