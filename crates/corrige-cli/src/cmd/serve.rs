use crate::cmd::runtime;
use std::path::Path;

pub fn run(root: &Path, port: u16, no_open: bool) -> anyhow::Result<()> {
    if !corrige_core::paths::config_path(root).exists() {
        tracing::warn!("no .corrige/config.yaml found; serving with defaults");
    }
    let root = root.to_path_buf();
    runtime()?.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual = listener.local_addr()?.port();
        println!("corrige dashboard: http://localhost:{actual}");
        corrige_server::serve_on(root, listener, !no_open).await
    })
}
