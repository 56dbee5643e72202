use corrige_core::config::Config;
use corrige_core::paths;
use llm_client::{ChatProvider, LlmClient, LlmError, SpeechProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const WATCH_INTERVAL: Duration = Duration::from_millis(800);

async fn modified(path: &std::path::Path) -> Option<std::time::SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

/// Model endpoints built from `.corrige/config.yaml`.
pub struct Providers {
    pub chat: Arc<dyn ChatProvider>,
    /// `None` when narration is disabled in config.
    pub speech: Option<Arc<dyn SpeechProvider>>,
}

impl Providers {
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let llm = &config.llm;
        if llm.api_key().is_none() {
            tracing::warn!(
                env = %llm.api_key_env,
                "no API key found; requests will be sent unauthenticated"
            );
        }
        let client = LlmClient::new(
            &llm.base_url,
            &llm.model,
            llm.api_key(),
            Duration::from_secs(llm.timeout_secs),
        )?
        .with_speech(&config.speech.model, &config.speech.voice);
        let client = Arc::new(client);

        let speech: Option<Arc<dyn SpeechProvider>> = if config.speech.enabled {
            Some(client.clone())
        } else {
            None
        };
        Ok(Self {
            chat: client,
            speech,
        })
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub chat: Arc<dyn ChatProvider>,
    pub speech: Option<Arc<dyn SpeechProvider>>,
    pub event_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(root: PathBuf, providers: Providers) -> Self {
        let (tx, _) = broadcast::channel(64);
        let state = Self {
            root,
            chat: providers.chat,
            speech: providers.speech,
            event_tx: tx,
        };

        // Watch the tracking sheet so rows appended by the CLI also reach
        // connected dashboards. Needs a running Tokio runtime. The task holds
        // only a weak sender and stops once every state clone is gone.
        if tokio::runtime::Handle::try_current().is_ok() {
            let tracking_file = paths::tracking_path(&state.root);
            let weak_tx = state.event_tx.downgrade();
            tokio::spawn(async move {
                let mut last_mtime = modified(&tracking_file).await;
                loop {
                    tokio::time::sleep(WATCH_INTERVAL).await;
                    let Some(tx) = weak_tx.upgrade() else {
                        tracing::debug!("tracking watcher stopped");
                        break;
                    };
                    let mtime = modified(&tracking_file).await;
                    if mtime.is_some() && mtime != last_mtime {
                        last_mtime = mtime;
                        let _ = tx.send(());
                    }
                }
            });
        }

        state
    }

    /// State built from the project's config file (or defaults when the
    /// project has not been initialized yet).
    pub fn from_config(root: PathBuf) -> anyhow::Result<Self> {
        let config = Config::load_or_default(&root)?;
        let providers = Providers::from_config(&config)?;
        Ok(Self::new(root, providers))
    }

    /// Tell connected dashboards that stored data changed.
    pub fn notify(&self) {
        let _ = self.event_tx.send(());
    }
}
