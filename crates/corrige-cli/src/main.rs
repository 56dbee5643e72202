mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::check::CheckArgs;
use cmd::config::ConfigSubcommand;
use corrige_core::export::ExportFormat;
use corrige_core::types::{Level, TaskType};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "corrige",
    about = "Spanish writing feedback: corrections, contextual analysis and progress tracking",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: nearest directory with .corrige/)
    #[arg(long, global = true, env = "CORRIGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .corrige/ with a default config (safe to re-run)
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Analyse a text, store the result and print the corrections
    Check {
        /// File with the text, or - for stdin
        input: String,
        /// Student who wrote the text
        #[arg(long, short = 's')]
        student: String,
        /// CEFR level (A1..C2; default from config)
        #[arg(long, short = 'l')]
        level: Option<Level>,
        /// Task type, English or Spanish (essay, carta, correo, ...)
        #[arg(long, short = 't')]
        task: Option<TaskType>,
        /// Optional title
        #[arg(long)]
        title: Option<String>,
    },

    /// Show a stored submission
    Show { id: String },

    /// List stored submissions, newest first
    List {
        /// Only this student's submissions
        #[arg(long, short = 's')]
        student: Option<String>,
    },

    /// List students on the tracking sheet
    Students,

    /// Tracking sheet rows for a student, oldest first
    History { student: String },

    /// Progress summary for a student
    Progress { student: String },

    /// Export one submission as CSV, HTML or Markdown
    Export {
        id: String,
        /// csv, html or markdown
        #[arg(long, short = 'f', default_value = "html")]
        format: ExportFormat,
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Export a student's history as CSV
    ExportHistory {
        student: String,
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Show level guidance and task criteria
    Criteria {
        #[arg(long, short = 'l')]
        level: Option<Level>,
        #[arg(long, short = 't')]
        task: Option<TaskType>,
    },

    /// Inspect or validate .corrige/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Narrate a submission's corrected text to an MP3 file
    Speak {
        id: String,
        #[arg(long, short = 'o')]
        out: PathBuf,
    },

    /// Launch the web dashboard
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3141")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

/// `RUST_LOG` directives when set, otherwise `default_level` for everything.
fn log_filter(default_level: tracing::Level, rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(default_level, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let json = cli.json;

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Check {
            input,
            student,
            level,
            task,
            title,
        } => cmd::check::run(
            &root,
            CheckArgs {
                input,
                student,
                level,
                task,
                title,
            },
            json,
        ),
        Commands::Show { id } => cmd::submissions::show(&root, &id, json),
        Commands::List { student } => cmd::submissions::list(&root, student.as_deref(), json),
        Commands::Students => cmd::students::list(&root, json),
        Commands::History { student } => cmd::students::history(&root, &student, json),
        Commands::Progress { student } => cmd::students::progress(&root, &student, json),
        Commands::Export { id, format, out } => {
            cmd::export::submission(&root, &id, format, out.as_deref())
        }
        Commands::ExportHistory { student, out } => {
            cmd::export::history(&root, &student, out.as_deref())
        }
        Commands::Criteria { level, task } => cmd::criteria::run(level, task, json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, json),
        Commands::Speak { id, out } => cmd::speak::run(&root, &id, &out),
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn rust_log_overrides_default_level() {
        let filter = log_filter(tracing::Level::WARN, Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
        let debug_on =
            tracing::subscriber::with_default(subscriber, || tracing::enabled!(tracing::Level::DEBUG));
        assert!(debug_on);

        let filter = log_filter(tracing::Level::INFO, Some("corrige_server=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn default_level_applies_without_rust_log() {
        let filter = log_filter(tracing::Level::WARN, None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        let filter = log_filter(tracing::Level::INFO, Some(""));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
