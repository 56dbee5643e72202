use crate::cmd::{report, runtime};
use crate::output::print_json;
use anyhow::Context;
use corrige_core::config::Config;
use corrige_core::types::{Level, TaskType};
use corrige_server::analysis::{self, AnalysisRequest};
use corrige_server::Providers;
use std::io::Read;
use std::path::Path;

pub struct CheckArgs {
    /// Path to the text, or `-` for stdin.
    pub input: String,
    pub student: String,
    pub level: Option<Level>,
    pub task: Option<TaskType>,
    pub title: Option<String>,
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read text from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
    }
}

pub fn run(root: &Path, args: CheckArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let text = read_input(&args.input)?;
    let providers = Providers::from_config(&config)?;

    let request = AnalysisRequest {
        student: args.student,
        text,
        level: args.level,
        task_type: args.task,
        title: args.title,
    };

    let rt = runtime()?;
    let submission = rt
        .block_on(analysis::analyze(providers.chat.as_ref(), &config, request))
        .context("analysis failed")?;
    let row = analysis::persist(root, &submission)?;
    tracing::debug!(id = %row.submission_id, "tracking row appended");

    if json {
        print_json(&submission)?;
    } else {
        print!("{}", report::render(&submission));
    }
    Ok(())
}
