//! Run command implementation

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde_json::json;

use super::Session;
use crate::config::{Config, ExecutionMode};
use crate::journal::{FanoutJournal, JsonlJournal, TracingJournal};

/// Summary output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Session file (JSON lines of proposals, ticks, bars and operator events)
    #[arg(short, long)]
    pub events: PathBuf,

    /// Journal file; overrides `journal.path`
    #[arg(long)]
    pub journal: Option<PathBuf>,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if config.execution.mode == ExecutionMode::Live {
            anyhow::bail!("live execution has no backend in this build; set execution.mode = \"paper\"");
        }

        let content = tokio::fs::read_to_string(&self.events)
            .await
            .with_context(|| format!("Failed to read session file {}", self.events.display()))?;

        let mut journal = FanoutJournal::new().with(Arc::new(TracingJournal));
        let mut file_journal = None;
        if let Some(path) = self.journal.as_ref().or(config.journal.path.as_ref()) {
            let sink = Arc::new(JsonlJournal::open(path).await?);
            journal = journal.with(sink.clone());
            file_journal = Some(sink);
        }

        tracing::info!(events = %self.events.display(), "Starting paper session");
        let mut session = Session::new(config, Arc::new(journal));
        session.replay(&content).await;

        if let Some(sink) = file_journal {
            sink.shutdown().await?;
        }

        let summary = session.summary();
        let snapshot = session.gate().snapshot().await;
        let stats = session.gate().stats().await;
        let open = session.gate().monitor().open_count().await;

        match self.format {
            OutputFormat::Json => {
                let report = json!({
                    "summary": summary,
                    "ledger": snapshot,
                    "stats": stats,
                    "open_positions": open,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Table => {
                println!("Events:           {}", summary.events);
                println!("Invalid lines:    {}", summary.invalid_lines);
                println!("Opened:           {}", summary.opened);
                println!("Skipped:          {}", summary.skipped);
                println!("Rejected:         {}", summary.rejected());
                for (code, count) in &summary.rejections {
                    println!("  {code:<22}{count}");
                }
                println!("Still open:       {open}");
                println!("Equity:           {:.2}", snapshot.current_equity);
                println!("Drawdown:         {:.2}%", snapshot.drawdown_pct);
                println!("Halted:           {}", snapshot.halted);
                if let Some(until) = snapshot.cooldown_until {
                    println!("Cooldown until:   {until}");
                }
                print!("{}", stats.format_table());
            }
        }

        Ok(())
    }
}
