use std::path::Path;

use clap::Parser;
use trade_gate::cli::{Cli, Commands};
use trade_gate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)?
    } else {
        eprintln!("Warning: {} not found, using default configuration", cli.config);
        Config::default()
    };

    // Initialize telemetry
    trade_gate::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            args.execute(&config).await?;
        }
        Commands::Check(args) => {
            args.execute(&config)?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Account: equity={}", config.account.initial_equity);
            println!(
                "  Validation: stop {}%..{}%, min R/R {}",
                config.validation.min_stop_pct,
                config.validation.max_stop_pct,
                config.validation.min_rr
            );
            let mapping = &config.sizing.risk_mapping;
            println!(
                "  Sizing: LOW={}% MID={}% HIGH={}%",
                mapping.low, mapping.mid, mapping.high
            );
            println!(
                "  Risk: max_trades={}/day, max_daily_risk={}%, max_drawdown={}%, cooldown after {} losses for {}s",
                config.risk.max_trades_per_day,
                config.risk.max_daily_risk_pct,
                config.risk.max_drawdown_pct,
                config.risk.consecutive_loss_threshold,
                config.risk.cooldown_secs
            );
            println!(
                "  Execution: {:?}, fee_rate={}, slippage={}%",
                config.execution.mode, config.execution.fee_rate, config.execution.slippage_pct
            );
            match &config.journal.path {
                Some(path) => println!("  Journal: {}", path.display()),
                None => println!("  Journal: tracing only"),
            }
            println!(
                "  Telemetry: level={}, format={:?}, metrics_port={:?}",
                config.telemetry.log_level, config.telemetry.log_format, config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
