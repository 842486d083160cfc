//! Configuration types for trade-gate
//!
//! Every threshold used by the admission path is supplied here; nothing in the
//! core hard-codes a limit. Percent fields use percent units (`2.0` = 2%).

use crate::proposal::Confidence;
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Account configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Starting equity in account currency
    #[serde(default = "default_initial_equity")]
    pub initial_equity: Decimal,
}

fn default_initial_equity() -> Decimal {
    Decimal::new(10_000, 0)
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            initial_equity: default_initial_equity(),
        }
    }
}

/// Proposal sanity thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Minimum stop distance as percent of entry
    #[serde(default = "default_min_stop_pct")]
    pub min_stop_pct: Decimal,

    /// Maximum stop distance as percent of entry (inclusive)
    #[serde(default = "default_max_stop_pct")]
    pub max_stop_pct: Decimal,

    /// Minimum reward-to-risk ratio
    #[serde(default = "default_min_rr")]
    pub min_rr: Decimal,
}

fn default_min_stop_pct() -> Decimal {
    Decimal::new(1, 1) // 0.1%
}
fn default_max_stop_pct() -> Decimal {
    Decimal::new(10, 0) // 10%
}
fn default_min_rr() -> Decimal {
    Decimal::ONE
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_stop_pct: default_min_stop_pct(),
            max_stop_pct: default_max_stop_pct(),
            min_rr: default_min_rr(),
        }
    }
}

/// Position sizing configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SizingConfig {
    #[serde(default)]
    pub risk_mapping: RiskMapping,
}

/// Percent of equity risked per confidence tier
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct RiskMapping {
    pub low: Decimal,
    pub mid: Decimal,
    pub high: Decimal,
}

impl RiskMapping {
    /// Risk percent for a confidence tier
    pub fn pct(&self, confidence: Confidence) -> Decimal {
        match confidence {
            Confidence::Low => self.low,
            Confidence::Mid => self.mid,
            Confidence::High => self.high,
        }
    }

    /// Largest percent in the table
    pub fn max_pct(&self) -> Decimal {
        self.low.max(self.mid).max(self.high)
    }
}

impl Default for RiskMapping {
    fn default() -> Self {
        Self {
            low: Decimal::new(5, 1),
            mid: Decimal::ONE,
            high: Decimal::TWO,
        }
    }
}

/// Ledger limits
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_max_trades_per_day")]
    pub max_trades_per_day: u32,

    /// Daily risk budget as percent of day-start equity
    #[serde(default = "default_max_daily_risk_pct")]
    pub max_daily_risk_pct: Decimal,

    /// Drawdown from peak equity that halts trading
    #[serde(default = "default_max_drawdown_pct")]
    pub max_drawdown_pct: Decimal,

    #[serde(default = "default_consecutive_loss_threshold")]
    pub consecutive_loss_threshold: u32,

    /// Cooldown length after a losing streak
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_max_trades_per_day() -> u32 {
    5
}
fn default_max_daily_risk_pct() -> Decimal {
    Decimal::new(10, 0)
}
fn default_max_drawdown_pct() -> Decimal {
    Decimal::new(20, 0)
}
fn default_consecutive_loss_threshold() -> u32 {
    3
}
fn default_cooldown_secs() -> u64 {
    4 * 60 * 60
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_trades_per_day: default_max_trades_per_day(),
            max_daily_risk_pct: default_max_daily_risk_pct(),
            max_drawdown_pct: default_max_drawdown_pct(),
            consecutive_loss_threshold: default_consecutive_loss_threshold(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

/// Execution backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Fee rate applied to fill notional by the paper engine
    #[serde(default)]
    pub fee_rate: Decimal,
    /// Adverse slippage applied to paper fills, percent of entry
    #[serde(default)]
    pub slippage_pct: Decimal,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Paper,
            fee_rate: Decimal::ZERO,
            slippage_pct: Decimal::ZERO,
        }
    }
}

/// Execution mode: paper trading or live
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Paper,
    Live,
}

/// Journal configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalConfig {
    /// Append JSON lines here when set
    pub path: Option<PathBuf>,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; exporter disabled when unset
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
