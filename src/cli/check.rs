//! Check command implementation
//!
//! Validates and sizes one proposal without touching any ledger.

use clap::Args;
use rust_decimal::Decimal;

use crate::config::Config;
use crate::proposal::{validate, Confidence, Decision, ProposalRecord};
use crate::risk::size;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Instrument symbol
    #[arg(long, default_value = "BTCUSDT")]
    pub symbol: String,

    /// buy/sell or long/short
    #[arg(long)]
    pub side: String,

    /// Entry price; omit for a market entry at --price
    #[arg(long)]
    pub entry: Option<f64>,

    #[arg(long)]
    pub stop: f64,

    #[arg(long)]
    pub target: f64,

    /// Confidence tier: low, mid or high
    #[arg(long, default_value = "mid")]
    pub confidence: Confidence,

    /// Current market price
    #[arg(long)]
    pub price: Decimal,

    /// Account equity; defaults to account.initial_equity
    #[arg(long)]
    pub equity: Option<Decimal>,
}

impl CheckArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let record = ProposalRecord {
            symbol: self.symbol.clone(),
            decision: Decision::Trade,
            confidence: self.confidence,
            reason_code: None,
            entry_price: self.entry,
            stop_loss: Some(self.stop),
            take_profit: Some(self.target),
            side: Some(self.side.clone()),
        };
        let equity = self.equity.unwrap_or(config.account.initial_equity);

        let proposal = record
            .to_proposal()
            .map_err(|e| anyhow::anyhow!("REJECTED [{}]: {}", e.code(), e))?
            .ok_or_else(|| anyhow::anyhow!("proposal is not a trade"))?;
        let validated = validate(&proposal, self.price, &config.validation)
            .map_err(|e| anyhow::anyhow!("REJECTED [{}]: {}", e.code(), e))?;
        let sized = size(
            proposal.confidence,
            equity,
            validated.entry,
            proposal.stop,
            &config.sizing,
        )
        .map_err(|e| anyhow::anyhow!("REJECTED [{}]: {}", e.code(), e))?;

        println!("ACCEPTED");
        println!("  Symbol:         {}", proposal.symbol);
        println!("  Side:           {:?}", proposal.side);
        println!("  Entry:          {}", validated.entry);
        println!("  Stop:           {}", proposal.stop);
        println!("  Target:         {}", proposal.target);
        println!("  Stop distance:  {:.3}%", validated.stop_distance_pct);
        println!("  Reward/risk:    {:.2}", validated.reward_risk);
        println!("  Risk:           {:.2} ({}% of {})", sized.risk_amount, sized.risk_pct, equity);
        println!("  Quantity:       {}", sized.quantity.normalize());

        Ok(())
    }
}
