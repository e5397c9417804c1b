//! Majority-withdrawal rule
//!
//! A burn or remove-liquidity log that takes out at least the
//! configured percentage of the pool's pre-withdrawal balance of either
//! token. Balances are read at `block - reference_block_offset` so the
//! denominator is the state immediately before the triggering block.
//! Invalid pool metadata means insufficient information, not evidence,
//! and skips the event.

use crate::events::TxEvent;
use crate::fetcher::PoolFetcher;
use crate::models::{AppResult, Finding, FindingType, Label, Severity};
use crate::rules::{withdrawn_percentage, Rule};
use crate::utils::{headline_symbol, lower_hex, lower_hex_hash};
use alloy_primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;

pub struct MajorityWithdrawalRule {
    fetcher: Arc<PoolFetcher>,
    threshold_pct: u64,
    reference_block_offset: u64,
}

impl MajorityWithdrawalRule {
    pub fn new(fetcher: Arc<PoolFetcher>, threshold_pct: u64, reference_block_offset: u64) -> Self {
        Self {
            fetcher,
            threshold_pct,
            reference_block_offset,
        }
    }
}

#[async_trait]
impl Rule for MajorityWithdrawalRule {
    fn name(&self) -> &'static str {
        "majority-withdrawal"
    }

    fn alert_id(&self) -> &'static str {
        "RUG-4"
    }

    async fn evaluate(&self, tx: &TxEvent) -> AppResult<Vec<Finding>> {
        let removals = tx.removal_events(None);
        if removals.is_empty() {
            return Ok(Vec::new());
        }

        let threshold = U256::from(self.threshold_pct);
        let reference_block = tx.block_number.saturating_sub(self.reference_block_offset);
        let mut findings = Vec::new();

        for removal in &removals {
            let pool = removal.emitter;
            let data = self.fetcher.get_pool_data(tx.block_number, pool).await;
            if !data.valid {
                continue;
            }

            let (balance0, balance1) = self
                .fetcher
                .get_pool_balance(reference_block, pool, data.token0, data.token1)
                .await;
            let (amount0, amount1) = removal.event.amounts();

            let pct0 = withdrawn_percentage(amount0, balance0);
            let pct1 = withdrawn_percentage(amount1, balance1);
            if pct0 < threshold && pct1 < threshold {
                continue;
            }

            let symbol0 = self
                .fetcher
                .get_token_symbol(reference_block, data.token0)
                .await;
            let symbol1 = self
                .fetcher
                .get_token_symbol(reference_block, data.token1)
                .await;
            let headline = headline_symbol(&symbol0, &symbol1);

            findings.push(
                Finding::new(
                    "Majority Of Pool Liquidity Withdrawn",
                    format!(
                        "{} of the {} pool's liquidity was withdrawn in a single event",
                        format_pct(pct0.max(pct1)),
                        headline
                    ),
                    self.alert_id(),
                    Severity::High,
                    FindingType::Exploit,
                )
                .with_label(Label::address(lower_hex(&tx.from), "attacker", 0.9))
                .with_label(Label::address(
                    lower_hex(&pool),
                    "soft-rug-pull-address",
                    0.9,
                ))
                .with_metadata("pool", lower_hex(&pool))
                .with_metadata("tokenSymbol", format!("{symbol0} - {symbol1}"))
                .with_metadata("event", removal.event.name())
                .with_metadata("amount0", amount0.to_string())
                .with_metadata("amount1", amount1.to_string())
                .with_metadata("balance0", balance0.to_string())
                .with_metadata("balance1", balance1.to_string())
                .with_metadata("percentage0", pct0.to_string())
                .with_metadata("percentage1", pct1.to_string())
                .with_metadata("transaction", lower_hex_hash(&tx.hash)),
            );
        }

        Ok(findings)
    }
}

fn format_pct(pct: U256) -> String {
    format!("{pct}%")
}
