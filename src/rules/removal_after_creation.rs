//! Removal-after-creation rule
//!
//! The canonical soft rug pull: a pool is created and drained inside
//! one atomic transaction. Pool symbols are resolved best-effort for
//! the description; they never gate the finding.

use crate::events::TxEvent;
use crate::fetcher::PoolFetcher;
use crate::models::{AppResult, Finding, FindingType, Label, Severity};
use crate::rules::Rule;
use crate::utils::{headline_symbol, lower_hex, lower_hex_hash};
use alloy_primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;

pub struct RemovalAfterCreationRule {
    fetcher: Arc<PoolFetcher>,
    factory: Address,
    reference_block_offset: u64,
}

impl RemovalAfterCreationRule {
    pub fn new(fetcher: Arc<PoolFetcher>, factory: Address, reference_block_offset: u64) -> Self {
        Self {
            fetcher,
            factory,
            reference_block_offset,
        }
    }

    /// Symbols are read at the same reference block the withdrawal
    /// rules use, so both share one cached snapshot per token.
    async fn symbol_pair(&self, tx: &TxEvent, pool: Address) -> String {
        let data = self.fetcher.get_pool_data(tx.block_number, pool).await;
        if !data.valid {
            return "UNKNOWN - UNKNOWN".to_string();
        }
        let reference_block = tx.block_number.saturating_sub(self.reference_block_offset);
        let symbol0 = self
            .fetcher
            .get_token_symbol(reference_block, data.token0)
            .await;
        let symbol1 = self
            .fetcher
            .get_token_symbol(reference_block, data.token1)
            .await;
        if headline_symbol(&symbol0, &symbol1) == symbol1 {
            format!("{symbol1} - {symbol0}")
        } else {
            format!("{symbol0} - {symbol1}")
        }
    }
}

#[async_trait]
impl Rule for RemovalAfterCreationRule {
    fn name(&self) -> &'static str {
        "removal-after-creation"
    }

    fn alert_id(&self) -> &'static str {
        "RUG-3"
    }

    async fn evaluate(&self, tx: &TxEvent) -> AppResult<Vec<Finding>> {
        let creations = tx.creation_events(Some(self.factory));
        if creations.is_empty() {
            return Ok(Vec::new());
        }

        let creator = tx.from;
        let mut findings = Vec::new();

        for creation in &creations {
            let pool = creation.event.pool();
            let removals = tx.removal_events(Some(pool));
            if removals.is_empty() {
                continue;
            }

            let token_symbol = self.symbol_pair(tx, pool).await;

            findings.push(
                Finding::new(
                    "Suspicious Activity By Liquidity Pool Creator",
                    format!(
                        "Liquidity pool created by {} and then removed liquidity",
                        lower_hex(&creator)
                    ),
                    self.alert_id(),
                    Severity::High,
                    FindingType::Exploit,
                )
                .with_label(Label::address(lower_hex(&creator), "attacker", 0.9))
                .with_label(Label::address(
                    lower_hex(&pool),
                    "soft-rug-pull-address",
                    0.9,
                ))
                .with_metadata("tokenSymbol", token_symbol)
                .with_metadata("pool", lower_hex(&pool))
                .with_metadata("deployer", lower_hex(&creator))
                .with_metadata("transaction", lower_hex_hash(&tx.hash))
                .with_metadata("event", creation.event.name())
                .with_metadata("removalCount", removals.len().to_string()),
            );
        }

        Ok(findings)
    }
}
