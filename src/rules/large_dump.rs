//! Large-dump rule
//!
//! A freshly created pool receives a Mint whose raw token amount
//! exceeds the configured absolute threshold. Outsized one-sided
//! deposits right after creation precede dump-and-exit patterns.

use crate::events::TxEvent;
use crate::models::{AppResult, Finding, FindingType, Label, Severity};
use crate::rules::Rule;
use crate::utils::{lower_hex, lower_hex_hash};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;

pub struct LargeDumpRule {
    factory: Address,
    threshold: U256,
}

impl LargeDumpRule {
    pub fn new(factory: Address, threshold: U256) -> Self {
        Self { factory, threshold }
    }
}

#[async_trait]
impl Rule for LargeDumpRule {
    fn name(&self) -> &'static str {
        "large-dump"
    }

    fn alert_id(&self) -> &'static str {
        "RUG-5"
    }

    async fn evaluate(&self, tx: &TxEvent) -> AppResult<Vec<Finding>> {
        let creations = tx.creation_events(Some(self.factory));
        if creations.is_empty() {
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        for creation in &creations {
            let pool = creation.event.pool();
            for deposit in tx.mint_events(Some(pool)) {
                let (amount0, amount1) = deposit.event.amounts();
                if amount0 <= self.threshold && amount1 <= self.threshold {
                    continue;
                }

                let (token0, token1) = creation.event.tokens();
                findings.push(
                    Finding::new(
                        "Potential Rug Pull Activity By Liquidity Pool Creator",
                        format!(
                            "Pool {} was created and a large amount of tokens was moved into it",
                            lower_hex(&pool)
                        ),
                        self.alert_id(),
                        Severity::High,
                        FindingType::Exploit,
                    )
                    .with_label(Label::address(lower_hex(&tx.from), "attacker", 0.9))
                    .with_metadata("pool", lower_hex(&pool))
                    .with_metadata("token0", lower_hex(&token0))
                    .with_metadata("token1", lower_hex(&token1))
                    .with_metadata("amount0", amount0.to_string())
                    .with_metadata("amount1", amount1.to_string())
                    .with_metadata("threshold", self.threshold.to_string())
                    .with_metadata("transaction", lower_hex_hash(&tx.hash)),
                );
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testlog;
    use crate::utils::constants::DEFAULT_LARGE_DUMP_THRESHOLD;

    const FACTORY: Address = Address::repeat_byte(0xfa);
    const TOKEN0: Address = Address::repeat_byte(0x01);
    const TOKEN1: Address = Address::repeat_byte(0x02);
    const PAIR: Address = Address::repeat_byte(0x03);

    fn rule() -> LargeDumpRule {
        LargeDumpRule::new(FACTORY, DEFAULT_LARGE_DUMP_THRESHOLD)
    }

    #[tokio::test]
    async fn test_oversized_mint_fires() {
        let big = DEFAULT_LARGE_DUMP_THRESHOLD + U256::from(1u64);
        let tx = testlog::tx_with_logs(vec![
            testlog::pair_created(FACTORY, TOKEN0, TOKEN1, PAIR),
            testlog::mint(PAIR, TOKEN0, big, U256::ZERO),
        ]);

        let findings = rule().evaluate(&tx).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].alert_id, "RUG-5");
        assert_eq!(findings[0].kind, FindingType::Exploit);
    }

    #[tokio::test]
    async fn test_threshold_is_exclusive() {
        // Exactly at the threshold does not count as exceeding it
        let tx = testlog::tx_with_logs(vec![
            testlog::pair_created(FACTORY, TOKEN0, TOKEN1, PAIR),
            testlog::mint(PAIR, TOKEN0, DEFAULT_LARGE_DUMP_THRESHOLD, U256::ZERO),
        ]);
        assert!(rule().evaluate(&tx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_amount_can_trigger() {
        let big = DEFAULT_LARGE_DUMP_THRESHOLD + U256::from(1u64);
        let tx = testlog::tx_with_logs(vec![
            testlog::pair_created(FACTORY, TOKEN0, TOKEN1, PAIR),
            testlog::mint(PAIR, TOKEN0, U256::ZERO, big),
        ]);
        assert_eq!(rule().evaluate(&tx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mint_without_creation_is_quiet() {
        let big = DEFAULT_LARGE_DUMP_THRESHOLD + U256::from(1u64);
        let tx = testlog::tx_with_logs(vec![testlog::mint(PAIR, TOKEN0, big, big)]);
        assert!(rule().evaluate(&tx).await.unwrap().is_empty());
    }
}
