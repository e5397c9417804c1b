//! Creator-reputation rule
//!
//! Pools created by fresh externally-owned accounts are a weak but
//! cheap signal: serious deployers have transaction history. Contract
//! creators are exempt, their pools follow different trust assumptions.

use crate::events::TxEvent;
use crate::models::{AppResult, Finding, FindingType, Label, Severity};
use crate::providers::{BlockTag, ChainClient};
use crate::rules::Rule;
use crate::utils::lower_hex;
use alloy_primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

pub struct CreatorReputationRule {
    client: Arc<dyn ChainClient>,
    factory: Address,
    nonce_threshold: u64,
}

impl CreatorReputationRule {
    pub fn new(client: Arc<dyn ChainClient>, factory: Address, nonce_threshold: u64) -> Self {
        Self {
            client,
            factory,
            nonce_threshold,
        }
    }
}

#[async_trait]
impl Rule for CreatorReputationRule {
    fn name(&self) -> &'static str {
        "creator-reputation"
    }

    fn alert_id(&self) -> &'static str {
        "RUG-2"
    }

    async fn evaluate(&self, tx: &TxEvent) -> AppResult<Vec<Finding>> {
        let creations = tx.creation_events(Some(self.factory));
        if creations.is_empty() {
            return Ok(Vec::new());
        }

        let creator = tx.from;

        let code = match self.client.get_code(creator, BlockTag::Latest).await {
            Ok(code) => code,
            Err(e) => {
                warn!(rule = self.name(), code = e.code_str(), "Code lookup failed: {e}");
                return Ok(Vec::new());
            }
        };
        if !code.is_empty() {
            // Contract-created pool
            return Ok(Vec::new());
        }

        let nonce = match self
            .client
            .get_transaction_count(creator, BlockTag::Latest)
            .await
        {
            Ok(nonce) => nonce,
            Err(e) => {
                warn!(rule = self.name(), code = e.code_str(), "Nonce lookup failed: {e}");
                return Ok(Vec::new());
            }
        };
        if nonce > self.nonce_threshold {
            return Ok(Vec::new());
        }

        let findings = creations
            .iter()
            .map(|creation| {
                Finding::new(
                    "Potentially Suspicious Liquidity Pool Creator",
                    format!(
                        "Liquidity pool created by {} with only {} transactions",
                        lower_hex(&creator),
                        nonce
                    ),
                    self.alert_id(),
                    Severity::Info,
                    FindingType::Suspicious,
                )
                .with_label(Label::address(lower_hex(&creator), "low-reputation-creator", 0.6))
                .with_metadata("creator", lower_hex(&creator))
                .with_metadata("transactions", nonce.to_string())
                .with_metadata("pool", lower_hex(&creation.event.pool()))
                .with_metadata(
                    "erc20EventsInTx",
                    tx.erc20_activity_count(None).to_string(),
                )
            })
            .collect();

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testlog;
    use crate::providers::mock::MockChainClient;
    use alloy_primitives::Bytes;

    const FACTORY: Address = Address::repeat_byte(0xfa);
    const TOKEN0: Address = Address::repeat_byte(0x01);
    const TOKEN1: Address = Address::repeat_byte(0x02);
    const PAIR: Address = Address::repeat_byte(0x03);

    fn creation_tx() -> TxEvent {
        testlog::tx_with_logs(vec![testlog::pair_created(FACTORY, TOKEN0, TOKEN1, PAIR)])
    }

    #[tokio::test]
    async fn test_fresh_eoa_creator_fires() {
        let client = Arc::new(MockChainClient::new(1));
        let tx = creation_tx();
        client.stub_nonce(tx.from, 4);
        let rule = CreatorReputationRule::new(client, FACTORY, 10);

        let findings = rule.evaluate(&tx).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].alert_id, "RUG-2");
        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(
            findings[0].metadata.get("transactions").map(String::as_str),
            Some("4")
        );
    }

    #[tokio::test]
    async fn test_contract_creator_is_exempt() {
        let client = Arc::new(MockChainClient::new(1));
        let tx = creation_tx();
        client.stub_code(tx.from, Bytes::from(vec![0x60, 0x80]));
        client.stub_nonce(tx.from, 0);
        let rule = CreatorReputationRule::new(client, FACTORY, 10);

        assert!(rule.evaluate(&tx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let client = Arc::new(MockChainClient::new(1));
        let tx = creation_tx();
        client.stub_nonce(tx.from, 10);
        let rule = CreatorReputationRule::new(client.clone(), FACTORY, 10);
        assert_eq!(rule.evaluate(&tx).await.unwrap().len(), 1);

        client.stub_nonce(tx.from, 11);
        assert!(rule.evaluate(&tx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_creation_no_chain_reads() {
        let client = Arc::new(MockChainClient::new(1));
        let rule = CreatorReputationRule::new(client.clone(), FACTORY, 10);
        let tx = testlog::tx_with_logs(vec![]);

        assert!(rule.evaluate(&tx).await.unwrap().is_empty());
        assert_eq!(client.code_count.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
