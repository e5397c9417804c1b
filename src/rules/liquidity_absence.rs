//! Liquidity-absence rule
//!
//! A pool or pair is created by the configured factory but nobody adds
//! liquidity in the same transaction. An honest launch deposits
//! liquidity atomically with creation; a bare creation is a trust
//! signal worth flagging.

use crate::events::TxEvent;
use crate::models::{AppResult, Finding, FindingType, Label, Severity};
use crate::rules::Rule;
use crate::utils::lower_hex;
use alloy_primitives::Address;
use async_trait::async_trait;

pub struct LiquidityAbsenceRule {
    factory: Address,
    tracked_token: Option<Address>,
}

impl LiquidityAbsenceRule {
    pub fn new(factory: Address, tracked_token: Option<Address>) -> Self {
        Self {
            factory,
            tracked_token,
        }
    }
}

#[async_trait]
impl Rule for LiquidityAbsenceRule {
    fn name(&self) -> &'static str {
        "liquidity-absence"
    }

    fn alert_id(&self) -> &'static str {
        "RUG-1"
    }

    async fn evaluate(&self, tx: &TxEvent) -> AppResult<Vec<Finding>> {
        let creations = tx.creation_events(Some(self.factory));
        if creations.is_empty() {
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        for creation in &creations {
            let pool = creation.event.pool();

            // Deposits count whether they come from the new pool or the
            // tracked token itself
            let mut deposits = tx.mint_events(Some(pool));
            if deposits.is_empty() {
                if let Some(token) = self.tracked_token {
                    deposits = tx.mint_events(Some(token));
                }
            }
            if !deposits.is_empty() {
                continue;
            }

            let (token0, token1) = creation.event.tokens();
            let mut finding = Finding::new(
                "No Liquidity Deposits",
                format!(
                    "Pool {} was created but no liquidity was deposited in the same transaction",
                    lower_hex(&pool)
                ),
                self.alert_id(),
                Severity::High,
                FindingType::Suspicious,
            )
            .with_label(Label::address(lower_hex(&pool), "suspicious-pool", 0.7))
            .with_metadata("pool", lower_hex(&pool))
            .with_metadata("token0", lower_hex(&token0))
            .with_metadata("token1", lower_hex(&token1))
            .with_metadata("event", creation.event.name());
            if let Some(token) = self.tracked_token {
                finding = finding.with_metadata("trackedToken", lower_hex(&token));
            }
            findings.push(finding);
        }

        Ok(findings)
    }
}
