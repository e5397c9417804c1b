//! Detection rules
//!
//! Each rule is an independent async predicate over one transaction
//! view: filter the decoded logs it cares about, optionally consult the
//! fetcher for chain state, emit zero or more findings. Rules hold no
//! per-transaction state; the shared fetcher cache is the only state
//! they touch.
//!
//! A rule that cannot evaluate an individual event logs the failure and
//! moves on. Returning `Err` from `evaluate` is reserved for failures
//! that invalidate the whole invocation, and the aggregator swallows
//! those too.

pub mod creator_reputation;
pub mod large_dump;
pub mod liquidity_absence;
pub mod majority_withdrawal;
pub mod removal_after_creation;

pub use creator_reputation::CreatorReputationRule;
pub use large_dump::LargeDumpRule;
pub use liquidity_absence::LiquidityAbsenceRule;
pub use majority_withdrawal::MajorityWithdrawalRule;
pub use removal_after_creation::RemovalAfterCreationRule;

use crate::events::TxEvent;
use crate::models::{AppResult, Finding};
use alloy_primitives::U256;
use async_trait::async_trait;

#[async_trait]
pub trait Rule: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Stable alert id carried on every finding this rule emits
    fn alert_id(&self) -> &'static str;

    async fn evaluate(&self, tx: &TxEvent) -> AppResult<Vec<Finding>>;
}

/// Withdrawn amount as an integer percentage of the pre-withdrawal
/// balance, floor semantics. A zero balance short-circuits to 0 rather
/// than dividing by zero.
pub(crate) fn withdrawn_percentage(withdrawn: U256, balance_before: U256) -> U256 {
    if balance_before.is_zero() {
        return U256::ZERO;
    }
    withdrawn.saturating_mul(U256::from(100u64)) / balance_before
}
