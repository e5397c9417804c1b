//! Transaction handler
//!
//! Fans each transaction out to every registered rule concurrently and
//! merges the results. A rule failure is logged and contributes an
//! empty list; it never suppresses findings from sibling rules. Output
//! order is deterministic: rule-registration order, then each rule's
//! own emission order.

use crate::config::AgentConfig;
use crate::events::TxEvent;
use crate::fetcher::PoolFetcher;
use crate::models::{AppError, AppResult, Finding};
use crate::network::NetworkManager;
use crate::providers::ChainClient;
use crate::rules::{
    CreatorReputationRule, LargeDumpRule, LiquidityAbsenceRule, MajorityWithdrawalRule,
    RemovalAfterCreationRule, Rule,
};
use futures_util::future::join_all;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Lifetime cap on emitted findings, keeping the alert feed from being
/// flooded by a noisy deployment.
///
/// The check happens before fan-out and recording after, so the
/// transaction that crosses the cap may overshoot it; once exhausted
/// the handler returns empty lists until `reset`.
pub struct FindingLimiter {
    cap: usize,
    emitted: AtomicUsize,
}

impl FindingLimiter {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            emitted: AtomicUsize::new(0),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.emitted.load(Ordering::SeqCst) >= self.cap
    }

    pub fn record(&self, count: usize) {
        self.emitted.fetch_add(count, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.emitted.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.emitted.store(0, Ordering::SeqCst);
    }
}

/// Lifetime counters, logged on shutdown
#[derive(Debug, Default)]
pub struct AgentStats {
    pub transactions: AtomicU64,
    pub findings: AtomicU64,
    pub rule_failures: AtomicU64,
}

impl AgentStats {
    pub fn report(&self) {
        info!(
            transactions = self.transactions.load(Ordering::Relaxed),
            findings = self.findings.load(Ordering::Relaxed),
            rule_failures = self.rule_failures.load(Ordering::Relaxed),
            "📊 Agent stats"
        );
    }
}

pub struct RugPullAgent {
    rules: Vec<Arc<dyn Rule>>,
    limiter: Arc<FindingLimiter>,
    pub stats: AgentStats,
}

impl RugPullAgent {
    /// Assemble an agent from explicit rules and limiter. Rule order
    /// here is the output order.
    pub fn new(rules: Vec<Arc<dyn Rule>>, limiter: Arc<FindingLimiter>) -> Self {
        Self {
            rules,
            limiter,
            stats: AgentStats::default(),
        }
    }

    /// Resolve the chain, bind the factory and wire the standard rule
    /// set. Fails fast on unsupported chains.
    pub async fn initialize(
        client: Arc<dyn ChainClient>,
        config: &AgentConfig,
    ) -> AppResult<Self> {
        let chain_id = client.chain_id().await?;

        let mut network = NetworkManager::new();
        network.set_network(chain_id)?;
        let factory = network
            .factory()
            .ok_or_else(|| AppError::unsupported_chain(chain_id))?;
        info!(chain_id, factory = %factory, "🔗 Bound to network");

        let fetcher = Arc::new(PoolFetcher::new(client.clone(), config.cache_capacity));

        let rules: Vec<Arc<dyn Rule>> = vec![
            Arc::new(LiquidityAbsenceRule::new(factory, config.tracked_token)),
            Arc::new(CreatorReputationRule::new(
                client.clone(),
                factory,
                config.creator_nonce_threshold,
            )),
            Arc::new(RemovalAfterCreationRule::new(
                fetcher.clone(),
                factory,
                config.reference_block_offset,
            )),
            Arc::new(MajorityWithdrawalRule::new(
                fetcher.clone(),
                config.withdrawal_threshold_pct,
                config.reference_block_offset,
            )),
            Arc::new(LargeDumpRule::new(factory, config.large_dump_threshold)),
        ];

        Ok(Self::new(
            rules,
            Arc::new(FindingLimiter::new(config.findings_cap)),
        ))
    }

    pub fn limiter(&self) -> &Arc<FindingLimiter> {
        &self.limiter
    }

    /// Evaluate one transaction against every rule. Never errors; the
    /// worst case is an empty list.
    pub async fn handle_transaction(&self, tx: &TxEvent) -> Vec<Finding> {
        self.stats.transactions.fetch_add(1, Ordering::Relaxed);

        if self.limiter.is_exhausted() {
            return Vec::new();
        }

        let results = join_all(self.rules.iter().map(|rule| rule.evaluate(tx))).await;

        let mut findings = Vec::new();
        for (rule, result) in self.rules.iter().zip(results) {
            match result {
                Ok(rule_findings) => findings.extend(rule_findings),
                Err(e) => {
                    self.stats.rule_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        rule = rule.name(),
                        code = e.code_str(),
                        tx = %tx.hash,
                        "⚠️ Rule evaluation failed: {e}"
                    );
                }
            }
        }

        self.limiter.record(findings.len());
        self.stats
            .findings
            .fetch_add(findings.len() as u64, Ordering::Relaxed);
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testlog;
    use crate::models::{FindingType, Severity};
    use crate::providers::mock::MockChainClient;
    use async_trait::async_trait;

    struct StaticRule {
        name: &'static str,
        findings: Vec<Finding>,
    }

    impl StaticRule {
        fn emitting(name: &'static str, count: usize) -> Arc<dyn Rule> {
            let findings = (0..count)
                .map(|i| {
                    Finding::new(
                        format!("{name}-{i}"),
                        "test",
                        "TEST-1",
                        Severity::Info,
                        FindingType::Info,
                    )
                })
                .collect();
            Arc::new(Self { name, findings })
        }
    }

    #[async_trait]
    impl Rule for StaticRule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn alert_id(&self) -> &'static str {
            "TEST-1"
        }

        async fn evaluate(&self, _tx: &TxEvent) -> AppResult<Vec<Finding>> {
            Ok(self.findings.clone())
        }
    }

    struct FailingRule;

    #[async_trait]
    impl Rule for FailingRule {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn alert_id(&self) -> &'static str {
            "TEST-X"
        }

        async fn evaluate(&self, _tx: &TxEvent) -> AppResult<Vec<Finding>> {
            Err(AppError::rpc_error("simulated failure"))
        }
    }

    #[tokio::test]
    async fn test_fault_isolation_preserves_sibling_findings() {
        let agent = RugPullAgent::new(
            vec![
                StaticRule::emitting("a", 1),
                Arc::new(FailingRule),
                StaticRule::emitting("b", 1),
                StaticRule::emitting("c", 1),
            ],
            Arc::new(FindingLimiter::new(100)),
        );

        let findings = agent
            .handle_transaction(&testlog::tx_with_logs(vec![]))
            .await;
        let names: Vec<&str> = findings.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a-0", "b-0", "c-0"]);
        assert_eq!(agent.stats.rule_failures.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_output_follows_registration_order() {
        let agent = RugPullAgent::new(
            vec![StaticRule::emitting("x", 2), StaticRule::emitting("y", 1)],
            Arc::new(FindingLimiter::new(100)),
        );

        let findings = agent
            .handle_transaction(&testlog::tx_with_logs(vec![]))
            .await;
        let names: Vec<&str> = findings.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x-0", "x-1", "y-0"]);
    }

    #[tokio::test]
    async fn test_limiter_allows_overshoot_then_silences() {
        let agent = RugPullAgent::new(
            vec![StaticRule::emitting("a", 7)],
            Arc::new(FindingLimiter::new(5)),
        );
        let tx = testlog::tx_with_logs(vec![]);

        // Cap not yet reached, the whole batch goes out
        assert_eq!(agent.handle_transaction(&tx).await.len(), 7);
        assert_eq!(agent.limiter().count(), 7);

        // Exhausted now
        assert!(agent.handle_transaction(&tx).await.is_empty());

        agent.limiter().reset();
        assert_eq!(agent.handle_transaction(&tx).await.len(), 7);
    }

    #[tokio::test]
    async fn test_empty_rule_set_yields_empty() {
        let agent = RugPullAgent::new(vec![], Arc::new(FindingLimiter::new(5)));
        assert!(agent
            .handle_transaction(&testlog::tx_with_logs(vec![]))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_initialize_rejects_unsupported_chain() {
        let client = Arc::new(MockChainClient::new(1337));
        let err = match RugPullAgent::initialize(client, &AgentConfig::default()).await {
            Ok(_) => panic!("initialization must fail on an unsupported chain"),
            Err(e) => e,
        };
        assert_eq!(err.code, crate::models::ErrorCode::ConfigUnsupportedChain);
    }

    #[tokio::test]
    async fn test_initialize_builds_five_rules() {
        let client = Arc::new(MockChainClient::new(56));
        let agent = RugPullAgent::initialize(client, &AgentConfig::default())
            .await
            .unwrap();
        let ids: Vec<&str> = agent.rules.iter().map(|r| r.alert_id()).collect();
        assert_eq!(ids, vec!["RUG-1", "RUG-2", "RUG-3", "RUG-4", "RUG-5"]);
    }
}
