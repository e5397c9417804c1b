//! Configuration module for the rug-pull monitor
//! Handles all configurable parameters, with environment overrides

use crate::utils::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CREATOR_NONCE_THRESHOLD, DEFAULT_FINDINGS_CAP,
    DEFAULT_LARGE_DUMP_THRESHOLD, DEFAULT_REFERENCE_BLOCK_OFFSET,
    DEFAULT_WITHDRAWAL_THRESHOLD_PCT,
};
use alloy_primitives::{Address, U256};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the monitoring agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// HTTP RPC URL for chain reads
    pub http_url: String,

    /// Token whose pools the creation/liquidity rules watch.
    /// None means watch every pool the bound factory creates.
    pub tracked_token: Option<Address>,

    /// Creator nonce at or below this is considered a new account
    pub creator_nonce_threshold: u64,

    /// Percentage of pre-withdrawal balance that counts as a majority
    /// withdrawal (inclusive)
    pub withdrawal_threshold_pct: u64,

    /// Raw-unit Mint amount that counts as a large dump
    pub large_dump_threshold: U256,

    /// Blocks to step back for pre-withdrawal balance reads
    pub reference_block_offset: u64,

    /// Lifetime findings cap before the handler goes quiet
    pub findings_cap: usize,

    /// Fetcher LRU capacity across all cached read kinds
    pub cache_capacity: usize,

    /// Timeout for individual RPC calls
    pub rpc_timeout: Duration,

    /// Block poll interval for the stream loop
    pub poll_interval: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            http_url: std::env::var("RUGWATCH_HTTP_URL")
                .unwrap_or_else(|_| "https://eth-mainnet.g.alchemy.com/v2/YOUR_API_KEY".to_string()),
            tracked_token: std::env::var("RUGWATCH_TRACKED_TOKEN")
                .ok()
                .and_then(|s| Address::from_str(&s).ok()),
            creator_nonce_threshold: env_u64(
                "RUGWATCH_CREATOR_NONCE_THRESHOLD",
                DEFAULT_CREATOR_NONCE_THRESHOLD,
            ),
            withdrawal_threshold_pct: env_u64(
                "RUGWATCH_WITHDRAWAL_THRESHOLD_PCT",
                DEFAULT_WITHDRAWAL_THRESHOLD_PCT,
            ),
            large_dump_threshold: std::env::var("RUGWATCH_LARGE_DUMP_THRESHOLD")
                .ok()
                .and_then(|s| U256::from_str(&s).ok())
                .unwrap_or(DEFAULT_LARGE_DUMP_THRESHOLD),
            reference_block_offset: env_u64(
                "RUGWATCH_REFERENCE_BLOCK_OFFSET",
                DEFAULT_REFERENCE_BLOCK_OFFSET,
            ),
            findings_cap: env_u64("RUGWATCH_FINDINGS_CAP", DEFAULT_FINDINGS_CAP as u64) as usize,
            cache_capacity: env_u64("RUGWATCH_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY as u64)
                as usize,
            rpc_timeout: Duration::from_secs(crate::utils::constants::RPC_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(env_u64("RUGWATCH_POLL_INTERVAL_SECS", 3)),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.creator_nonce_threshold, 10);
        assert_eq!(config.withdrawal_threshold_pct, 90);
        assert_eq!(config.reference_block_offset, 1);
        assert_eq!(config.findings_cap, 5);
        assert_eq!(
            config.large_dump_threshold,
            U256::from(10u64).pow(U256::from(21u64))
        );
    }
}
