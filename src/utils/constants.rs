//! Default thresholds and shared constants

use alloy_primitives::U256;

// ============================================
// Detection thresholds
// ============================================

/// A creator with at most this many prior transactions is considered new
pub const DEFAULT_CREATOR_NONCE_THRESHOLD: u64 = 10;

/// Withdrawals removing at least this percentage of the pre-withdrawal
/// pool balance count as a majority withdrawal (inclusive)
pub const DEFAULT_WITHDRAWAL_THRESHOLD_PCT: u64 = 90;

/// Raw-unit Mint threshold for the large-dump rule.
/// 10^21, i.e. 1000 whole tokens at 18 decimals.
pub const DEFAULT_LARGE_DUMP_THRESHOLD: U256 =
    U256::from_limbs([3_875_820_019_684_212_736, 54, 0, 0]);

/// Blocks to step back when reading pre-withdrawal balances
pub const DEFAULT_REFERENCE_BLOCK_OFFSET: u64 = 1;

// ============================================
// Handler limits
// ============================================

/// Findings emitted across the agent's lifetime before it goes quiet
pub const DEFAULT_FINDINGS_CAP: usize = 5;

// ============================================
// Fetcher cache
// ============================================

/// Entries across all three cached read kinds before LRU eviction
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Symbol reported when neither ABI variant decodes
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";

// ============================================
// Token classification
// ============================================

/// Wrapped-native and stablecoin symbols. When a pool pairs a tracked
/// token against one of these, descriptions name the other side.
pub const MAJOR_TOKEN_SYMBOLS: &[&str] = &[
    "WETH", "WBNB", "WMATIC", "WFTM", "WAVAX", "USDT", "USDC", "BUSD", "DAI",
];

// ============================================
// RPC retry policy
// ============================================

pub const MAX_RPC_RETRIES: u32 = 3;
pub const INITIAL_BACKOFF_MS: u64 = 250;
pub const MAX_BACKOFF_MS: u64 = 4_000;
pub const RPC_TIMEOUT_SECS: u64 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_dump_threshold_is_power_of_ten() {
        let expected = U256::from(10u64).pow(U256::from(21u64));
        assert_eq!(DEFAULT_LARGE_DUMP_THRESHOLD, expected);
    }
}
