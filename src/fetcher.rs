//! Pool state fetcher
//!
//! Read-through cache over the contract views the detection rules need:
//! pool metadata, token balance pairs and token symbols. Every accessor
//! is total. RPC failures degrade to sentinel values (`valid == false`,
//! zero balances, `"UNKNOWN"`) so rule evaluation never aborts on a
//! flaky node.
//!
//! Keys include the block number, so reads are stable snapshots and a
//! repeated evaluation of the same transaction is served from memory.
//! There is no miss coalescing: concurrent lookups of a cold key may
//! each go to the node, which is harmless because all of them store the
//! same snapshot value. The mutex guards map operations only and is
//! never held across an await.

use crate::providers::{BlockTag, ChainClient};
use crate::utils::constants::UNKNOWN_SYMBOL;
use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

sol! {
    function token0() external view returns (address);
    function token1() external view returns (address);
    function totalSupply() external view returns (uint256);
    function balanceOf(address account) external view returns (uint256);
    function symbol() external view returns (string);
}

/// Pool metadata snapshot at a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolData {
    /// False when any of the three reads failed; other fields are
    /// zeroed and must not be interpreted
    pub valid: bool,
    pub token0: Address,
    pub token1: Address,
    pub total_supply: U256,
}

impl PoolData {
    fn invalid() -> Self {
        Self {
            valid: false,
            token0: Address::ZERO,
            token1: Address::ZERO,
            total_supply: U256::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKind {
    PoolData,
    Balance,
    Symbol,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Pool(PoolData),
    Balance(U256, U256),
    Symbol(String),
}

type CacheKey = (CacheKind, Address, u64);

/// Cache hit/miss counters
#[derive(Debug, Default)]
pub struct FetcherStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
}

impl FetcherStats {
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

pub struct PoolFetcher {
    client: Arc<dyn ChainClient>,
    cache: Mutex<LruCache<CacheKey, CacheValue>>,
    pub stats: FetcherStats,
}

impl PoolFetcher {
    pub fn new(client: Arc<dyn ChainClient>, cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            client,
            cache: Mutex::new(LruCache::new(capacity)),
            stats: FetcherStats::default(),
        }
    }

    fn cache_get(&self, key: &CacheKey) -> Option<CacheValue> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let hit = cache.get(key).cloned();
        match hit {
            Some(_) => self.stats.hits.fetch_add(1, Ordering::Relaxed),
            None => self.stats.misses.fetch_add(1, Ordering::Relaxed),
        };
        hit
    }

    fn cache_put(&self, key: CacheKey, value: CacheValue) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.put(key, value);
    }

    async fn read_u256(&self, to: Address, data: Vec<u8>, block: u64) -> Option<U256> {
        let ret = self
            .client
            .call(to, data.into(), BlockTag::Number(block))
            .await
            .ok()?;
        totalSupplyCall::abi_decode_returns(&ret, true)
            .ok()
            .map(|r| r._0)
    }

    async fn read_address(&self, to: Address, data: Vec<u8>, block: u64) -> Option<Address> {
        let ret = self
            .client
            .call(to, data.into(), BlockTag::Number(block))
            .await
            .ok()?;
        token0Call::abi_decode_returns(&ret, true).ok().map(|r| r._0)
    }

    /// Pool metadata at a block. Never errors; a failed read yields the
    /// invalid sentinel, which is cached like any other snapshot.
    pub async fn get_pool_data(&self, block: u64, pool: Address) -> PoolData {
        let key = (CacheKind::PoolData, pool, block);
        if let Some(CacheValue::Pool(data)) = self.cache_get(&key) {
            return data;
        }

        let (token0, token1, total_supply) = tokio::join!(
            self.read_address(pool, token0Call {}.abi_encode(), block),
            self.read_address(pool, token1Call {}.abi_encode(), block),
            self.read_u256(pool, totalSupplyCall {}.abi_encode(), block),
        );

        let data = match (token0, token1, total_supply) {
            (Some(token0), Some(token1), Some(total_supply)) => PoolData {
                valid: true,
                token0,
                token1,
                total_supply,
            },
            _ => {
                debug!(%pool, block, "Pool metadata read failed, caching invalid sentinel");
                PoolData::invalid()
            }
        };

        self.cache_put(key, CacheValue::Pool(data));
        data
    }

    /// Balances of both pool tokens held by the pool itself, read in
    /// parallel. Either read failing degrades the pair to (0, 0).
    pub async fn get_pool_balance(
        &self,
        block: u64,
        pool: Address,
        token0: Address,
        token1: Address,
    ) -> (U256, U256) {
        let key = (CacheKind::Balance, pool, block);
        if let Some(CacheValue::Balance(b0, b1)) = self.cache_get(&key) {
            return (b0, b1);
        }

        let data = balanceOfCall { account: pool }.abi_encode();
        let (balance0, balance1) = tokio::join!(
            self.read_u256(token0, data.clone(), block),
            self.read_u256(token1, data, block),
        );

        let pair = match (balance0, balance1) {
            (Some(b0), Some(b1)) => (b0, b1),
            _ => {
                debug!(%pool, block, "Balance read failed, degrading to zero");
                (U256::ZERO, U256::ZERO)
            }
        };

        self.cache_put(key, CacheValue::Balance(pair.0, pair.1));
        pair
    }

    /// Token symbol with ABI-variant fallback: the standard `string`
    /// return is tried first, then the legacy `bytes32` layout, then
    /// the UNKNOWN sentinel.
    pub async fn get_token_symbol(&self, block: u64, token: Address) -> String {
        let key = (CacheKind::Symbol, token, block);
        if let Some(CacheValue::Symbol(symbol)) = self.cache_get(&key) {
            return symbol;
        }

        let symbol = match self
            .client
            .call(
                token,
                symbolCall {}.abi_encode().into(),
                BlockTag::Number(block),
            )
            .await
        {
            Ok(ret) => decode_symbol(&ret).unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
            Err(_) => UNKNOWN_SYMBOL.to_string(),
        };

        self.cache_put(key, CacheValue::Symbol(symbol.clone()));
        symbol
    }
}

/// Ordered decode attempts against the raw return bytes
fn decode_symbol(ret: &[u8]) -> Option<String> {
    if let Ok(decoded) = symbolCall::abi_decode_returns(ret, true) {
        return Some(decoded._0);
    }
    // Legacy tokens return the symbol as a null-padded bytes32
    if ret.len() == 32 {
        let trimmed: Vec<u8> = ret.iter().copied().take_while(|b| *b != 0).collect();
        if !trimmed.is_empty() {
            return std::str::from_utf8(&trimmed).ok().map(String::from);
        }
    }
    None
}
