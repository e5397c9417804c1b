//! Transaction view and event-log decoding
//!
//! A `TxEvent` is the read-only view of one observed transaction: raw
//! fields plus its ordered receipt logs. Rules never see raw topics;
//! they filter through the typed accessors, which decode each log
//! against the exact on-chain ABI (indexed positions included) and
//! return tagged variants. Filtering never mutates the underlying
//! transaction and repeated identical calls return equal results.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolEvent;

/// Event ABIs consumed from chain logs. Signatures must match on-chain
/// emission exactly or topic filtering silently returns zero matches.
pub mod abi {
    use alloy_sol_types::sol;

    sol! {
        event PairCreated(address indexed token0, address indexed token1, address pair, uint256 pairIndex);
        event PoolCreated(address indexed token0, address indexed token1, uint24 fee, address pool, uint256 poolIndex);
        event NewPool(address indexed token0, address indexed token1, uint24 fee, address pool, uint256 poolIndex);

        event Mint(address indexed sender, uint256 amount0, uint256 amount1);
        event Burn(address indexed sender, uint256 amount0, uint256 amount1, address indexed to);
        event RemoveLiquidity(address indexed provider, uint256 amount0, uint256 amount1);

        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);
    }
}

/// One undecoded receipt log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    /// Emitting contract
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl RawLog {
    pub fn new(address: Address, topics: Vec<B256>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }

    #[inline]
    pub fn topic0(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

/// Pool/pair creation event, one variant per factory ABI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationEvent {
    PairCreated {
        token0: Address,
        token1: Address,
        pair: Address,
    },
    PoolCreated {
        token0: Address,
        token1: Address,
        fee: u32,
        pool: Address,
    },
    NewPool {
        token0: Address,
        token1: Address,
        fee: u32,
        pool: Address,
    },
}

impl CreationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PairCreated { .. } => "PairCreated",
            Self::PoolCreated { .. } => "PoolCreated",
            Self::NewPool { .. } => "NewPool",
        }
    }

    /// Address of the created pool/pair
    pub fn pool(&self) -> Address {
        match self {
            Self::PairCreated { pair, .. } => *pair,
            Self::PoolCreated { pool, .. } | Self::NewPool { pool, .. } => *pool,
        }
    }

    pub fn tokens(&self) -> (Address, Address) {
        match self {
            Self::PairCreated { token0, token1, .. }
            | Self::PoolCreated { token0, token1, .. }
            | Self::NewPool { token0, token1, .. } => (*token0, *token1),
        }
    }
}

/// Liquidity add/remove event on a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiquidityEvent {
    Mint {
        sender: Address,
        amount0: U256,
        amount1: U256,
    },
    Burn {
        sender: Address,
        amount0: U256,
        amount1: U256,
        to: Address,
    },
    RemoveLiquidity {
        provider: Address,
        amount0: U256,
        amount1: U256,
    },
}

impl LiquidityEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "Mint",
            Self::Burn { .. } => "Burn",
            Self::RemoveLiquidity { .. } => "RemoveLiquidity",
        }
    }

    pub fn amounts(&self) -> (U256, U256) {
        match self {
            Self::Mint {
                amount0, amount1, ..
            }
            | Self::Burn {
                amount0, amount1, ..
            }
            | Self::RemoveLiquidity {
                amount0, amount1, ..
            } => (*amount0, *amount1),
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Self::Burn { .. } | Self::RemoveLiquidity { .. })
    }
}

/// Decoded creation log with its emitter (the factory)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationLog {
    pub emitter: Address,
    pub event: CreationEvent,
}

/// Decoded liquidity log with its emitter (the pool)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityLog {
    pub emitter: Address,
    pub event: LiquidityEvent,
}

/// Decoder mapping raw logs to tagged event variants.
///
/// Topic0 is matched first, then the full log is decoded with
/// validation; a log that carries a known topic but malformed data
/// simply yields `None` and is skipped by the filters.
pub struct EventDecoder;

impl EventDecoder {
    pub fn try_creation(log: &RawLog) -> Option<CreationEvent> {
        let topic0 = log.topic0()?;
        if topic0 == abi::PairCreated::SIGNATURE_HASH {
            let ev = abi::PairCreated::decode_raw_log(log.topics.iter().copied(), &log.data, true)
                .ok()?;
            Some(CreationEvent::PairCreated {
                token0: ev.token0,
                token1: ev.token1,
                pair: ev.pair,
            })
        } else if topic0 == abi::PoolCreated::SIGNATURE_HASH {
            let ev = abi::PoolCreated::decode_raw_log(log.topics.iter().copied(), &log.data, true)
                .ok()?;
            Some(CreationEvent::PoolCreated {
                token0: ev.token0,
                token1: ev.token1,
                fee: ev.fee.to::<u32>(),
                pool: ev.pool,
            })
        } else if topic0 == abi::NewPool::SIGNATURE_HASH {
            let ev =
                abi::NewPool::decode_raw_log(log.topics.iter().copied(), &log.data, true).ok()?;
            Some(CreationEvent::NewPool {
                token0: ev.token0,
                token1: ev.token1,
                fee: ev.fee.to::<u32>(),
                pool: ev.pool,
            })
        } else {
            None
        }
    }

    pub fn try_liquidity(log: &RawLog) -> Option<LiquidityEvent> {
        let topic0 = log.topic0()?;
        if topic0 == abi::Mint::SIGNATURE_HASH {
            let ev = abi::Mint::decode_raw_log(log.topics.iter().copied(), &log.data, true).ok()?;
            Some(LiquidityEvent::Mint {
                sender: ev.sender,
                amount0: ev.amount0,
                amount1: ev.amount1,
            })
        } else if topic0 == abi::Burn::SIGNATURE_HASH {
            let ev = abi::Burn::decode_raw_log(log.topics.iter().copied(), &log.data, true).ok()?;
            Some(LiquidityEvent::Burn {
                sender: ev.sender,
                amount0: ev.amount0,
                amount1: ev.amount1,
                to: ev.to,
            })
        } else if topic0 == abi::RemoveLiquidity::SIGNATURE_HASH {
            let ev =
                abi::RemoveLiquidity::decode_raw_log(log.topics.iter().copied(), &log.data, true)
                    .ok()?;
            Some(LiquidityEvent::RemoveLiquidity {
                provider: ev.provider,
                amount0: ev.amount0,
                amount1: ev.amount1,
            })
        } else {
            None
        }
    }

    /// Topic0 values the block stream should subscribe on
    pub fn watched_topics() -> Vec<B256> {
        vec![
            abi::PairCreated::SIGNATURE_HASH,
            abi::PoolCreated::SIGNATURE_HASH,
            abi::NewPool::SIGNATURE_HASH,
            abi::Mint::SIGNATURE_HASH,
            abi::Burn::SIGNATURE_HASH,
            abi::RemoveLiquidity::SIGNATURE_HASH,
        ]
    }
}

/// Read-only view of one observed transaction
#[derive(Debug, Clone)]
pub struct TxEvent {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub nonce: u64,
    pub block_number: u64,
    logs: Vec<RawLog>,
}

impl TxEvent {
    pub fn new(
        hash: B256,
        from: Address,
        to: Option<Address>,
        nonce: u64,
        block_number: u64,
        logs: Vec<RawLog>,
    ) -> Self {
        Self {
            hash,
            from,
            to,
            nonce,
            block_number,
            logs,
        }
    }

    pub fn logs(&self) -> &[RawLog] {
        &self.logs
    }

    #[inline]
    fn emitter_matches(log: &RawLog, emitter: Option<Address>) -> bool {
        match emitter {
            Some(addr) => log.address == addr,
            None => true,
        }
    }

    /// Pool/pair creation events, optionally scoped to one factory
    pub fn creation_events(&self, emitter: Option<Address>) -> Vec<CreationLog> {
        self.logs
            .iter()
            .filter(|log| Self::emitter_matches(log, emitter))
            .filter_map(|log| {
                EventDecoder::try_creation(log).map(|event| CreationLog {
                    emitter: log.address,
                    event,
                })
            })
            .collect()
    }

    fn liquidity_events_where(
        &self,
        emitter: Option<Address>,
        keep: impl Fn(&LiquidityEvent) -> bool,
    ) -> Vec<LiquidityLog> {
        self.logs
            .iter()
            .filter(|log| Self::emitter_matches(log, emitter))
            .filter_map(|log| {
                EventDecoder::try_liquidity(log)
                    .filter(&keep)
                    .map(|event| LiquidityLog {
                        emitter: log.address,
                        event,
                    })
            })
            .collect()
    }

    /// Add-liquidity (Mint) events, optionally scoped to one emitter
    pub fn mint_events(&self, emitter: Option<Address>) -> Vec<LiquidityLog> {
        self.liquidity_events_where(emitter, |ev| matches!(ev, LiquidityEvent::Mint { .. }))
    }

    /// Burn and RemoveLiquidity events, in log order
    pub fn removal_events(&self, emitter: Option<Address>) -> Vec<LiquidityLog> {
        self.liquidity_events_where(emitter, LiquidityEvent::is_removal)
    }

    /// Count of standard ERC-20 Transfer/Approval logs, optionally scoped
    /// to one token. Used as a cheap in-transaction activity signal.
    pub fn erc20_activity_count(&self, token: Option<Address>) -> usize {
        self.logs
            .iter()
            .filter(|log| Self::emitter_matches(log, token))
            .filter(|log| {
                matches!(
                    log.topic0(),
                    Some(t) if t == abi::Transfer::SIGNATURE_HASH
                        || t == abi::Approval::SIGNATURE_HASH
                )
            })
            .count()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const FACTORY: Address = address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
    const TOKEN0: Address = address!("801c6f81abf4b3f6471a57fcb8d0b6d867d2c959");
    const TOKEN1: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    const PAIR: Address = address!("b30f0d842c01605c5f265329b4f7157a533d6164");

    #[test]
    fn test_pair_created_decodes() {
        let tx = testlog::tx_with_logs(vec![testlog::pair_created(FACTORY, TOKEN0, TOKEN1, PAIR)]);
        let events = tx.creation_events(Some(FACTORY));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].emitter, FACTORY);
        assert_eq!(events[0].event.pool(), PAIR);
        assert_eq!(events[0].event.tokens(), (TOKEN0, TOKEN1));
        assert_eq!(events[0].event.name(), "PairCreated");
    }

    #[test]
    fn test_emitter_filter_excludes_other_factories() {
        let other = Address::repeat_byte(0x99);
        let tx = testlog::tx_with_logs(vec![testlog::pair_created(FACTORY, TOKEN0, TOKEN1, PAIR)]);
        assert!(tx.creation_events(Some(other)).is_empty());
        assert_eq!(tx.creation_events(None).len(), 1);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let tx = testlog::tx_with_logs(vec![
            testlog::pair_created(FACTORY, TOKEN0, TOKEN1, PAIR),
            testlog::mint(PAIR, FACTORY, U256::from(5u64), U256::from(6u64)),
        ]);
        let first = tx.creation_events(Some(FACTORY));
        let second = tx.creation_events(Some(FACTORY));
        assert_eq!(first, second);
        assert_eq!(tx.mint_events(Some(PAIR)), tx.mint_events(Some(PAIR)));
    }

    #[test]
    fn test_removal_events_include_burn_in_log_order() {
        let tx = testlog::tx_with_logs(vec![
            testlog::mint(PAIR, TOKEN0, U256::from(1u64), U256::from(1u64)),
            testlog::burn(PAIR, TOKEN0, U256::from(2u64), U256::from(3u64), TOKEN1),
        ]);
        let removals = tx.removal_events(Some(PAIR));
        assert_eq!(removals.len(), 1);
        assert_eq!(
            removals[0].event.amounts(),
            (U256::from(2u64), U256::from(3u64))
        );
        assert!(removals[0].event.is_removal());
    }

    #[test]
    fn test_unknown_topic_yields_no_events() {
        let junk = RawLog::new(FACTORY, vec![B256::repeat_byte(0x42)], Bytes::new());
        let tx = testlog::tx_with_logs(vec![junk]);
        assert!(tx.creation_events(None).is_empty());
        assert!(tx.mint_events(None).is_empty());
        assert!(tx.removal_events(None).is_empty());
    }

    #[test]
    fn test_erc20_activity_count() {
        let tx = testlog::tx_with_logs(vec![
            testlog::transfer(TOKEN0, TOKEN1, PAIR, U256::from(10u64)),
            testlog::transfer(TOKEN1, TOKEN0, PAIR, U256::from(10u64)),
        ]);
        assert_eq!(tx.erc20_activity_count(None), 2);
        assert_eq!(tx.erc20_activity_count(Some(TOKEN0)), 1);
    }
}
