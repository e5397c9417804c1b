//! Rugwatch Library
//!
//! Soft-rug-pull transaction monitor: every observed transaction is
//! fanned out to a set of independent detection rules over its decoded
//! event logs, backed by a caching chain-state fetcher. Detected
//! signals:
//! - Pool creation without any liquidity deposit
//! - Pools created by fresh low-activity EOAs
//! - Create-and-drain in one atomic transaction
//! - Majority liquidity withdrawals
//! - Outsized token dumps right after creation

pub mod agent;
pub mod config;
pub mod events;
pub mod fetcher;
pub mod models;
pub mod network;
pub mod providers;
pub mod rules;
pub mod utils;

pub use agent::{AgentStats, FindingLimiter, RugPullAgent};
pub use config::AgentConfig;
pub use events::{CreationEvent, EventDecoder, LiquidityEvent, RawLog, TxEvent};
pub use fetcher::{PoolData, PoolFetcher};
pub use models::{AppError, AppResult, EntityType, ErrorCode, Finding, FindingType, Label, Severity};
pub use network::{NetworkManager, NETWORK_MAP};
pub use providers::rpc::RpcClient;
pub use providers::stream::BlockStream;
pub use providers::{BlockTag, BlockTx, ChainClient};
pub use rules::Rule;
