//! Chain access layer
//!
//! `ChainClient` is the seam between detection logic and the node: the
//! fetcher, the rules and the block stream only ever see this trait, so
//! tests swap in an in-memory client and production wires `RpcClient`.

pub mod rpc;
pub mod stream;

use crate::events::RawLog;
use crate::models::AppResult;
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;

/// Block selector for historical reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

impl BlockTag {
    /// JSON-RPC block parameter
    pub fn as_param(&self) -> serde_json::Value {
        match self {
            BlockTag::Latest => serde_json::Value::String("latest".to_string()),
            BlockTag::Number(n) => serde_json::Value::String(format!("{n:#x}")),
        }
    }
}

/// One transaction as seen in a mined block, receipts merged in
#[derive(Debug, Clone)]
pub struct BlockTx {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub nonce: u64,
    pub logs: Vec<RawLog>,
}

/// Read-only node access
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> AppResult<u64>;

    async fn block_number(&self) -> AppResult<u64>;

    /// eth_call against a contract at the given block
    async fn call(&self, to: Address, data: Bytes, block: BlockTag) -> AppResult<Bytes>;

    /// Deployed bytecode, empty for EOAs
    async fn get_code(&self, address: Address, block: BlockTag) -> AppResult<Bytes>;

    /// Account nonce at the given block
    async fn get_transaction_count(&self, address: Address, block: BlockTag) -> AppResult<u64>;

    /// All transactions of a block with their receipt logs attached
    async fn block_transactions(&self, block: u64) -> AppResult<Vec<BlockTx>>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_tag_params() {
        assert_eq!(BlockTag::Latest.as_param(), "latest");
        assert_eq!(BlockTag::Number(255).as_param(), "0xff");
    }
}
