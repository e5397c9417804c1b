//! Shared fixtures for integration tests

#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolEvent, SolValue};
use async_trait::async_trait;
use rugwatch::events::abi;
use rugwatch::{AppError, AppResult, BlockTag, BlockTx, ChainClient, RawLog, TxEvent};
use std::collections::HashMap;
use std::sync::Mutex;

/// Scripted chain client: unstubbed calls revert, code and nonce
/// lookups default to a fresh EOA.
#[derive(Default)]
pub struct ScriptedClient {
    pub chain_id: u64,
    calls: Mutex<HashMap<(Address, Vec<u8>), Bytes>>,
    nonces: Mutex<HashMap<Address, u64>>,
    code: Mutex<HashMap<Address, Bytes>>,
}

impl ScriptedClient {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    pub fn stub_call(&self, to: Address, data: impl AsRef<[u8]>, ret: Bytes) {
        self.calls
            .lock()
            .unwrap()
            .insert((to, data.as_ref().to_vec()), ret);
    }

    pub fn stub_nonce(&self, address: Address, nonce: u64) {
        self.nonces.lock().unwrap().insert(address, nonce);
    }

    pub fn stub_code(&self, address: Address, code: Bytes) {
        self.code.lock().unwrap().insert(address, code);
    }
}

#[async_trait]
impl ChainClient for ScriptedClient {
    async fn chain_id(&self) -> AppResult<u64> {
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> AppResult<u64> {
        Ok(1_000_000)
    }

    async fn call(&self, to: Address, data: Bytes, _block: BlockTag) -> AppResult<Bytes> {
        self.calls
            .lock()
            .unwrap()
            .get(&(to, data.to_vec()))
            .cloned()
            .ok_or_else(|| AppError::rpc_error("execution reverted"))
    }

    async fn get_code(&self, address: Address, _block: BlockTag) -> AppResult<Bytes> {
        Ok(self
            .code
            .lock()
            .unwrap()
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_transaction_count(&self, address: Address, _block: BlockTag) -> AppResult<u64> {
        Ok(self
            .nonces
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or(0))
    }

    async fn block_transactions(&self, _block: u64) -> AppResult<Vec<BlockTx>> {
        Ok(Vec::new())
    }
}

pub fn pair_created(factory: Address, token0: Address, token1: Address, pair: Address) -> RawLog {
    RawLog::new(
        factory,
        vec![
            abi::PairCreated::SIGNATURE_HASH,
            token0.into_word(),
            token1.into_word(),
        ],
        Bytes::from((pair, U256::ZERO).abi_encode()),
    )
}

pub fn mint(pool: Address, sender: Address, amount0: U256, amount1: U256) -> RawLog {
    RawLog::new(
        pool,
        vec![abi::Mint::SIGNATURE_HASH, sender.into_word()],
        Bytes::from((amount0, amount1).abi_encode()),
    )
}

pub fn burn(pool: Address, sender: Address, amount0: U256, amount1: U256, to: Address) -> RawLog {
    RawLog::new(
        pool,
        vec![
            abi::Burn::SIGNATURE_HASH,
            sender.into_word(),
            to.into_word(),
        ],
        Bytes::from((amount0, amount1).abi_encode()),
    )
}

pub fn tx_with_logs(from: Address, logs: Vec<RawLog>) -> TxEvent {
    TxEvent::new(B256::repeat_byte(0x77), from, None, 3, 1_000_000, logs)
}
