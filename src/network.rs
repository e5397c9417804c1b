//! Chain registry
//!
//! Maps a chain id to the swap-factory address the detection rules
//! scope their log filters to. The table is fixed at compile time;
//! `NetworkManager` binds to one entry at startup and is read-only
//! afterwards.

use crate::models::{AppError, AppResult};
use alloy_primitives::{address, Address};
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Supported chains and their swap factory
    pub static ref NETWORK_MAP: HashMap<u64, Address> = {
        let mut m = HashMap::new();
        m.insert(1, address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f")); // Ethereum
        m.insert(10, address!("1F98431c8aD98523631AE4a59f267346ea31F984")); // Optimism
        m.insert(56, address!("cA143Ce32Fe78f1f7019d7d551a6402fC5350c73")); // BNB Smart Chain
        m.insert(137, address!("5757371414417b8C6CAad45bAeF941aBc7d3Ab32")); // Polygon
        m.insert(250, address!("514053a5bAa4CfEf80Aa7c2a55d2C8365A5B5EAd")); // Fantom
        m.insert(42161, address!("84fBa05A20F09a556eBAbf745d9e5DF5D794A038")); // Arbitrum One
        m.insert(43114, address!("794C07912474351b3134E6D6B3B7b3b4A07cbAAa")); // Avalanche
        m
    };
}

/// Resolves the factory for the chain the agent runs on
#[derive(Debug, Clone)]
pub struct NetworkManager {
    network_map: &'static HashMap<u64, Address>,
    chain_id: Option<u64>,
    factory: Option<Address>,
}

impl NetworkManager {
    pub fn new() -> Self {
        Self {
            network_map: &NETWORK_MAP,
            chain_id: None,
            factory: None,
        }
    }

    /// Bind to a chain. Fails with `CFG_UNSUPPORTED_CHAIN` when the
    /// chain has no registered factory, leaving the manager unbound.
    pub fn set_network(&mut self, chain_id: u64) -> AppResult<()> {
        match self.network_map.get(&chain_id) {
            Some(factory) => {
                self.chain_id = Some(chain_id);
                self.factory = Some(*factory);
                Ok(())
            }
            None => Err(AppError::unsupported_chain(chain_id)),
        }
    }

    /// Factory bound by `set_network`
    pub fn factory(&self) -> Option<Address> {
        self.factory
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }
}

impl Default for NetworkManager {
    fn default() -> Self {
        Self::new()
    }
}
