//! JSON-RPC client
//!
//! reqwest-based client with exponential backoff and jitter on
//! retryable failures (timeouts, connection errors, HTTP 429). Gzip is
//! enabled on both sides of the wire.

use crate::models::{AppError, AppResult, ErrorCode};
use crate::providers::{BlockTag, BlockTx, ChainClient};
use crate::utils::constants::{
    INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RPC_RETRIES, RPC_TIMEOUT_SECS,
};
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Jitter applied to each backoff step, in percent
const RETRY_JITTER_PERCENT: u64 = 20;

#[derive(Clone)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(RPC_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorCode::RpcConnectionFailed, "Failed to build client", e)
            })?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// URL with any `/v2/<key>` segment hidden, for logging
    pub fn masked_url(&self) -> String {
        match self.url.split_once("/v2/") {
            Some((host, _)) => format!("{host}/v2/***HIDDEN***"),
            None => self.url.clone(),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let mut last_error: Option<AppError> = None;

        for attempt in 0..MAX_RPC_RETRIES {
            if attempt > 0 {
                let base_delay = INITIAL_BACKOFF_MS * 2_u64.pow(attempt - 1);
                let capped_delay = base_delay.min(MAX_BACKOFF_MS);
                let jitter_range = (capped_delay * RETRY_JITTER_PERCENT) / 100;
                let jitter: i64 = rand::thread_rng()
                    .gen_range(-(jitter_range as i64)..=(jitter_range as i64));
                let final_delay = (capped_delay as i64 + jitter).max(50) as u64;
                debug!(
                    method,
                    attempt,
                    delay_ms = final_delay,
                    "⏳ Retrying RPC call"
                );
                tokio::time::sleep(Duration::from_millis(final_delay)).await;
            }

            match self.execute::<T>(&payload).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.code.is_retryable() {
                        return Err(e);
                    }
                    warn!(method, code = e.code_str(), "⚠️ Retryable RPC failure: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::rpc_error(format!("{method} failed with no attempts"))))
    }

    async fn execute<T: DeserializeOwned>(&self, payload: &serde_json::Value) -> AppResult<T> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::rpc_rate_limited());
        }
        if !status.is_success() {
            return Err(AppError::rpc_error(format!("HTTP error: {status}")));
        }

        let body: RpcResponse<T> = response.json().await?;

        if let Some(error) = body.error {
            if error.is_rate_limit() {
                return Err(AppError::rpc_rate_limited());
            }
            return Err(AppError::rpc_error(format!(
                "RPC error: {} (code: {})",
                error.message, error.code
            )));
        }

        body.result
            .ok_or_else(|| AppError::new(ErrorCode::RpcInvalidResponse, "No result in response"))
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn chain_id(&self) -> AppResult<u64> {
        let hex: String = self.request("eth_chainId", serde_json::json!([])).await?;
        parse_quantity(&hex)
    }

    async fn block_number(&self) -> AppResult<u64> {
        let hex: String = self.request("eth_blockNumber", serde_json::json!([])).await?;
        parse_quantity(&hex)
    }

    async fn call(&self, to: Address, data: Bytes, block: BlockTag) -> AppResult<Bytes> {
        let params = serde_json::json!([
            { "to": to, "data": format!("{data}") },
            block.as_param()
        ]);
        let hex: String = self.request("eth_call", params).await?;
        parse_bytes(&hex)
    }

    async fn get_code(&self, address: Address, block: BlockTag) -> AppResult<Bytes> {
        let params = serde_json::json!([address, block.as_param()]);
        let hex: String = self.request("eth_getCode", params).await?;
        parse_bytes(&hex)
    }

    async fn get_transaction_count(&self, address: Address, block: BlockTag) -> AppResult<u64> {
        let params = serde_json::json!([address, block.as_param()]);
        let hex: String = self.request("eth_getTransactionCount", params).await?;
        parse_quantity(&hex)
    }

    async fn block_transactions(&self, block: u64) -> AppResult<Vec<BlockTx>> {
        let tag = BlockTag::Number(block).as_param();

        let block_body: RpcBlock = self
            .request("eth_getBlockByNumber", serde_json::json!([tag, true]))
            .await?;
        let receipts: Vec<RpcReceipt> = self
            .request("eth_getBlockReceipts", serde_json::json!([tag]))
            .await?;

        let mut logs_by_tx: HashMap<B256, Vec<crate::events::RawLog>> = HashMap::new();
        for receipt in receipts {
            let hash = parse_b256(&receipt.transaction_hash)?;
            let logs = receipt
                .logs
                .into_iter()
                .map(|log| {
                    Ok(crate::events::RawLog::new(
                        parse_address(&log.address)?,
                        log.topics
                            .iter()
                            .map(|t| parse_b256(t))
                            .collect::<AppResult<Vec<_>>>()?,
                        parse_bytes(&log.data)?,
                    ))
                })
                .collect::<AppResult<Vec<_>>>()?;
            logs_by_tx.insert(hash, logs);
        }

        block_body
            .transactions
            .into_iter()
            .map(|tx| {
                let hash = parse_b256(&tx.hash)?;
                Ok(BlockTx {
                    hash,
                    from: parse_address(&tx.from)?,
                    to: tx.to.as_deref().map(parse_address).transpose()?,
                    nonce: parse_quantity(&tx.nonce)?,
                    logs: logs_by_tx.remove(&hash).unwrap_or_default(),
                })
            })
            .collect()
    }
}

// ============================================
// Wire structures
// ============================================

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: String,
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcErrorBody {
    fn is_rate_limit(&self) -> bool {
        self.code == -32005 || self.message.to_lowercase().contains("rate limit")
    }
}

#[derive(Debug, Deserialize)]
struct RpcBlock {
    transactions: Vec<RpcBlockTx>,
}

#[derive(Debug, Deserialize)]
struct RpcBlockTx {
    hash: String,
    from: String,
    to: Option<String>,
    nonce: String,
}

#[derive(Debug, Deserialize)]
struct RpcReceipt {
    #[serde(rename = "transactionHash")]
    transaction_hash: String,
    logs: Vec<RpcReceiptLog>,
}

#[derive(Debug, Deserialize)]
struct RpcReceiptLog {
    address: String,
    topics: Vec<String>,
    data: String,
}

// ============================================
// Hex parsing
// ============================================

fn parse_quantity(hex: &str) -> AppResult<u64> {
    u64::from_str_radix(hex.trim_start_matches("0x"), 16)
        .map_err(|_| AppError::new(ErrorCode::RpcInvalidResponse, format!("Bad quantity: {hex}")))
}

fn parse_address(hex: &str) -> AppResult<Address> {
    Address::from_str(hex)
        .map_err(|_| AppError::new(ErrorCode::RpcInvalidResponse, format!("Bad address: {hex}")))
}

fn parse_b256(hex: &str) -> AppResult<B256> {
    B256::from_str(hex)
        .map_err(|_| AppError::new(ErrorCode::RpcInvalidResponse, format!("Bad hash: {hex}")))
}

fn parse_bytes(hex: &str) -> AppResult<Bytes> {
    Bytes::from_str(hex)
        .map_err(|_| AppError::new(ErrorCode::RpcInvalidResponse, format!("Bad bytes: {hex}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0xff").unwrap(), 255);
        assert!(parse_quantity("latest").is_err());
    }

    #[test]
    fn test_address_params_serialize_as_hex_strings() {
        let addr = Address::repeat_byte(0xab);
        let params = serde_json::json!([addr, BlockTag::Latest.as_param()]);
        assert_eq!(params[0], "0xabababababababababababababababababababab");
        assert_eq!(params[1], "latest");
    }

    #[test]
    fn test_masked_url_hides_key() {
        let client = RpcClient::new("https://eth-mainnet.g.alchemy.com/v2/secret-key").unwrap();
        assert_eq!(
            client.masked_url(),
            "https://eth-mainnet.g.alchemy.com/v2/***HIDDEN***"
        );
    }

    #[test]
    fn test_rate_limit_detection() {
        let err = RpcErrorBody {
            code: -32005,
            message: "capacity exceeded".to_string(),
        };
        assert!(err.is_rate_limit());
        let err = RpcErrorBody {
            code: -32000,
            message: "Rate limit reached".to_string(),
        };
        assert!(err.is_rate_limit());
    }
}
