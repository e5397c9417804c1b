//! Rugwatch - soft-rug-pull transaction monitor
//!
//! Polls new blocks, fans each transaction out to the detection rules
//! and logs every finding as a JSON record.

use rugwatch::{AgentConfig, BlockStream, RpcClient, RugPullAgent};

use eyre::Result;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    info!("🚀 Rugwatch starting");

    if std::env::var("RUGWATCH_HTTP_URL").is_err() {
        warn!("RUGWATCH_HTTP_URL not set, falling back to the default placeholder endpoint");
    }

    let config = AgentConfig::default();
    let client = Arc::new(RpcClient::new(config.http_url.clone())?);
    info!(rpc = client.masked_url(), "🔌 RPC client ready");

    let agent = RugPullAgent::initialize(client.clone(), &config).await?;
    let stream = BlockStream::new(client);

    let poll_loop = async {
        let mut ticker = tokio::time::interval(config.poll_interval);
        loop {
            ticker.tick().await;
            let txs = match stream.poll_once().await {
                Ok(txs) => txs,
                Err(e) => {
                    warn!(code = e.code_str(), "⚠️ Block poll failed: {e}");
                    continue;
                }
            };
            for tx in &txs {
                for finding in agent.handle_transaction(tx).await {
                    match serde_json::to_string(&finding) {
                        Ok(json) => info!(alert_id = %finding.alert_id, "🚨 {json}"),
                        Err(e) => error!("Failed to serialize finding: {e}"),
                    }
                }
            }
        }
    };

    tokio::select! {
        _ = poll_loop => {}
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutting down");
            agent.stats.report();
            info!(
                findings_emitted = agent.limiter().count(),
                last_block = stream.last_block(),
                "Final state"
            );
        }
    }

    Ok(())
}
