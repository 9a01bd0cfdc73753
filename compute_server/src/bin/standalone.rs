use anyhow::Context;
use compute_server::{ServerConfig, start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Bind address, pool size, timeout and limits all come from CE_* variables.
    let cfg = ServerConfig::from_env().context("reading CE_* configuration")?;

    let server = start_server(cfg).await?;
    server.handle.await.context("server task failed")?;
    Ok(())
}
