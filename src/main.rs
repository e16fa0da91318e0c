use std::sync::Arc;

use servana_gateway::gateway;
use servana_gateway::modules;

#[tokio::main]
async fn main() -> Result<(), String> {
    modules::logger::init_logger();

    let mut gateway_config = match modules::config::load_gateway_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!("failed to load gateway config: {}. using defaults", err);
            let cfg = gateway::GatewayConfig::default();
            let _ = modules::config::save_gateway_config(&cfg);
            cfg
        }
    };

    if let Ok(value) = std::env::var("GATEWAY_ALLOW_LAN") {
        let enabled = matches!(value.as_str(), "1" | "true" | "yes" | "on");
        if enabled {
            gateway_config.allow_lan_access = true;
        }
    }

    if let Ok(value) = std::env::var("GATEWAY_PORT") {
        match value.parse::<u16>() {
            Ok(port) => gateway_config.port = port,
            Err(_) => tracing::warn!("ignoring invalid GATEWAY_PORT value: {}", value),
        }
    }

    if let Ok(value) = std::env::var("GATEWAY_UPSTREAM_URL") {
        if !value.trim().is_empty() {
            gateway_config.upstream_base_url = value;
        }
    }

    let bind_address = if let Ok(addr) = std::env::var("GATEWAY_BIND") {
        if addr != "127.0.0.1" && addr != "localhost" {
            gateway_config.allow_lan_access = true;
        }
        addr
    } else {
        gateway_config.get_bind_address().to_string()
    };

    let upstream = Arc::new(
        gateway::upstream::UpstreamClient::new(&gateway_config)
            .map_err(|e| format!("failed to create upstream client: {}", e))?,
    );

    let refresh_handle =
        gateway::refresh::spawn_refresh_timer(upstream.clone(), gateway_config.refresh_interval);

    let (server, handle) = gateway::AxumServer::start(
        bind_address.clone(),
        gateway_config.port,
        upstream,
        gateway_config.enable_logging,
    )
    .await
    .map_err(|e| format!("failed to start gateway server: {}", e))?;

    tracing::info!(
        "servana-gateway listening on http://{}:{} -> upstream {}",
        bind_address,
        gateway_config.port,
        gateway_config.upstream_base_url
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {}", e))?;

    tracing::info!("shutdown requested, stopping server...");
    if let Some(task) = refresh_handle {
        task.abort();
    }
    server.stop();
    let _ = handle.await;

    Ok(())
}
