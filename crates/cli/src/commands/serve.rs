//! `confidant serve` — Start the HTTP gateway.

use crate::runtime;
use confidant_config::AppConfig;
use confidant_gateway::GatewayState;
use std::sync::Arc;

pub async fn run(config: AppConfig, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let service = runtime::build_service(&config).await?;
    let state = Arc::new(GatewayState { service, start_time: chrono::Utc::now() });

    let host = config.gateway.host.clone();
    let port = port.unwrap_or(config.gateway.port);

    confidant_gateway::serve(state, &host, port).await
}
