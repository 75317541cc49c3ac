/**
 * @file main.rs
 * @author Nguyen Le Duy
 * @date 09/04/2025
 * @brief Main entry point for the server.
 */
use std::net;
use std::sync::Arc;
use tokio::fs;
use warp::Filter;

mod analyzer;
mod board;
mod compile;
mod config;
mod diagnostics;
mod remote;
mod routes;

use compile::Dispatcher;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();

    let config = config::ServerConfig::parse(CONFIG_PATH)?;
    log::info!("Config: {:?}", config);

    match config.compile_service_url.as_deref() {
        Some(url) => log::info!("Forwarding compile requests to {}", url),
        None => log::warn!(
            "Compile service not configured, set {} to enable compilation",
            config::SERVICE_URL_ENV
        ),
    }

    let ip_address: net::IpAddr = config.ip.parse()?;
    let dispatcher = Arc::new(Dispatcher::from_config(&config));
    log::info!("Using {} compiler backend", dispatcher.backend().name());

    let api = routes::api(dispatcher, config.max_body_bytes);
    let logger = warp::log("sketch_server");

    // Serve the site's static files alongside the API when configured
    match config.static_dir.as_deref() {
        Some(static_dir) => {
            let dir = fs::canonicalize(static_dir).await?;
            let index = warp::path::end().and(warp::fs::file(dir.join("index.html")));
            let static_files = warp::fs::dir(dir);
            let routes = api.or(index).or(static_files).with(logger);

            warp::serve(routes).run((ip_address, config.port)).await;
        }
        None => {
            warp::serve(api.with(logger))
                .run((ip_address, config.port))
                .await;
        }
    }

    Ok(())
}
