//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::config::Config;
use anyhow::{Context, Result};
use ldlmt_core::AdmissionGate;
use std::sync::Arc;

/// Initialize the entire application
pub fn initialize_app(config: &Config) -> Result<(Arc<AdmissionGate>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    ldlmt_infra::init_telemetry("ldlmt=debug,tower_http=debug", config.json_logs())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    // One gate shared by every protected route
    let gate = Arc::new(AdmissionGate::from_config(config.gate().clone()));
    let router = routes::setup_routes(&gate);

    Ok((gate, router))
}
