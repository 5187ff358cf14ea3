//! Boot-time diagnostics.
//!
//! Logs the effective environment configuration once at startup so
//! container deployments are debuggable from the log stream alone. Purely
//! informational; the compilation core never depends on anything here.

use pbic_core::{ToolConfig, resolver};

use crate::ServerConfig;

/// Dump the startup configuration to the log.
pub fn log_startup(server: &ServerConfig, tool: &ToolConfig) {
    tracing::info!("pbic compile service starting up");
    tracing::info!("listen address: {}:{}", server.host, server.port);
    tracing::info!("demo directory: {}", server.demo_dir.display());
    tracing::info!("compile timeout: {}s", tool.timeout.as_secs());

    match &tool.executable_override {
        Some(exe) => tracing::info!("executable override: {exe}"),
        None => tracing::info!("executable override: not set"),
    }

    match &tool.install_dir {
        Some(dir) => {
            tracing::info!("tool install path: {}", dir.display());
            match std::fs::read_dir(dir) {
                Ok(entries) => {
                    let names: Vec<String> = entries
                        .filter_map(|entry| entry.ok())
                        .map(|entry| entry.file_name().to_string_lossy().into_owned())
                        .collect();
                    tracing::info!("tool install dir contents: {names:?}");
                }
                Err(err) => tracing::warn!("tool install dir not readable: {err}"),
            }
        }
        None => tracing::info!("tool install path: not set"),
    }

    for candidate in resolver::candidates(tool.executable_override.as_deref()) {
        match which::which(&candidate) {
            Ok(path) => tracing::info!("candidate `{candidate}` resolves to {}", path.display()),
            Err(_) => tracing::debug!("candidate `{candidate}` not found on PATH"),
        }
    }

    tracing::info!("startup complete");
}
