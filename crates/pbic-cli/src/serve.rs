//! Serve command implementation.

use std::path::PathBuf;

use pbic_server::ServerConfig;

/// Start the HTTP compile service.
pub async fn execute(host: String, port: Option<u16>, demo_dir: PathBuf) -> anyhow::Result<()> {
    let port = port
        .or_else(|| {
            std::env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
        })
        .unwrap_or(8080);

    let config = ServerConfig {
        host,
        port,
        demo_dir,
    };

    pbic_server::serve(config).await?;

    Ok(())
}
