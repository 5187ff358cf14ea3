//! One-shot compile command.
//!
//! Runs the same pipeline as the HTTP service against a ZIP on disk and
//! writes the result bundle next to it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pbic_core::{ToolConfig, compile_archive};
use pbic_server::bundle;

pub async fn execute(
    archive: &Path,
    output: Option<&Path>,
    name: Option<&str>,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    if !archive.exists() {
        anyhow::bail!("Archive not found: {}", archive.display());
    }
    let bytes = tokio::fs::read(archive).await?;

    let mut config = ToolConfig::from_env();
    if let Some(secs) = timeout {
        config.timeout = Duration::from_secs(secs);
    }

    let result = compile_archive(&bytes, &config).await?;

    let res_name = name
        .map(str::to_string)
        .or_else(|| {
            archive
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "result".to_string());

    let body = bundle::build_result_zip(
        result.artifact.as_ref(),
        result.bundle.as_deref(),
        result.logs.as_deref(),
        &res_name,
    )?;

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{res_name}.zip")));
    tokio::fs::write(&out_path, &body).await?;

    match &result.artifact {
        Some(artifact) => println!(
            "Compiled {} ({} bytes) -> {}",
            artifact.file_name,
            artifact.bytes.len(),
            out_path.display()
        ),
        None => {
            println!(
                "Compilation produced no artifact; see {} for details",
                out_path.display()
            );
            if let Some(logs) = &result.logs {
                eprintln!("{logs}");
            }
        }
    }

    Ok(())
}
