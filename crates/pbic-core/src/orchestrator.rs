//! End-to-end compilation pipeline: extract, locate, invoke, repack.

use tempfile::TempDir;

use crate::archive;
use crate::config::ToolConfig;
use crate::error::Result;
use crate::invoker;
use crate::locator;

/// Message returned when no directory in the archive passes the layout check.
const NO_LAYOUT_MESSAGE: &str =
    "No suitable project directory found in ZIP (missing 'Model' or 'Report' folders).";

/// A compiled artifact read back from the tool's output file.
#[derive(Debug, Clone)]
pub struct CompiledArtifact {
    /// File name the tool wrote, `<layout stem>.pbit`.
    pub file_name: String,

    /// Raw artifact bytes.
    pub bytes: Vec<u8>,
}

/// Outcome of one compilation request.
///
/// The artifact is present only when the tool wrote its output file. The
/// bundle is present whenever extraction succeeded, regardless of compile
/// outcome, so callers always get back what they uploaded. The logs carry
/// the tool's console output or a description of why nothing ran.
#[derive(Debug)]
pub struct CompilationResult {
    pub artifact: Option<CompiledArtifact>,
    pub bundle: Option<Vec<u8>>,
    pub logs: Option<String>,
}

/// Compile a project archive end to end.
///
/// The archive is extracted into a scoped temporary directory, the project
/// folder is located, the external compiler is invoked against it, and the
/// whole extraction root is re-zipped as the source bundle. The temporary
/// directory is removed on every exit path, including errors.
///
/// # Errors
///
/// Only unparseable input ([`crate::Error::InvalidArchive`]) and filesystem
/// faults surface as errors. Compile-level failures are reported through
/// the returned result's logs.
pub async fn compile_archive(
    archive_bytes: &[u8],
    config: &ToolConfig,
) -> Result<CompilationResult> {
    let workdir = TempDir::new()?;
    archive::extract(archive_bytes, workdir.path())?;

    let location = match locator::locate(workdir.path())? {
        Some(location) => location,
        None => {
            tracing::info!("no source layout found in archive");
            return Ok(CompilationResult {
                artifact: None,
                bundle: Some(archive::pack_dir(workdir.path())?),
                logs: Some(NO_LAYOUT_MESSAGE.to_string()),
            });
        }
    };

    let output_file_name = location.output_file_name();
    tracing::info!(
        layout_dir = %location.layout_dir.display(),
        output = %output_file_name,
        "invoking compiler"
    );
    let invocation = invoker::invoke(&location.layout_dir, &output_file_name, config).await;

    // Repack before checking for the artifact so the caller gets the
    // sources even when the tool failed.
    let bundle = archive::pack_dir(workdir.path())?;

    let artifact_path = location.layout_dir.join(&output_file_name);
    let artifact = if artifact_path.is_file() {
        Some(CompiledArtifact {
            bytes: tokio::fs::read(&artifact_path).await?,
            file_name: output_file_name,
        })
    } else {
        tracing::warn!(exit_code = ?invocation.exit_code, "compiler produced no output file");
        None
    };

    Ok(CompilationResult {
        artifact,
        bundle: Some(bundle),
        logs: Some(invocation.output),
    })
}
