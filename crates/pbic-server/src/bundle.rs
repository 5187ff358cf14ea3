//! Response bundle assembly.
//!
//! Every response is a ZIP with a status manifest at a fixed path, plus the
//! optional artifact, re-zipped sources and console logs.

use std::io::{Cursor, Write};

use pbic_core::CompiledArtifact;
use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ServerError, ServerResult};

/// Fixed path of the status manifest inside the response ZIP.
pub const MANIFEST_PATH: &str = "compilation-status.json";

/// Path of the console log file inside the response ZIP.
pub const LOG_PATH: &str = "compile-output.txt";

/// Path of the re-zipped source tree inside the response ZIP.
pub const EXTRACTED_PATH: &str = "extracted.zip";

/// Status manifest embedded in every response bundle.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultManifest {
    pub compilation_successful: bool,
    pub compiled_file_included: bool,
    pub source_files_included: bool,
    pub output_name: String,
}

/// Assemble the response ZIP from the pipeline's outputs.
///
/// `name` is the caller-chosen output name; the compiled entry is stored
/// as `compiled/<name>.pbit`. Pass `extracted: None` when the caller opted
/// out of the source bundle, so the manifest reflects what is actually
/// included.
pub fn build_result_zip(
    artifact: Option<&CompiledArtifact>,
    extracted: Option<&[u8]>,
    logs: Option<&str>,
    name: &str,
) -> ServerResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = ResultManifest {
        compilation_successful: artifact.is_some(),
        compiled_file_included: artifact.is_some(),
        source_files_included: extracted.is_some(),
        output_name: name.to_string(),
    };
    writer
        .start_file(MANIFEST_PATH, options)
        .map_err(|err| ServerError::Bundle(err.to_string()))?;
    writer.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

    if let Some(artifact) = artifact {
        writer
            .start_file(format!("compiled/{name}.pbit"), options)
            .map_err(|err| ServerError::Bundle(err.to_string()))?;
        writer.write_all(&artifact.bytes)?;
    }

    if let Some(extracted) = extracted {
        writer
            .start_file(EXTRACTED_PATH, options)
            .map_err(|err| ServerError::Bundle(err.to_string()))?;
        writer.write_all(extracted)?;
    }

    if let Some(logs) = logs {
        writer
            .start_file(LOG_PATH, options)
            .map_err(|err| ServerError::Bundle(err.to_string()))?;
        writer.write_all(logs.as_bytes())?;
    }

    let cursor = writer
        .finish()
        .map_err(|err| ServerError::Bundle(err.to_string()))?;
    Ok(cursor.into_inner())
}
