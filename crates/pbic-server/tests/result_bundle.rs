//! Tests for response-bundle assembly.

use std::io::{Cursor, Read};

use pbic_core::CompiledArtifact;
use pbic_server::bundle::{
    EXTRACTED_PATH, LOG_PATH, MANIFEST_PATH, ResultManifest, build_result_zip,
};
use zip::ZipArchive;

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut entry = archive.by_name(name).expect("missing entry");
    let mut content = Vec::new();
    entry.read_to_end(&mut content).expect("Failed to read");
    content
}

#[test]
fn successful_result_includes_all_parts() {
    let artifact = CompiledArtifact {
        file_name: "sales.pbit".to_string(),
        bytes: b"PBIT".to_vec(),
    };
    let bytes = build_result_zip(
        Some(&artifact),
        Some(b"SOURCES"),
        Some("all good"),
        "sales",
    )
    .expect("Failed to build bundle");

    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("not a zip");

    let manifest: ResultManifest =
        serde_json::from_slice(&read_entry(&mut archive, MANIFEST_PATH)).expect("bad manifest");
    assert!(manifest.compilation_successful);
    assert!(manifest.compiled_file_included);
    assert!(manifest.source_files_included);
    assert_eq!(manifest.output_name, "sales");

    assert_eq!(read_entry(&mut archive, "compiled/sales.pbit"), b"PBIT");
    assert_eq!(read_entry(&mut archive, EXTRACTED_PATH), b"SOURCES");
    assert_eq!(read_entry(&mut archive, LOG_PATH), b"all good");
}

#[test]
fn failed_result_omits_the_compiled_entry() {
    let bytes = build_result_zip(None, Some(b"SOURCES"), Some("it broke"), "report")
        .expect("Failed to build bundle");

    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("not a zip");

    let manifest: ResultManifest =
        serde_json::from_slice(&read_entry(&mut archive, MANIFEST_PATH)).expect("bad manifest");
    assert!(!manifest.compilation_successful);
    assert!(!manifest.compiled_file_included);
    assert!(manifest.source_files_included);

    assert!(archive.by_name("compiled/report.pbit").is_err());
}

#[test]
fn opting_out_of_sources_is_reflected_in_the_manifest() {
    let bytes =
        build_result_zip(None, None, Some("logs only"), "report").expect("Failed to build bundle");

    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("not a zip");

    let manifest: ResultManifest =
        serde_json::from_slice(&read_entry(&mut archive, MANIFEST_PATH)).expect("bad manifest");
    assert!(!manifest.source_files_included);
    assert!(archive.by_name(EXTRACTED_PATH).is_err());
}
