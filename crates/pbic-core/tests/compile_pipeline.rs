//! End-to-end pipeline tests driven by fake compiler executables.
//!
//! Each test points the executable override at a small shell script that
//! plays the role of pbi-tools, so the full extract/locate/invoke/repack
//! path runs without the real tool installed.

#![cfg(unix)]

use std::fs;
use std::io::Cursor;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::{Duration, Instant};

use pbic_core::{Error, ToolConfig, compile_archive};
use tempfile::TempDir;
use zip::ZipArchive;

/// Write an executable shell script and return its absolute path.
fn write_tool(dir: &Path, body: &str) -> String {
    let path = dir.join("fake-pbi-tools");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write tool");
    let mut perms = fs::metadata(&path)
        .expect("Failed to stat tool")
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("Failed to chmod tool");
    path.to_string_lossy().into_owned()
}

/// Zip a minimal project tree whose root directly holds a `Model` folder.
fn project_zip() -> Vec<u8> {
    let tree = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(tree.path().join("Model")).expect("Failed to create dir");
    fs::write(tree.path().join("Model").join("database.json"), b"{}").expect("Failed to write");
    pbic_core::archive::pack_dir(tree.path()).expect("Failed to pack")
}

fn config_with(tool: String, timeout: Duration) -> ToolConfig {
    ToolConfig {
        install_dir: None,
        executable_override: Some(tool),
        timeout,
    }
}

#[tokio::test]
async fn compiler_writing_output_yields_the_artifact() {
    let tools = TempDir::new().expect("Failed to create temp dir");
    // Arguments arrive as: compile -folder <dir> -format PBIT -overwrite
    // -outPath <name>, with the working directory set to <dir>.
    let tool = write_tool(tools.path(), "echo compiling\nprintf 'PBIT-BYTES' > \"$8\"");

    let result = compile_archive(&project_zip(), &config_with(tool, Duration::from_secs(30)))
        .await
        .expect("pipeline failed");

    let artifact = result.artifact.expect("expected an artifact");
    assert_eq!(artifact.bytes, b"PBIT-BYTES");
    assert!(artifact.file_name.ends_with(".pbit"));
    assert!(result.logs.expect("expected logs").contains("compiling"));

    // The source bundle reproduces the uploaded tree.
    let bundle = result.bundle.expect("expected a bundle");
    let mut archive = ZipArchive::new(Cursor::new(bundle)).expect("bundle is not a zip");
    assert!(archive.by_name("Model/database.json").is_ok());
}

#[tokio::test]
async fn failing_compiler_yields_logs_but_no_artifact() {
    let tools = TempDir::new().expect("Failed to create temp dir");
    let tool = write_tool(tools.path(), "echo boom >&2\nexit 3");

    let result = compile_archive(&project_zip(), &config_with(tool, Duration::from_secs(30)))
        .await
        .expect("pipeline failed");

    assert!(result.artifact.is_none());
    assert!(result.bundle.is_some());
    assert!(result.logs.expect("expected logs").contains("boom"));
}

#[tokio::test]
async fn hung_compiler_is_killed_at_the_timeout() {
    let tools = TempDir::new().expect("Failed to create temp dir");
    let tool = write_tool(tools.path(), "sleep 30");

    let started = Instant::now();
    let result = compile_archive(&project_zip(), &config_with(tool, Duration::from_secs(1)))
        .await
        .expect("pipeline failed");
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(10),
        "timeout took {elapsed:?}, expected a bounded margin over 1s"
    );
    assert!(result.artifact.is_none());
    assert!(result.logs.expect("expected logs").contains("TIMEOUT"));
}

#[tokio::test]
async fn missing_executable_is_a_soft_failure() {
    let tools = TempDir::new().expect("Failed to create temp dir");
    let tool = tools
        .path()
        .join("does-not-exist")
        .to_string_lossy()
        .into_owned();

    let result = compile_archive(&project_zip(), &config_with(tool, Duration::from_secs(5)))
        .await
        .expect("pipeline failed");

    assert!(result.artifact.is_none());
    assert!(result.bundle.is_some());
    assert!(!result.logs.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn archive_without_layout_still_returns_the_bundle() {
    let bytes =
        pbic_core::archive::pack_entry("readme.txt", b"nothing to compile").expect("pack failed");

    let result = compile_archive(&bytes, &ToolConfig::default())
        .await
        .expect("pipeline failed");

    assert!(result.artifact.is_none());
    let bundle = result.bundle.expect("expected a bundle");
    let mut archive = ZipArchive::new(Cursor::new(bundle)).expect("bundle is not a zip");
    assert!(archive.by_name("readme.txt").is_ok());
    assert!(
        result
            .logs
            .expect("expected logs")
            .contains("No suitable project directory")
    );
}

#[tokio::test]
async fn garbage_input_is_a_hard_error() {
    let result = compile_archive(b"not a zip at all", &ToolConfig::default()).await;
    assert!(matches!(result, Err(Error::InvalidArchive(_))));
}
