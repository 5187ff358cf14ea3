//! In-memory ZIP packing and extraction.

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

fn write_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Build a deflate-compressed ZIP of everything under `dir`.
///
/// Entry names are relative to `dir`, so extracting the result reproduces
/// the tree as it was. Directory entries are written too, which keeps
/// empty folders through a round trip.
pub fn pack_dir(dir: &Path) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = write_options();

    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(|err| Error::ArchiveWrite(err.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|err| Error::ArchiveWrite(err.to_string()))?;
        let name = relative.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|err| Error::ArchiveWrite(err.to_string()))?;
        } else {
            writer
                .start_file(name, options)
                .map_err(|err| Error::ArchiveWrite(err.to_string()))?;
            let mut file = File::open(entry.path())?;
            std::io::copy(&mut file, &mut writer)?;
        }
    }

    let cursor = writer
        .finish()
        .map_err(|err| Error::ArchiveWrite(err.to_string()))?;
    Ok(cursor.into_inner())
}

/// Extract a ZIP held in memory into `dest`.
///
/// Returns [`Error::InvalidArchive`] when the bytes do not parse as a ZIP.
pub fn extract(bytes: &[u8], dest: &Path) -> Result<()> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|err| Error::InvalidArchive(err.to_string()))?;
    archive
        .extract(dest)
        .map_err(|err| Error::InvalidArchive(err.to_string()))?;
    Ok(())
}

/// Write a single named entry into a fresh in-memory ZIP.
///
/// Convenience for tests and callers that need a minimal archive.
pub fn pack_entry(name: &str, bytes: &[u8]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, write_options())
        .map_err(|err| Error::ArchiveWrite(err.to_string()))?;
    writer.write_all(bytes)?;
    let cursor = writer
        .finish()
        .map_err(|err| Error::ArchiveWrite(err.to_string()))?;
    Ok(cursor.into_inner())
}
