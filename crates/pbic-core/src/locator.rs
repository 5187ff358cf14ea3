//! Project directory resolution inside an extracted archive.
//!
//! Uploaded archives arrive in a handful of shapes: the project at the
//! archive root, the project under a `pbit/` folder, or everything nested
//! one directory down (the usual result of zipping a folder instead of its
//! contents). [`locate`] probes these shapes in a fixed order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Marker folders whose presence signals a compilable project.
pub const MARKER_FOLDERS: [&str; 2] = ["Model", "Report"];

/// Conventional folder holding the source layout in nested project trees.
pub const LAYOUT_FOLDER: &str = "pbit";

/// File extension of the compiled artifact.
pub const ARTIFACT_EXTENSION: &str = "pbit";

/// A resolved project location inside an extracted archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLocation {
    /// Root of the project tree.
    pub project_root: PathBuf,

    /// Folder expected to directly contain the marker subfolders; this is
    /// the directory the compiler is invoked against.
    pub layout_dir: PathBuf,
}

impl ProjectLocation {
    fn new(project_root: impl Into<PathBuf>, layout_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            layout_dir: layout_dir.into(),
        }
    }

    /// Artifact file name for this location: the layout directory's stem
    /// plus the `.pbit` extension.
    pub fn output_file_name(&self) -> String {
        let stem = self
            .layout_dir
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        format!("{stem}.{ARTIFACT_EXTENSION}")
    }
}

/// Check whether a directory directly contains one of the marker folders.
fn has_source_layout(dir: &Path) -> bool {
    MARKER_FOLDERS
        .iter()
        .any(|marker| dir.join(marker).exists())
}

/// Resolve the compilable project folder under `extracted_root`.
///
/// Strategies, first match wins:
/// 1. The root itself holds the markers.
/// 2. A `pbit` child of the root that itself holds the markers. A bare
///    `pbit` folder without markers is not accepted.
/// 3. The first immediate subdirectory (listing order) that either holds
///    the markers itself or has a `pbit` child that does.
/// 4. When subdirectories exist but none qualify, the first one is taken
///    as the project root with its `pbit` child assumed, unverified, to be
///    the layout directory.
///
/// Returns `None` when the root has no subdirectories and no markers.
pub fn locate(extracted_root: &Path) -> Result<Option<ProjectLocation>> {
    if has_source_layout(extracted_root) {
        return Ok(Some(ProjectLocation::new(extracted_root, extracted_root)));
    }

    let pbit = extracted_root.join(LAYOUT_FOLDER);
    if pbit.is_dir() && has_source_layout(&pbit) {
        return Ok(Some(ProjectLocation::new(extracted_root, pbit)));
    }

    let mut subdirs: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(extracted_root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            subdirs.push(entry.path());
        }
    }

    for dir in &subdirs {
        if has_source_layout(dir) {
            return Ok(Some(ProjectLocation::new(dir, dir)));
        }
        let pbit = dir.join(LAYOUT_FOLDER);
        if pbit.is_dir() && has_source_layout(&pbit) {
            return Ok(Some(ProjectLocation::new(dir, pbit)));
        }
    }

    if let Some(first) = subdirs.first() {
        tracing::debug!(
            dir = %first.display(),
            "no directory passed the structural check, falling back to the first subdirectory"
        );
        return Ok(Some(ProjectLocation::new(
            first,
            first.join(LAYOUT_FOLDER),
        )));
    }

    Ok(None)
}
