//! External compiler invocation with ordered-candidate fallback.
//!
//! The candidate iteration is a pure loop over [`crate::resolver`]'s list,
//! delegated to a [`ToolLauncher`] so the fallback logic can be tested with
//! fake launchers. The production launcher spawns the compiler with
//! `tokio::process` and kills it on timeout.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::config::ToolConfig;
use crate::resolver;

/// Output format requested from the compiler.
const OUTPUT_FORMAT: &str = "PBIT";

/// Result of one compiler invocation across all candidates.
#[derive(Debug)]
pub struct Invocation {
    /// Combined stdout and stderr of the tool, or a failure description
    /// when no candidate ran to completion.
    pub output: String,

    /// Exit code of the process. `None` on timeout, on termination by
    /// signal, and when no candidate could be started.
    pub exit_code: Option<i32>,
}

/// Outcome of launching a single candidate executable.
#[derive(Debug)]
pub enum LaunchOutcome {
    /// The process started and ran to completion, successfully or not.
    Completed {
        output: String,
        exit_code: Option<i32>,
    },

    /// The process started but exceeded the timeout and was killed.
    TimedOut,

    /// The executable could not be started; the next candidate is tried.
    NotFound(io::Error),
}

/// Launches one candidate executable against a project folder.
#[allow(async_fn_in_trait)]
pub trait ToolLauncher {
    async fn launch(&self, program: &str, dir: &Path, output_file_name: &str) -> LaunchOutcome;
}

/// Run the compiler against `layout_dir`, trying each candidate executable
/// in resolver order.
///
/// A candidate that completes (any exit code) or times out ends the scan
/// immediately; only a candidate that cannot be started falls through to
/// the next one. The output file named `output_file_name` appearing in
/// `layout_dir` is the success signal, not the exit code.
pub async fn invoke(layout_dir: &Path, output_file_name: &str, config: &ToolConfig) -> Invocation {
    let launcher = PbiToolsLauncher { config };
    let names = resolver::candidates(config.executable_override.as_deref());
    run_candidates(&launcher, &names, layout_dir, output_file_name, config.timeout).await
}

/// Candidate iteration, separated from process spawning for testability.
pub async fn run_candidates<L: ToolLauncher>(
    launcher: &L,
    candidates: &[String],
    dir: &Path,
    output_file_name: &str,
    run_timeout: Duration,
) -> Invocation {
    let mut last_missing: Option<io::Error> = None;

    for candidate in candidates {
        match launcher.launch(candidate, dir, output_file_name).await {
            LaunchOutcome::Completed { output, exit_code } => {
                tracing::info!(%candidate, ?exit_code, "compiler run completed");
                return Invocation { output, exit_code };
            }
            LaunchOutcome::TimedOut => {
                tracing::warn!(%candidate, timeout_secs = run_timeout.as_secs(), "compiler run timed out");
                return Invocation {
                    output: format!(
                        "TIMEOUT: `{candidate}` did not finish within {}s",
                        run_timeout.as_secs()
                    ),
                    exit_code: None,
                };
            }
            LaunchOutcome::NotFound(err) => {
                tracing::debug!(%candidate, %err, "candidate could not be started");
                last_missing = Some(err);
            }
        }
    }

    let detail = last_missing
        .map(|err| err.to_string())
        .unwrap_or_else(|| "no candidate executables".to_string());
    Invocation {
        output: format!("EXEC NOT FOUND: {detail}"),
        exit_code: None,
    }
}

/// Production launcher backed by `tokio::process`.
struct PbiToolsLauncher<'a> {
    config: &'a ToolConfig,
}

impl ToolLauncher for PbiToolsLauncher<'_> {
    async fn launch(&self, program: &str, dir: &Path, output_file_name: &str) -> LaunchOutcome {
        let mut command = Command::new(program);
        command
            .arg("compile")
            .arg("-folder")
            .arg(dir)
            .arg("-format")
            .arg(OUTPUT_FORMAT)
            .arg("-overwrite")
            .arg("-outPath")
            .arg(output_file_name)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // The environment is inherited; an install dir only gets prepended
        // to the search paths.
        if let Some(install_dir) = &self.config.install_dir {
            command.env("PATH", prepend_search_path(install_dir, env::var_os("PATH")));
            command.env(
                "LD_LIBRARY_PATH",
                prepend_search_path(install_dir, env::var_os("LD_LIBRARY_PATH")),
            );
        }

        let child = match command.spawn() {
            Ok(child) => child,
            Err(err) => return LaunchOutcome::NotFound(err),
        };

        // kill_on_drop reaps the child when the timeout drops the future.
        match timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => LaunchOutcome::Completed {
                output: combine_output(&output.stdout, &output.stderr),
                exit_code: output.status.code(),
            },
            Ok(Err(err)) => LaunchOutcome::NotFound(err),
            Err(_elapsed) => LaunchOutcome::TimedOut,
        }
    }
}

/// Prepend `install_dir` to a search-path variable, keeping whatever was
/// there before.
fn prepend_search_path(install_dir: &Path, existing: Option<OsString>) -> OsString {
    let mut paths: Vec<PathBuf> = vec![install_dir.to_path_buf()];
    if let Some(existing) = existing {
        paths.extend(env::split_paths(&existing));
    }
    env::join_paths(paths).unwrap_or_else(|_| install_dir.into())
}

/// Concatenate stdout and stderr the way operators read console output:
/// stdout first, stderr appended on its own line when present.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        combined.push('\n');
        combined.push_str(&String::from_utf8_lossy(stderr));
    }
    combined
}
