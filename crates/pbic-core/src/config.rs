//! Compiler configuration sourced from the environment.
//!
//! All environment access happens here; the rest of the core takes a
//! [`ToolConfig`] value so tests can construct configurations directly.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the pbi-tools installation directory.
///
/// When set, the directory is prepended to the subprocess's `PATH` and
/// `LD_LIBRARY_PATH`.
pub const TOOL_INSTALL_PATH: &str = "TOOL_INSTALL_PATH";

/// Environment variable overriding the first executable candidate.
pub const TOOL_EXECUTABLE_OVERRIDE: &str = "TOOL_EXECUTABLE_OVERRIDE";

/// Environment variable holding the per-compile timeout in seconds.
pub const WORK_TIMEOUT_SECONDS: &str = "WORK_TIMEOUT_SECONDS";

/// Default per-compile timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for locating and running the external compiler.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Directory prepended to the executable and native-library search
    /// paths of the compiler subprocess.
    pub install_dir: Option<PathBuf>,

    /// Explicit executable name tried before the conventional ones.
    pub executable_override: Option<String>,

    /// Hard limit on a single compiler run.
    pub timeout: Duration,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            install_dir: None,
            executable_override: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ToolConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            install_dir: env::var_os(TOOL_INSTALL_PATH).map(PathBuf::from),
            executable_override: env::var(TOOL_EXECUTABLE_OVERRIDE)
                .ok()
                .filter(|value| !value.is_empty()),
            timeout: parse_timeout(env::var(WORK_TIMEOUT_SECONDS).ok()),
        }
    }
}

/// Parse a timeout value in seconds, falling back to the default when the
/// variable is unset or unparseable.
fn parse_timeout(raw: Option<String>) -> Duration {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        assert_eq!(ToolConfig::default().timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout(None), DEFAULT_TIMEOUT);
        assert_eq!(
            parse_timeout(Some("30".to_string())),
            Duration::from_secs(30)
        );
        assert_eq!(parse_timeout(Some(" 45 ".to_string())), Duration::from_secs(45));
        assert_eq!(parse_timeout(Some("not-a-number".to_string())), DEFAULT_TIMEOUT);
        assert_eq!(parse_timeout(Some("-5".to_string())), DEFAULT_TIMEOUT);
    }
}
