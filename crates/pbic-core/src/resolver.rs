//! Candidate resolution for the external compiler executable.

/// Conventional name of the cross-platform (.NET Core) build of pbi-tools.
pub const PRIMARY_EXECUTABLE: &str = "pbi-tools.core";

/// Conventional name of the full-framework build of pbi-tools.
pub const SECONDARY_EXECUTABLE: &str = "pbi-tools";

/// Ordered, deduplicated candidate executable names.
///
/// The configured override (when present) is tried first, followed by the
/// conventional names. On Windows every candidate that lacks an `.exe`
/// suffix gets one appended. Deduplication preserves first-seen order, so
/// an override equal to a default name appears once.
pub fn candidates(executable_override: Option<&str>) -> Vec<String> {
    candidates_for(executable_override, cfg!(windows))
}

fn candidates_for(executable_override: Option<&str>, windows: bool) -> Vec<String> {
    let mut raw: Vec<String> = Vec::new();
    if let Some(exe) = executable_override {
        raw.push(exe.to_string());
    }
    raw.push(PRIMARY_EXECUTABLE.to_string());
    raw.push(SECONDARY_EXECUTABLE.to_string());

    if windows {
        for name in &mut raw {
            if !name.ends_with(".exe") {
                name.push_str(".exe");
            }
        }
    }

    let mut unique = Vec::with_capacity(raw.len());
    for name in raw {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_override() {
        assert_eq!(
            candidates_for(None, false),
            vec!["pbi-tools.core".to_string(), "pbi-tools".to_string()]
        );
    }

    #[test]
    fn test_override_comes_first() {
        assert_eq!(
            candidates_for(Some("foo"), false),
            vec![
                "foo".to_string(),
                "pbi-tools.core".to_string(),
                "pbi-tools".to_string()
            ]
        );
    }

    #[test]
    fn test_override_matching_default_is_deduplicated() {
        assert_eq!(
            candidates_for(Some("pbi-tools"), false),
            vec!["pbi-tools".to_string(), "pbi-tools.core".to_string()]
        );
    }

    #[test]
    fn test_windows_appends_exe_suffix() {
        assert_eq!(
            candidates_for(Some("foo"), true),
            vec![
                "foo.exe".to_string(),
                "pbi-tools.core.exe".to_string(),
                "pbi-tools.exe".to_string()
            ]
        );
    }

    #[test]
    fn test_windows_keeps_existing_exe_suffix() {
        let names = candidates_for(Some("custom.exe"), true);
        assert_eq!(names[0], "custom.exe");
    }
}
