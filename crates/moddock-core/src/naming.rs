//! Filesystem-safe module and upload names.
//!
//! Module names double as directory names under the registry and store
//! roots, so every name that reaches the filesystem goes through
//! [`secure_name`] first.

use crate::config::UploadConfig;
use crate::{ModdockError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Reserved device names on Windows.
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters other than ASCII alphanumerics, `_`, `.` and `-`.
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("valid regex"));

/// Reduce `name` to a safe single path component.
///
/// # Rules Applied
/// 1. Drop non-ASCII characters
/// 2. Turn path separators into spaces
/// 3. Join whitespace-separated words with `_`
/// 4. Drop everything outside `[A-Za-z0-9_.-]`
/// 5. Trim leading/trailing `.` and `_`
/// 6. Prefix Windows device names with `_`
/// 7. Truncate to the maximum name length, then trim trailing `.` and `_`
///    again
///
/// Applying it twice gives the same result as applying it once.
/// The result may be empty; callers decide whether that is an error.
///
/// # Examples
///
/// ```
/// use moddock_core::naming::secure_name;
///
/// assert_eq!(secure_name("My Module v2.zip"), "My_Module_v2.zip");
/// assert_eq!(secure_name("../../etc/passwd"), "etc_passwd");
/// ```
pub fn secure_name(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(|c| c.is_ascii())
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_CHARS.replace_all(&joined, "");
    let mut result = stripped.trim_matches(|c| c == '.' || c == '_').to_string();

    let stem = result.split('.').next().unwrap_or("").to_uppercase();
    if WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
        result = format!("_{}", result);
    }

    if result.len() > UploadConfig::MAX_NAME_LENGTH {
        result.truncate(UploadConfig::MAX_NAME_LENGTH);
        let kept = result.trim_end_matches(|c| c == '.' || c == '_').len();
        result.truncate(kept);
    }

    result
}

/// Pick the module name for an upload.
///
/// A non-empty `requested` name wins; otherwise the sanitized upload
/// filename without its last extension is used.
pub fn derive_module_name(filename: &str, requested: Option<&str>) -> Result<String> {
    let raw = match requested.map(str::trim) {
        Some(requested) if !requested.is_empty() => requested.to_string(),
        _ => {
            let secured = secure_name(filename);
            match secured.rsplit_once('.') {
                Some((stem, _)) => stem.to_string(),
                None => secured,
            }
        }
    };

    let name = secure_name(&raw);
    if name.is_empty() {
        return Err(ModdockError::InvalidModuleName { name: raw });
    }
    Ok(name)
}

/// Accept `name` only if it is already in sanitized form.
///
/// Used for names that arrive on request paths, where silently rewriting
/// the name would address a different module.
pub fn validate_module_name(name: &str) -> Result<&str> {
    if name.is_empty() || secure_name(name) != name {
        return Err(ModdockError::InvalidModuleName {
            name: name.to_string(),
        });
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_name_basic() {
        assert_eq!(secure_name("sample.zip"), "sample.zip");
        assert_eq!(secure_name("  spaced   out  "), "spaced_out");
        assert_eq!(secure_name("weird$chars&here!"), "weirdcharshere");
        assert_eq!(secure_name("Ünïcode-name"), "ncode-name");
    }

    #[test]
    fn test_secure_name_strips_traversal() {
        assert_eq!(secure_name("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_name("..\\windows\\system32"), "windows_system32");
        assert_eq!(secure_name(".."), "");
        assert_eq!(secure_name(".hidden"), "hidden");
    }

    #[test]
    fn test_secure_name_device_names() {
        assert_eq!(secure_name("con"), "_con");
        assert_eq!(secure_name("NUL.txt"), "_NUL.txt");
        assert_eq!(secure_name("console"), "console");
    }

    #[test]
    fn test_secure_name_truncates() {
        let long = "a".repeat(300);
        assert_eq!(secure_name(&long).len(), UploadConfig::MAX_NAME_LENGTH);
    }

    #[test]
    fn test_secure_name_is_idempotent() {
        let cut_at_dot = format!("{}.bbb", "a".repeat(127));
        let cut_at_underscore = format!("{}_tail", "b".repeat(127));
        let device = format!("con.{}", "c".repeat(200));

        for raw in [cut_at_dot.as_str(), cut_at_underscore.as_str(), device.as_str()] {
            let once = secure_name(raw);
            assert!(!once.ends_with('.') && !once.ends_with('_'), "{once}");
            assert_eq!(secure_name(&once), once);
            assert!(validate_module_name(&once).is_ok());
        }
        assert_eq!(secure_name(&cut_at_dot), "a".repeat(127));
    }

    #[test]
    fn test_derive_from_filename() {
        assert_eq!(derive_module_name("sample.zip", None).unwrap(), "sample");
        assert_eq!(derive_module_name("sample.zip", Some("")).unwrap(), "sample");
        assert_eq!(
            derive_module_name("my project.v1.zip", None).unwrap(),
            "my_project.v1"
        );
    }

    #[test]
    fn test_derive_prefers_requested_name() {
        assert_eq!(
            derive_module_name("sample.zip", Some("Chat Bot")).unwrap(),
            "Chat_Bot"
        );
    }

    #[test]
    fn test_derive_rejects_empty() {
        assert!(matches!(
            derive_module_name("sample.zip", Some("../..")),
            Err(ModdockError::InvalidModuleName { .. })
        ));
        assert!(derive_module_name("???", None).is_err());
    }

    #[test]
    fn test_validate_module_name() {
        assert_eq!(validate_module_name("sample").unwrap(), "sample");
        assert!(validate_module_name("").is_err());
        assert!(validate_module_name("..").is_err());
        assert!(validate_module_name("a/b").is_err());
        assert!(validate_module_name(".staging").is_err());
    }
}
