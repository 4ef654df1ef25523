//! Pipeline name generation
//!
//! The target orchestration service requires globally unique pipeline names
//! of limited length and character set. Generated names combine a sanitized
//! base, the version, and a short random suffix, so the same inputs yield
//! different names run-to-run unless the caller supplies a name.

use rand::Rng;

/// Maximum accepted pipeline-name length
pub const PIPELINE_NAME_MAX_LEN: usize = 82;

const SUFFIX_LEN: usize = 4;

/// Whether a name satisfies the orchestration service's rules:
/// alphanumeric plus hyphens, starting alphanumeric, bounded length
pub fn validate_pipeline_name(name: &str) -> bool {
    if name.is_empty() || name.len() > PIPELINE_NAME_MAX_LEN {
        return false;
    }
    let mut chars = name.chars();
    let first = chars.next().expect("non-empty");
    first.is_ascii_alphanumeric()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Coerce an arbitrary base string into a valid name fragment
pub fn sanitize_pipeline_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            sanitized.push(c);
        } else if matches!(c, '_' | '.' | '-' | ' ') && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }
    let sanitized = sanitized.trim_matches('-').to_string();
    sanitized.chars().take(PIPELINE_NAME_MAX_LEN).collect()
}

/// A short lowercase word used to keep generated names unique
pub fn generate_random_word(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

/// Build a unique pipeline name from a base name and version
pub fn generate_pipeline_name(base: &str, version: &str) -> String {
    let base = sanitize_pipeline_name(base);
    let version = sanitize_pipeline_name(version);
    let suffix = generate_random_word(SUFFIX_LEN);

    // Leave room for the version, suffix and separators
    let reserved = version.len() + SUFFIX_LEN + 2;
    let base_budget = PIPELINE_NAME_MAX_LEN.saturating_sub(reserved);
    let base: String = base.chars().take(base_budget).collect();
    let base = base.trim_matches('-');

    format!("{}-{}-{}", base, version, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rules() {
        assert!(validate_pipeline_name("fraud-model-1-0-abcd"));
        assert!(validate_pipeline_name("a"));
        assert!(!validate_pipeline_name(""));
        assert!(!validate_pipeline_name("-leading-hyphen"));
        assert!(!validate_pipeline_name("has_underscore"));
        assert!(!validate_pipeline_name(&"x".repeat(PIPELINE_NAME_MAX_LEN + 1)));
    }

    #[test]
    fn test_sanitize_examples() {
        assert_eq!(sanitize_pipeline_name("Fraud_Model.v2"), "fraud-model-v2");
        assert_eq!(sanitize_pipeline_name("__weird__name__"), "weird-name");
        assert_eq!(sanitize_pipeline_name("already-clean"), "already-clean");
        assert_eq!(sanitize_pipeline_name("spaces  here"), "spaces-here");
    }

    #[test]
    fn test_generated_name_is_valid_and_varies() {
        let a = generate_pipeline_name("Fraud_Model", "1.0");
        let b = generate_pipeline_name("Fraud_Model", "1.0");

        assert!(validate_pipeline_name(&a), "invalid generated name {}", a);
        assert!(a.starts_with("fraud-model-1-0-"));
        // Same base inputs differ only in the random suffix
        assert_eq!(a[..a.len() - SUFFIX_LEN], b[..b.len() - SUFFIX_LEN]);
    }

    #[test]
    fn test_long_base_is_truncated() {
        let base = "x".repeat(200);
        let name = generate_pipeline_name(&base, "1.0");
        assert!(name.len() <= PIPELINE_NAME_MAX_LEN);
        assert!(validate_pipeline_name(&name));
    }

    #[test]
    fn test_random_word_shape() {
        let word = generate_random_word(4);
        assert_eq!(word.len(), 4);
        assert!(word.chars().all(|c| c.is_ascii_lowercase()));
    }
}
