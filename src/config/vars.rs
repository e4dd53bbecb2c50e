//! Environment variable interpolation for config files.
//!
//! Supports the following syntax:
//! - `$VAR` or `${VAR}` - substitute with env var value, error if missing
//! - `${VAR:-default}` - use default if VAR is unset OR empty
//! - `${VAR-default}` - use default only if VAR is unset (empty is OK)
//! - `$$` - escape sequence for literal `$`

use regex::Regex;
use std::env;
use std::sync::LazyLock;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$\$                           # escape sequence $$
        |
        \$\{
            ([A-Za-z_][A-Za-z0-9_]*)   # braced variable name
            (?:
                (:?-)                  # :- or -
                ([^}]*)                # default value
            )?
        \}
        |
        \$([A-Za-z_][A-Za-z0-9_]*)     # unbraced variable name
        ",
    )
    .expect("Invalid regex pattern")
});

/// Outcome of interpolating a config document.
///
/// Errors are accumulated rather than short-circuited so the user sees
/// every missing variable at once.
#[derive(Debug)]
pub struct Interpolation {
    /// The interpolated text.
    pub text: String,
    /// Any errors encountered during interpolation.
    pub errors: Vec<String>,
}

impl Interpolation {
    /// Returns true if there were no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Interpolate environment variables in the given text.
pub fn interpolate(input: &str) -> Interpolation {
    let mut errors = Vec::new();

    let text = VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            let matched = caps.get(0).unwrap().as_str();
            if matched == "$$" {
                return "$".to_string();
            }

            let name = caps
                .get(1)
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or("");
            let dash = caps.get(2).map(|m| m.as_str());
            let fallback = caps.get(3).map(|m| m.as_str());

            match env::var(name) {
                Ok(value) => {
                    // Config files are line-oriented YAML; a value carrying a
                    // newline would splice arbitrary keys into the document.
                    if value.contains('\n') || value.contains('\r') {
                        errors.push(format!(
                            "environment variable '{}' contains newlines, which is not allowed",
                            name
                        ));
                        return matched.to_string();
                    }
                    if value.is_empty() && dash == Some(":-") {
                        return fallback.unwrap_or("").to_string();
                    }
                    value
                }
                Err(_) => match fallback {
                    Some(default) => default.to_string(),
                    None => {
                        errors.push(format!("environment variable '{}' is not set", name));
                        matched.to_string()
                    }
                },
            }
        })
        .to_string();

    Interpolation { text, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let originals: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();

        // SAFETY: These tests run serially (not in parallel) and we restore values after
        for (key, value) in vars {
            match value {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        let result = f();

        // SAFETY: Restoring original environment state
        for (key, original) in originals {
            match original {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        result
    }

    #[test]
    fn test_basic_substitution() {
        with_env_vars(&[("SLUICE_TEST_BROKER", Some("kafka:9092"))], || {
            let result = interpolate("brokers: $SLUICE_TEST_BROKER");
            assert!(result.is_ok());
            assert_eq!(result.text, "brokers: kafka:9092");
        });
    }

    #[test]
    fn test_braced_substitution() {
        with_env_vars(&[("SLUICE_TEST_KEYSPACE", Some("spark_streams"))], || {
            let result = interpolate("keyspace: ${SLUICE_TEST_KEYSPACE}");
            assert!(result.is_ok());
            assert_eq!(result.text, "keyspace: spark_streams");
        });
    }

    #[test]
    fn test_missing_variable_error() {
        with_env_vars(&[("SLUICE_TEST_MISSING", None)], || {
            let result = interpolate("value: $SLUICE_TEST_MISSING");
            assert!(!result.is_ok());
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors[0].contains("SLUICE_TEST_MISSING"));
            assert!(result.errors[0].contains("not set"));
        });
    }

    #[test]
    fn test_errors_accumulate() {
        with_env_vars(
            &[("SLUICE_TEST_MISS1", None), ("SLUICE_TEST_MISS2", None)],
            || {
                let result = interpolate("a: $SLUICE_TEST_MISS1, b: $SLUICE_TEST_MISS2");
                assert!(!result.is_ok());
                assert_eq!(result.errors.len(), 2);
            },
        );
    }

    #[test]
    fn test_default_when_unset() {
        with_env_vars(&[("SLUICE_TEST_UNSET", None)], || {
            let result = interpolate("hosts: ${SLUICE_TEST_UNSET:-localhost}");
            assert!(result.is_ok());
            assert_eq!(result.text, "hosts: localhost");
        });
    }

    #[test]
    fn test_default_when_empty_with_colon() {
        with_env_vars(&[("SLUICE_TEST_EMPTY", Some(""))], || {
            let result = interpolate("hosts: ${SLUICE_TEST_EMPTY:-localhost}");
            assert!(result.is_ok());
            assert_eq!(result.text, "hosts: localhost");
        });
    }

    #[test]
    fn test_empty_kept_without_colon() {
        with_env_vars(&[("SLUICE_TEST_EMPTY2", Some(""))], || {
            let result = interpolate("value: ${SLUICE_TEST_EMPTY2-fallback}");
            assert!(result.is_ok());
            assert_eq!(result.text, "value: ");
        });
    }

    #[test]
    fn test_escape_sequence() {
        let result = interpolate("literal: $$HOME");
        assert!(result.is_ok());
        assert_eq!(result.text, "literal: $HOME");
    }

    #[test]
    fn test_newline_injection_blocked() {
        with_env_vars(&[("SLUICE_TEST_INJECT", Some("a\nb"))], || {
            let result = interpolate("value: $SLUICE_TEST_INJECT");
            assert!(!result.is_ok());
            assert!(result.errors[0].contains("newlines"));
        });
    }

    #[test]
    fn test_plain_text_untouched() {
        let result = interpolate("topic: users_created");
        assert!(result.is_ok());
        assert_eq!(result.text, "topic: users_created");
    }

    #[test]
    fn test_yaml_config_example() {
        with_env_vars(
            &[
                ("SLUICE_TEST_BROKERS", Some("broker:29092")),
                ("SLUICE_TEST_GROUP", None),
            ],
            || {
                let yaml = r#"
source:
  brokers: ${SLUICE_TEST_BROKERS}
  group_id: ${SLUICE_TEST_GROUP:-sluice-users}
"#;
                let result = interpolate(yaml);
                assert!(result.is_ok());
                assert!(result.text.contains("brokers: broker:29092"));
                assert!(result.text.contains("group_id: sluice-users"));
            },
        );
    }
}
