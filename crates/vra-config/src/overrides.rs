//! Parameter overrides from outside the document.
//!
//! Secrets such as `vra_password` should not have to live inline in a
//! parameter document. Overrides replace scalar parameters before
//! validation; they come either from the process environment (variables
//! named `<prefix><PARAM>`, read through figment's [`Env`] provider) or from
//! explicit key/value pairs.
//!
//! Override values are text. Integer parameters are converted when the text
//! parses as an integer; otherwise the text is kept and the validator reports
//! the type mismatch.

use figment::providers::Env;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use vra_core::guest::{EXTRA_DISKS, INTEGER_PARAMS, PARAM_NAMES};

/// Default prefix of override environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "VRA_GUEST_";

/// Returns `true` if `key` names a scalar parameter that may be overridden.
///
/// `extra_disks` is structured and can only come from the document.
pub fn is_overridable(key: &str) -> bool {
    key != EXTRA_DISKS && PARAM_NAMES.contains(&key)
}

/// Collects overrides from environment variables starting with `prefix`.
///
/// Matching is case-insensitive. Variables that do not name an overridable
/// parameter are skipped.
pub fn from_env(prefix: &str) -> Vec<(String, String)> {
    Env::prefixed(prefix)
        .iter()
        .map(|(key, value)| (key.as_str().to_ascii_lowercase(), value))
        .filter(|(key, _)| is_overridable(key))
        .collect()
}

/// Applies `overrides` to `params` in order, later entries winning.
///
/// Returns the names of the parameters that were replaced. Values are never
/// logged.
pub fn apply(params: &mut Map<String, Value>, overrides: &[(String, String)]) -> Vec<String> {
    let mut applied = Vec::new();

    for (key, raw) in overrides {
        let key = key.to_ascii_lowercase();
        if !is_overridable(&key) {
            warn!(key = %key, "ignoring override for unknown or structured parameter");
            continue;
        }

        let value = if INTEGER_PARAMS.contains(&key.as_str()) {
            parse_integer(raw).unwrap_or_else(|| Value::String(raw.clone()))
        } else {
            Value::String(raw.clone())
        };

        debug!(key = %key, "applying parameter override");
        params.insert(key.clone(), value);
        if !applied.contains(&key) {
            applied.push(key);
        }
    }

    applied
}

fn parse_integer(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    raw.parse::<u64>()
        .map(Value::from)
        .or_else(|_| raw.parse::<i64>().map(Value::from))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn overridable_keys() {
        assert!(is_overridable("vra_password"));
        assert!(is_overridable("cpu"));
        assert!(!is_overridable("extra_disks"));
        assert!(!is_overridable("env_overrides"));
    }

    #[test]
    fn string_and_integer_overrides() {
        let mut params = Map::new();
        params.insert("cpu".into(), json!(2));
        let applied = apply(
            &mut params,
            &pairs(&[("VRA_PASSWORD", "from-env"), ("cpu", " 8 "), ("memory", "-4")]),
        );
        assert_eq!(applied, vec!["vra_password", "cpu", "memory"]);
        assert_eq!(params["vra_password"], json!("from-env"));
        assert_eq!(params["cpu"], json!(8));
        assert_eq!(params["memory"], json!(-4));
    }

    #[test]
    fn unparsable_integer_stays_text() {
        let mut params = Map::new();
        apply(&mut params, &pairs(&[("wait_timeout", "ten minutes")]));
        assert_eq!(params["wait_timeout"], json!("ten minutes"));
    }

    #[test]
    fn unknown_and_structured_keys_are_ignored() {
        let mut params = Map::new();
        let applied = apply(
            &mut params,
            &pairs(&[("extra_disks", "[]"), ("colour", "blue")]),
        );
        assert!(applied.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn env_variables_become_lowercase_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("VRA_ENV_TEST_VRA_PASSWORD", "from-env");
            jail.set_env("VRA_ENV_TEST_Cpu", "4");
            jail.set_env("VRA_ENV_TEST_EXTRA_DISKS", "[]");
            jail.set_env("VRA_ENV_TEST_COLOUR", "blue");
            jail.set_env("OTHER_PREFIX_HOSTNAME", "elsewhere");

            let mut found = from_env("VRA_ENV_TEST_");
            found.sort();
            assert_eq!(
                found,
                pairs(&[("cpu", "4"), ("vra_password", "from-env")])
            );
            Ok(())
        });
    }

    #[test]
    fn later_overrides_win() {
        let mut params = Map::new();
        let applied = apply(
            &mut params,
            &pairs(&[("hostname", "first"), ("hostname", "second")]),
        );
        assert_eq!(applied, vec!["hostname"]);
        assert_eq!(params["hostname"], json!("second"));
    }
}
