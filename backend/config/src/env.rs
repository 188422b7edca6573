//! `${VAR}` substitution for string values in the raw config tree.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are recognised. `$${VAR}` is kept
//! as the literal text `${VAR}`.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

/// Group 1 is the escape `$`, group 2 the variable name.
static ENV_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$?)\{([A-Z_][A-Z0-9_]*)\}").expect("valid env pattern"));

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute against the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute against an explicit map. Unset or empty variables are errors.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    let mut out = value.clone();
    substitute_in_place(&mut out, env, String::new())?;
    Ok(out)
}

fn substitute_in_place(value: &mut Value, env: &HashMap<String, String>, path: String) -> Result<()> {
    match value {
        Value::String(s) => {
            if s.contains('$') {
                *s = substitute_string(s, env, &path)?;
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                substitute_in_place(item, env, format!("{path}[{i}]"))?;
            }
        }
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                substitute_in_place(child, env, child_path)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    let mut missing: Option<MissingEnvVarError> = None;
    let replaced = ENV_REF.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(replaced.into_owned())
}

/// Every variable name referenced (unescaped) anywhere in the tree, sorted.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => out.extend(
                ENV_REF
                    .captures_iter(s)
                    .filter(|caps| caps[1].is_empty())
                    .map(|caps| caps[2].to_string()),
            ),
            Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }

    let mut vars = Vec::new();
    walk(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_token() {
        let v = json!({"telegram": {"token": "${TELEGRAM_BOT_TOKEN}"}});
        let out = resolve_env_vars_with(&v, &env(&[("TELEGRAM_BOT_TOKEN", "42:abc")])).unwrap();
        assert_eq!(out["telegram"]["token"], "42:abc");
    }

    #[test]
    fn substitutes_inside_longer_string() {
        let v = json!({"dir": "${HOME_DIR}/media"});
        let out = resolve_env_vars_with(&v, &env(&[("HOME_DIR", "/srv")])).unwrap();
        assert_eq!(out["dir"], "/srv/media");
    }

    #[test]
    fn missing_var_names_var_and_path() {
        let v = json!({"telegram": {"token": "${NOPE}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("NOPE"));
        assert!(err.contains("telegram.token"));
    }

    #[test]
    fn empty_var_is_missing() {
        let v = json!({"a": "${EMPTY}"});
        assert!(resolve_env_vars_with(&v, &env(&[("EMPTY", "")])).is_err());
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"a": "$${KEEP_ME}"});
        let out = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(out["a"], "${KEEP_ME}");
    }

    #[test]
    fn lowercase_names_pass_through() {
        let v = json!({"a": "${lower}", "n": 5});
        let out = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(out["a"], "${lower}");
        assert_eq!(out["n"], 5);
    }

    #[test]
    fn collects_unescaped_vars_only() {
        let v = json!({"a": "${FOO}", "b": ["${BAR}", "$${SKIP}"], "c": "${FOO}"});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR", "FOO"]);
    }
}
