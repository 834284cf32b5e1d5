use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpolationError {
    #[error("Required environment variable not found: {0}")]
    RequiredVarNotFound(String),

    #[error("Recursive interpolation limit exceeded")]
    RecursionLimit,
}

pub type InterpolationResult<T> = Result<T, InterpolationError>;

const MAX_RECURSION_DEPTH: usize = 10;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("Invalid regex pattern")
});

/// Expands `${VAR}` and `${VAR:-default}` references from the environment.
pub fn interpolate(input: &str) -> InterpolationResult<String> {
    interpolate_with_depth(input, 0)
}

fn interpolate_with_depth(input: &str, depth: usize) -> InterpolationResult<String> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(InterpolationError::RecursionLimit);
    }

    let mut output = String::with_capacity(input.len());
    let mut last = 0;

    for cap in VAR_PATTERN.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let Some(var_name) = cap.get(1).map(|m| m.as_str()) else {
            continue;
        };

        let replacement = match std::env::var(var_name) {
            Ok(value) => value,
            Err(_) => match cap.get(2) {
                Some(default) => interpolate_with_depth(default.as_str(), depth + 1)?,
                None => return Err(InterpolationError::RequiredVarNotFound(var_name.to_string())),
            },
        };

        output.push_str(&input[last..full_match.start()]);
        output.push_str(&replacement);
        last = full_match.end();
    }

    output.push_str(&input[last..]);
    Ok(output)
}

/// Interpolates every string in a parsed TOML document, in place.
pub fn interpolate_toml(value: &mut toml::Value) -> InterpolationResult<()> {
    match value {
        toml::Value::String(text) => *text = interpolate(text)?,
        toml::Value::Array(items) => items.iter_mut().try_for_each(interpolate_toml)?,
        toml::Value::Table(table) => table
            .iter_mut()
            .try_for_each(|(_, value)| interpolate_toml(value))?,
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_var() {
        std::env::set_var("JE_TEST_VAR_SIMPLE", "hello");
        let result = interpolate("${JE_TEST_VAR_SIMPLE}").unwrap();
        assert_eq!(result, "hello");
        std::env::remove_var("JE_TEST_VAR_SIMPLE");
    }

    #[test]
    fn test_var_inside_url() {
        std::env::set_var("JE_TEST_HOST", "ci.internal");
        let result = interpolate("https://${JE_TEST_HOST}:8443/").unwrap();
        assert_eq!(result, "https://ci.internal:8443/");
        std::env::remove_var("JE_TEST_HOST");
    }

    #[test]
    fn test_missing_var_error() {
        let result = interpolate("${JE_THIS_VAR_DOES_NOT_EXIST_12345}");
        assert!(matches!(
            result,
            Err(InterpolationError::RequiredVarNotFound(_))
        ));
    }

    #[test]
    fn test_default_value() {
        let result = interpolate("${JE_NONEXISTENT_VAR_123:-http://jenkins:8080}").unwrap();
        assert_eq!(result, "http://jenkins:8080");
    }

    #[test]
    fn test_empty_default() {
        let result = interpolate("prefix${JE_NONEXISTENT_VAR_456:-}suffix").unwrap();
        assert_eq!(result, "prefixsuffix");
    }

    #[test]
    fn test_no_interpolation() {
        let result = interpolate("plain text").unwrap();
        assert_eq!(result, "plain text");
    }

    #[test]
    fn test_interpolate_toml() {
        std::env::set_var("JE_TEST_TOML_VAR", "secret");

        let toml_str = r#"
            password = "${JE_TEST_TOML_VAR}"
            nested = { inner = "${JE_TEST_TOML_VAR:-fallback}" }
            array = ["${JE_TEST_TOML_VAR}", "static"]
            port = 9118
        "#;

        let mut value: toml::Value = toml::from_str(toml_str).unwrap();
        interpolate_toml(&mut value).unwrap();

        assert_eq!(value["password"].as_str().unwrap(), "secret");
        assert_eq!(value["nested"]["inner"].as_str().unwrap(), "secret");
        assert_eq!(value["array"][0].as_str().unwrap(), "secret");
        assert_eq!(value["array"][1].as_str().unwrap(), "static");
        assert_eq!(value["port"].as_integer().unwrap(), 9118);

        std::env::remove_var("JE_TEST_TOML_VAR");
    }
}
