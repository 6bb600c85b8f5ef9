use super::error::ConfigError;

/// Resolves `${VAR_NAME}` references in a string from environment variables.
/// Returns `ConfigError::UndefinedVariable` if a referenced variable is not
/// set. A `${` with no closing `}` is kept literally.
pub fn resolve_variables(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find('}') {
            Some(close) if close > 0 => {
                let name = &after_open[..close];
                let value = std::env::var(name).map_err(|_| ConfigError::UndefinedVariable {
                    name: name.to_string(),
                })?;
                result.push_str(&value);
                rest = &after_open[close + 1..];
            }
            _ => {
                // Malformed interpolation, keep it literally
                result.push_str("${");
                rest = after_open;
            }
        }
    }

    result.push_str(rest);
    Ok(result)
}
