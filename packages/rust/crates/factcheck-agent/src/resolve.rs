pub(crate) fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn resolve_string(
    cli_value: Option<String>,
    env_name: &str,
    settings_value: Option<&str>,
    default: &str,
) -> String {
    if let Some(value) = cli_value.filter(|value| !value.trim().is_empty()) {
        return value;
    }
    if let Some(value) = non_empty_env(env_name) {
        return value;
    }
    if let Some(value) = settings_value.filter(|value| !value.trim().is_empty()) {
        return value.to_string();
    }
    default.to_string()
}

/// First non-blank credential among CLI value and env vars (in order).
/// Placeholders such as `pplx-...` are skipped.
pub(crate) fn resolve_secret(cli_value: Option<String>, env_names: &[&str]) -> Option<String> {
    let usable = |value: &str| {
        let trimmed = value.trim();
        !trimmed.is_empty() && !trimmed.contains("...")
    };
    if let Some(value) = cli_value.filter(|value| usable(value)) {
        return Some(value.trim().to_string());
    }
    env_names
        .iter()
        .filter_map(|name| non_empty_env(name))
        .find(|value| usable(value))
}

pub(crate) fn resolve_positive_u64(
    cli_value: Option<u64>,
    env_name: &str,
    settings_value: Option<u64>,
    default: u64,
) -> u64 {
    if let Some(value) = cli_value
        && value > 0
    {
        return value;
    }
    if let Some(value) = parse_positive_u64_from_env(env_name) {
        return value;
    }
    if let Some(value) = settings_value
        && value > 0
    {
        return value;
    }
    default
}

pub(crate) fn resolve_positive_usize(
    cli_value: Option<usize>,
    env_name: &str,
    settings_value: Option<usize>,
    default: usize,
) -> usize {
    if let Some(value) = cli_value
        && value > 0
    {
        return value;
    }
    if let Some(value) = parse_positive_usize_from_env(env_name) {
        return value;
    }
    if let Some(value) = settings_value
        && value > 0
    {
        return value;
    }
    default
}

pub(crate) fn parse_positive_u64_from_env(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!(env_var = %name, value = %raw, "invalid positive integer env value");
            None
        }
    }
}

pub(crate) fn parse_positive_usize_from_env(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!(env_var = %name, value = %raw, "invalid positive integer env value");
            None
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/resolve.rs"]
mod tests;
