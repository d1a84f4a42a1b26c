use anyhow::{bail, Context, Result};
use math_mentor::config::MentorConfig;
use math_mentor::storage::path_utils;

/// Effective config as JSON: the file merged over defaults.
fn current_value() -> Result<serde_json::Value> {
    let config = MentorConfig::load();
    Ok(serde_json::to_value(&config)?)
}

/// `config show`: display the full config.
pub fn run_show() -> Result<()> {
    let value = current_value()?;
    println!("# {}", path_utils::config_path().display());
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// `config get <key>`: display a single config value.
///
/// Key uses dot notation: `retrieval.k`, `completion.model`
pub fn run_get(key: &str) -> Result<()> {
    let config = current_value()?;
    match resolve_path(&config, key) {
        Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
        None => bail!("Key not found: {}", key),
    }
    Ok(())
}

/// `config set <key> <value>`: set a config value.
///
/// Value is parsed as JSON (bool, number, string), falling back to a plain string.
/// The result must still deserialize and validate before it is written.
pub fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = current_value()?;
    if resolve_path(&config, key).is_none() {
        bail!("Unknown config key: {}", key);
    }

    let parsed: serde_json::Value = serde_json::from_str(value)
        .unwrap_or(serde_json::Value::String(value.to_string()));

    set_path(&mut config, key, parsed.clone())?;

    let updated: MentorConfig = serde_json::from_value(config)
        .with_context(|| format!("Invalid value for {}: {}", key, value))?;
    updated.validate()?;
    updated.save().context("Failed to write config.json")?;

    tracing::info!(key = key, "Config updated");
    println!("{} = {}", key, serde_json::to_string(&parsed)?);
    Ok(())
}

/// Resolve a dot-separated path in a JSON value.
fn resolve_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Set a value at an existing dot-separated path.
fn set_path(root: &mut serde_json::Value, path: &str, value: serde_json::Value) -> Result<()> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current.get_mut(segment) {
            Some(next) => next,
            None => bail!("Key not found: {}", path),
        };
    }
    *current = value;
    Ok(())
}
