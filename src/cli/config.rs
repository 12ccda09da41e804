use crate::config::{FileConfig, GenerationConfig, CONFIG_KEYS, ENV_API_KEY};
use std::path::Path;

/// Run the config command
pub fn run_config(path: &Path, key: Option<&str>, value: Option<&str>) -> Result<(), String> {
    let mut config = FileConfig::load(path).map_err(|e| e.to_string())?;

    match (key, value) {
        (None, None) => {
            // Show what the client would actually use
            let resolved = GenerationConfig::resolve(&config);

            println!("Configuration ({}):\n", path.display());
            println!("  endpoint:     {}", or_unset(&resolved.endpoint));
            println!("  deployment:   {}", or_unset(&resolved.deployment));
            println!("  api_version:  {}", resolved.api_version);
            println!("  max_tokens:   {}", resolved.max_tokens);
            println!("  temperature:  {}", resolved.temperature);
            println!("  timeout_secs: {}", resolved.timeout_secs);
            println!(
                "  api key:      {}",
                if resolved.api_key.is_empty() {
                    format!("(not set, export {})", ENV_API_KEY)
                } else {
                    "(set)".to_string()
                }
            );
        }
        (Some(k), None) => match config.get(k).map_err(|e| e.to_string())? {
            Some(v) => println!("{}: {}", k, v),
            None => println!("{}: (not set)", k),
        },
        (Some(k), Some(v)) => {
            config.set(k, v).map_err(|e| e.to_string())?;
            config.save(path).map_err(|e| e.to_string())?;
            println!("Set {} = {}", k, v);
        }
        (None, Some(_)) => {
            return Err(format!(
                "Key required when setting a value (one of: {})",
                CONFIG_KEYS.join(", ")
            ));
        }
    }

    Ok(())
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
