//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use shelf_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "library_file": config.library_file,
                    "library_path": config.library_path(),
                    "min_year": config.min_year,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.library_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:     {}", config.data_dir.display());
            println!("  library_file: {}", display_optional(&config.library_file));
            println!("  min_year:     {}", config.min_year);
            println!("  log_file:     {}", display_optional(&config.log_file));
            println!();
            println!("Library file: {}", config.library_path().display());
            println!("Config file:  {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Update one key; "none" or an empty value clears optional paths
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            if value.is_empty() {
                bail!("data_dir cannot be empty");
            }
            config.data_dir = value.into();
        }
        "library_file" => {
            config.library_file = optional_path(value);
        }
        "min_year" => {
            config.min_year = value
                .trim()
                .parse()
                .context("Invalid value for min_year. Use a year such as 1000.")?;
        }
        "log_file" => {
            config.log_file = optional_path(value);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, library_file, min_year, log_file",
                key
            );
        }
    }
    Ok(())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

fn display_optional(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_setting_paths() {
        let mut config = Config::default();

        apply_setting(&mut config, "library_file", "/tmp/books.json").unwrap();
        assert_eq!(config.library_file, Some(PathBuf::from("/tmp/books.json")));
        assert_eq!(config.library_path(), PathBuf::from("/tmp/books.json"));

        apply_setting(&mut config, "library_file", "none").unwrap();
        assert!(config.library_file.is_none());

        apply_setting(&mut config, "data_dir", "/srv/shelf").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/shelf"));
        assert!(apply_setting(&mut config, "data_dir", "").is_err());
    }

    #[test]
    fn test_apply_setting_min_year() {
        let mut config = Config::default();

        apply_setting(&mut config, "min_year", "1450").unwrap();
        assert_eq!(config.min_year, 1450);
        assert!(apply_setting(&mut config, "min_year", "medieval").is_err());
    }

    #[test]
    fn test_apply_setting_unknown_key() {
        let mut config = Config::default();
        let err = apply_setting(&mut config, "theme", "dark").unwrap_err();
        assert!(err.to_string().contains("Valid keys"));
    }
}
