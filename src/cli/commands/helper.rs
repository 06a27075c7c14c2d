use std::env;

use anyhow::{Context, Result};
use tracing::debug;

use super::super::args::ConfigArgs;
use crate::config::{Settings, load_config};

/// Find and read the config file, then merge the CLI overrides over it.
pub fn load_settings(args: &ConfigArgs) -> Result<Settings> {
    let cwd = env::current_dir().context("Failed to read the current directory")?;
    let loaded = load_config(args.config.as_deref(), &cwd)?;
    match &loaded.path {
        Some(path) => debug!("using config file {}", path.display()),
        None => debug!("no config file found, using defaults"),
    }
    let base_dir = loaded.base_dir();
    Ok(Settings::resolve(loaded.config, args, &base_dir)?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_explicit_config_paths_resolve_against_its_directory() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("poflow.json");
        fs::write(
            &config,
            r#"{"dest_lang": ["de"], "locale_dir": "translations"}"#,
        )
        .unwrap();

        let args = ConfigArgs {
            config: Some(config),
            domain: Some("app".to_string()),
            ..Default::default()
        };
        let settings = load_settings(&args).unwrap();

        assert_eq!(settings.dest_lang, vec!["de".to_string()]);
        assert_eq!(settings.domain, "app");
        assert_eq!(settings.locale_dir, dir.path().join("translations"));
    }
}
