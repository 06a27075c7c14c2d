use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::args::ConfigArgs;
use crate::extract::{DEFAULT_MAPPING, MappingConfig};
use crate::translate::{ApiKeyType, ServiceKind};

pub const CONFIG_FILE_NAME: &str = ".poflowrc.json";

pub const DEFAULT_LOCALE_DIR: &str = "locale";
pub const DEFAULT_SRC_LANG: &str = "en";
pub const DEFAULT_DOMAIN: &str = "messages";
pub const DEFAULT_LINE_WIDTH: usize = 120;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors that stop the whole process before any language is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{0}' (set it in {CONFIG_FILE_NAME} or pass --{flag})", flag = .0.replace('_', "-"))]
    Missing(&'static str),
    #[error("invalid setting '{field}': {message}")]
    Invalid { field: &'static str, message: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Contents of `.poflowrc.json`. Every field is optional; unset fields fall
/// back to their defaults after CLI overrides are applied.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_lang: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_paths: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_file_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_service: Option<ServiceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_type: Option<ApiKeyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_fuzzy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Machine translation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSettings {
    pub service: ServiceKind,
    pub api_key: Option<String>,
    pub api_key_type: ApiKeyType,
    /// Azure resource region, sent by the Microsoft service only.
    pub region: Option<String>,
    /// Chat model, used by the ChatGPT service only.
    pub model: Option<String>,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub timeout: Duration,
}

/// Project metadata written into catalog headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
}

/// Fully resolved, immutable settings for one run.
///
/// Built once at startup and passed by reference to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dest_lang: Vec<String>,
    pub input_paths: Vec<PathBuf>,
    pub locale_dir: PathBuf,
    pub src_lang: String,
    pub domain: String,
    pub exclude_patterns: Vec<String>,
    pub mapping_file_content: String,
    /// 0 disables wrapping of long PO strings.
    pub line_width: usize,
    pub keywords: Vec<String>,
    pub translation: TranslationSettings,
    /// Compile fuzzy (unconfirmed) translations into MO files.
    pub use_fuzzy: bool,
    /// Treat any failed machine translation as a language failure.
    pub strict: bool,
    pub project: ProjectInfo,
}

impl Settings {
    /// Merge CLI overrides over the config file over defaults, one field at a
    /// time, then validate.
    ///
    /// Relative paths coming from the config file are resolved against
    /// `base_dir` (the directory holding the config file).
    pub fn resolve(
        file: FileConfig,
        cli: &ConfigArgs,
        base_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let from_file = |p: PathBuf| rebase(base_dir, p);

        let dest_lang = pick(cli.dest_lang.clone(), file.dest_lang)
            .ok_or(ConfigError::Missing("dest_lang"))?;

        let input_paths = pick(
            cli.input_paths.clone(),
            file.input_paths
                .map(|paths| paths.into_iter().map(from_file).collect()),
        )
        .unwrap_or_else(|| vec![rebase(base_dir, PathBuf::from("."))]);

        let locale_dir = cli
            .locale_dir
            .clone()
            .or_else(|| file.locale_dir.map(from_file))
            .unwrap_or_else(|| rebase(base_dir, PathBuf::from(DEFAULT_LOCALE_DIR)));

        let timeout_secs =
            pick(cli.timeout_secs, file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS);

        let settings = Self {
            dest_lang,
            input_paths,
            locale_dir,
            src_lang: pick(cli.src_lang.clone(), file.src_lang)
                .unwrap_or_else(|| DEFAULT_SRC_LANG.to_string()),
            domain: pick(cli.domain.clone(), file.domain)
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            exclude_patterns: pick(cli.exclude_patterns.clone(), file.exclude_patterns)
                .unwrap_or_default(),
            mapping_file_content: pick(
                cli.mapping_file_content.clone(),
                file.mapping_file_content,
            )
            .unwrap_or_else(|| DEFAULT_MAPPING.to_string()),
            line_width: pick(cli.line_width, file.line_width).unwrap_or(DEFAULT_LINE_WIDTH),
            keywords: pick(cli.keywords.clone(), file.keywords).unwrap_or_default(),
            translation: TranslationSettings {
                service: pick(cli.translation_service, file.translation_service)
                    .unwrap_or_default(),
                api_key: pick(cli.api_key.clone(), file.api_key),
                api_key_type: pick(cli.api_key_type, file.api_key_type).unwrap_or_default(),
                region: pick(cli.region.clone(), file.region),
                model: pick(cli.model.clone(), file.model),
                http_proxy: pick(cli.http_proxy.clone(), file.http_proxy),
                https_proxy: pick(cli.https_proxy.clone(), file.https_proxy),
                timeout: Duration::from_secs(timeout_secs),
            },
            use_fuzzy: switch(cli.use_fuzzy, cli.no_use_fuzzy, file.use_fuzzy),
            strict: switch(cli.strict, cli.no_strict, file.strict),
            project: ProjectInfo {
                name: pick(cli.project.clone(), file.project),
                version: pick(cli.project_version.clone(), file.version),
                author: pick(cli.author.clone(), file.author),
                email: pick(cli.email.clone(), file.email),
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dest_lang.is_empty() {
            return Err(ConfigError::Missing("dest_lang"));
        }
        for (i, lang) in self.dest_lang.iter().enumerate() {
            if lang.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "dest_lang",
                    message: "language codes must not be empty".to_string(),
                });
            }
            if self.dest_lang[..i].contains(lang) {
                return Err(ConfigError::Invalid {
                    field: "dest_lang",
                    message: format!("\"{}\" is listed twice", lang),
                });
            }
        }

        if self.domain.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "domain",
                message: "must not be empty".to_string(),
            });
        }

        for pattern in &self.exclude_patterns {
            if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
                Pattern::new(pattern).map_err(|e| ConfigError::Invalid {
                    field: "exclude_patterns",
                    message: format!("\"{}\": {}", pattern, e),
                })?;
            }
        }

        MappingConfig::parse(&self.mapping_file_content).map_err(|e| ConfigError::Invalid {
            field: "mapping_file_content",
            message: e.to_string(),
        })?;

        if self.translation.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                message: "must be greater than 0".to_string(),
            });
        }

        for (field, value) in [
            ("region", &self.translation.region),
            ("model", &self.translation.model),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::Invalid {
                    field,
                    message: "must not be empty".to_string(),
                });
            }
        }

        if self.translation.service.needs_api_key() && self.translation.api_key.is_none() {
            return Err(ConfigError::Invalid {
                field: "api_key",
                message: format!("required by the {} service", self.translation.service),
            });
        }

        Ok(())
    }

    /// `<locale_dir>/<lang>/LC_MESSAGES/<domain>.po`
    pub fn po_path(&self, lang: &str) -> PathBuf {
        self.catalog_dir(lang).join(format!("{}.po", self.domain))
    }

    /// `<locale_dir>/<lang>/LC_MESSAGES/<domain>.mo`
    pub fn mo_path(&self, lang: &str) -> PathBuf {
        self.catalog_dir(lang).join(format!("{}.mo", self.domain))
    }

    /// `<locale_dir>/<domain>.pot`
    pub fn template_path(&self) -> PathBuf {
        self.locale_dir.join(format!("{}.pot", self.domain))
    }

    fn catalog_dir(&self, lang: &str) -> PathBuf {
        self.locale_dir.join(lang).join("LC_MESSAGES")
    }

    #[cfg(test)]
    pub(crate) fn for_tests(dest_lang: &[&str]) -> Self {
        Self {
            dest_lang: dest_lang.iter().map(|l| l.to_string()).collect(),
            input_paths: vec![PathBuf::from(".")],
            locale_dir: PathBuf::from(DEFAULT_LOCALE_DIR),
            src_lang: DEFAULT_SRC_LANG.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            exclude_patterns: Vec::new(),
            mapping_file_content: DEFAULT_MAPPING.to_string(),
            line_width: DEFAULT_LINE_WIDTH,
            keywords: Vec::new(),
            translation: TranslationSettings {
                service: ServiceKind::default(),
                api_key: None,
                api_key_type: ApiKeyType::default(),
                region: None,
                model: None,
                http_proxy: None,
                https_proxy: None,
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            use_fuzzy: false,
            strict: false,
            project: ProjectInfo::default(),
        }
    }
}

/// CLI value wins if present, else the config file value.
fn pick<T>(cli: Option<T>, file: Option<T>) -> Option<T> {
    cli.or(file)
}

/// A `--no-*` flag forces off, the positive flag forces on, otherwise the
/// config file decides.
fn switch(on: bool, off: bool, file: Option<bool>) -> bool {
    if off {
        false
    } else {
        on || file.unwrap_or(false)
    }
}

fn rebase(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() || base_dir == Path::new(".") || base_dir.as_os_str().is_empty() {
        path
    } else if path == Path::new(".") {
        base_dir.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

pub fn default_config_json() -> anyhow::Result<String> {
    let config = FileConfig {
        dest_lang: Some(vec!["de".to_string()]),
        input_paths: Some(vec![PathBuf::from(".")]),
        locale_dir: Some(PathBuf::from(DEFAULT_LOCALE_DIR)),
        src_lang: Some(DEFAULT_SRC_LANG.to_string()),
        domain: Some(DEFAULT_DOMAIN.to_string()),
        exclude_patterns: Some(Vec::new()),
        mapping_file_content: Some(DEFAULT_MAPPING.to_string()),
        line_width: Some(DEFAULT_LINE_WIDTH),
        translation_service: Some(ServiceKind::default()),
        timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        ..Default::default()
    };
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: FileConfig,
    /// Path of the config file, `None` if using defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    /// Directory relative config paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config file: the explicit path if given, otherwise the nearest
/// `.poflowrc.json` walking up from `start_dir`.
pub fn load_config(
    explicit: Option<&Path>,
    start_dir: &Path,
) -> Result<ConfigLoadResult, ConfigError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(start_dir),
    };
    match path {
        Some(path) => Ok(ConfigLoadResult {
            config: read_config_file(&path)?,
            path: Some(path),
        }),
        None => Ok(ConfigLoadResult {
            config: FileConfig::default(),
            path: None,
        }),
    }
}
