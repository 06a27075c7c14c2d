//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `run`: update, translate, review and compile in one go
//! - `update`: extract strings, write the template and merge it into catalogs
//! - `translate`: machine-translate entries without a translation
//! - `review`: walk through entries that need a human
//! - `compile`: write MO files
//! - `compact`: purge obsolete entries
//! - `clean`: delete generated catalog files
//! - `init`: write a default `.poflowrc.json`
//!
//! Every option in [`ConfigArgs`] overrides the field of the same name in
//! the config file.

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::translate::{ApiKeyType, ServiceKind};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's config args.
    pub fn verbose(&self) -> bool {
        self.config().is_some_and(|config| config.verbose)
    }

    fn config(&self) -> Option<&ConfigArgs> {
        match &self.command {
            Some(Command::Run(cmd)) => Some(&cmd.config),
            Some(Command::Update(cmd))
            | Some(Command::Translate(cmd))
            | Some(Command::Review(cmd))
            | Some(Command::Compile(cmd))
            | Some(Command::Compact(cmd)) => Some(&cmd.config),
            Some(Command::Clean(cmd)) => Some(&cmd.config),
            Some(Command::Init) | None => None,
        }
    }
}

/// Settings shared by all project commands.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Config file to use instead of searching for .poflowrc.json
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Destination languages, comma separated
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub dest_lang: Option<Vec<String>>,

    /// Files or directories to scan for translatable strings
    #[arg(long, num_args = 1..)]
    pub input_paths: Option<Vec<PathBuf>>,

    /// Directory holding the template and the catalogs
    #[arg(long)]
    pub locale_dir: Option<PathBuf>,

    /// Language of the source strings
    #[arg(long)]
    pub src_lang: Option<String>,

    /// Gettext domain, used as the catalog file name
    #[arg(long)]
    pub domain: Option<String>,

    /// Glob patterns of paths to leave out of the scan
    #[arg(long, num_args = 1..)]
    pub exclude_patterns: Option<Vec<String>>,

    /// Babel-style mapping configuration
    #[arg(long)]
    pub mapping_file_content: Option<String>,

    /// Wrap PO lines at this width (0 disables wrapping)
    #[arg(long)]
    pub line_width: Option<usize>,

    /// Extra keywords, e.g. `tr` or `ptr:1c,2`
    #[arg(long, num_args = 1..)]
    pub keywords: Option<Vec<String>>,

    /// Machine translation service
    #[arg(long, value_enum)]
    pub translation_service: Option<ServiceKind>,

    /// API key for services that need one
    #[arg(long, env = "POFLOW_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, value_enum)]
    pub api_key_type: Option<ApiKeyType>,

    /// Azure region of the Microsoft Translator resource
    #[arg(long)]
    pub region: Option<String>,

    /// Model used by the ChatGPT service
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub http_proxy: Option<String>,

    #[arg(long)]
    pub https_proxy: Option<String>,

    /// Timeout for a single translation request, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Compile fuzzy entries into MO files
    #[arg(long, overrides_with = "no_use_fuzzy")]
    pub use_fuzzy: bool,

    /// Leave fuzzy entries out of MO files even if the config file says otherwise
    #[arg(long, overrides_with = "use_fuzzy")]
    pub no_use_fuzzy: bool,

    /// Fail a language when any entry cannot be translated
    #[arg(long, overrides_with = "no_strict")]
    pub strict: bool,

    /// Tolerate failed translations even if the config file enables strict mode
    #[arg(long, overrides_with = "strict")]
    pub no_strict: bool,

    /// Project name for new catalog headers
    #[arg(long)]
    pub project: Option<String>,

    /// Project version for new catalog headers
    #[arg(long)]
    pub project_version: Option<String>,

    /// Last translator name for new catalog headers
    #[arg(long)]
    pub author: Option<String>,

    /// Contact address for new catalog headers
    #[arg(long)]
    pub email: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct RunCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Skip machine translation
    #[arg(long)]
    pub no_translate: bool,

    /// Skip the interactive review
    #[arg(long)]
    pub no_review: bool,
}

#[derive(Debug, Args)]
pub struct StageCommand {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args)]
pub struct CleanCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Actually delete the files (default is dry-run)
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Update, translate, review and compile every language
    Run(RunCommand),
    /// Extract strings, write the template and merge it into each catalog
    Update(StageCommand),
    /// Machine-translate entries that have no translation yet
    Translate(StageCommand),
    /// Review unreviewed and untranslated entries interactively
    Review(StageCommand),
    /// Compile catalogs into MO files
    Compile(StageCommand),
    /// Remove obsolete entries from every catalog
    Compact(StageCommand),
    /// Delete the generated template, PO and MO files
    Clean(CleanCommand),
    /// Initialize a new .poflowrc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let args = Arguments::try_parse_from([
            "poflow",
            "run",
            "--dest-lang",
            "de,fr",
            "--no-review",
            "--strict",
            "-v",
        ])
        .unwrap();

        assert!(args.verbose());
        let Some(Command::Run(cmd)) = args.command else {
            panic!("expected run");
        };
        assert_eq!(
            cmd.config.dest_lang,
            Some(vec!["de".to_string(), "fr".to_string()])
        );
        assert!(cmd.no_review);
        assert!(!cmd.no_translate);
        assert!(cmd.config.strict);
        assert_eq!(cmd.config.domain, None);
    }

    #[test]
    fn test_service_value_names() {
        let args = Arguments::try_parse_from([
            "poflow",
            "translate",
            "--translation-service",
            "mymemory",
            "--api-key-type",
            "paid",
        ])
        .unwrap();
        let Some(Command::Translate(cmd)) = args.command else {
            panic!("expected translate");
        };
        assert_eq!(cmd.config.translation_service, Some(ServiceKind::MyMemory));
        assert_eq!(cmd.config.api_key_type, Some(ApiKeyType::Paid));
    }

    #[test]
    fn test_negated_switches_last_one_wins() {
        let args = Arguments::try_parse_from([
            "poflow",
            "compile",
            "--strict",
            "--no-strict",
            "--no-use-fuzzy",
        ])
        .unwrap();
        let Some(Command::Compile(cmd)) = args.command else {
            panic!("expected compile");
        };
        assert!(!cmd.config.strict);
        assert!(cmd.config.no_strict);
        assert!(cmd.config.no_use_fuzzy);
        assert!(!cmd.config.use_fuzzy);

        let args =
            Arguments::try_parse_from(["poflow", "compile", "--no-strict", "--strict"]).unwrap();
        let Some(Command::Compile(cmd)) = args.command else {
            panic!("expected compile");
        };
        assert!(cmd.config.strict);
        assert!(!cmd.config.no_strict);
    }

    #[test]
    fn test_service_options() {
        let args = Arguments::try_parse_from([
            "poflow",
            "translate",
            "--translation-service",
            "chatgpt",
            "--model",
            "gpt-4o",
            "--region",
            "eastus",
        ])
        .unwrap();
        let Some(Command::Translate(cmd)) = args.command else {
            panic!("expected translate");
        };
        assert_eq!(cmd.config.translation_service, Some(ServiceKind::ChatGpt));
        assert_eq!(cmd.config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cmd.config.region.as_deref(), Some("eastus"));
    }

    #[test]
    fn test_init_has_no_config() {
        let args = Arguments::try_parse_from(["poflow", "init"]).unwrap();
        assert!(!args.verbose());
    }

    #[test]
    fn test_cli_debug_assert() {
        Arguments::command().debug_assert();
    }
}
