use anyhow::Result;
use colored::Colorize;

use super::super::{args::CleanCommand, exit_status::ExitStatus, report::SUCCESS_MARK};
use super::helper::load_settings;
use crate::workflow::{generated_files, remove_files};

pub fn clean(cmd: &CleanCommand) -> Result<ExitStatus> {
    let settings = load_settings(&cmd.config)?;
    let files = generated_files(&settings);

    if files.is_empty() {
        println!("{} {}", SUCCESS_MARK.green(), "Nothing to clean".green());
        return Ok(ExitStatus::Success);
    }

    if !cmd.yes {
        for file in &files {
            println!("  {}", file.display());
        }
        println!(
            "{} {} file(s).",
            "Would delete".yellow().bold(),
            files.len()
        );
        println!("Run with {} to delete these files.", "--yes".cyan());
        return Ok(ExitStatus::Success);
    }

    let deleted = remove_files(&files)?;
    println!("{} {} file(s).", "Deleted".green().bold(), deleted);
    Ok(ExitStatus::Success)
}
