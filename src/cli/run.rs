use anyhow::Result;

use super::{
    args::Command,
    commands::{clean::clean, compact::compact, init::init, pipeline::pipeline},
    exit_status::ExitStatus,
};
use crate::workflow::{Stage, Stages};

/// Dispatch to the command handler.
pub fn run(command: Command) -> Result<ExitStatus> {
    match command {
        Command::Run(cmd) => {
            let stages = Stages {
                translate: !cmd.no_translate,
                review: !cmd.no_review,
                ..Stages::all()
            };
            pipeline(&cmd.config, stages)
        }
        Command::Update(cmd) => pipeline(&cmd.config, Stages::only(Stage::Update)),
        Command::Translate(cmd) => pipeline(&cmd.config, Stages::only(Stage::Translate)),
        Command::Review(cmd) => pipeline(&cmd.config, Stages::only(Stage::Review)),
        Command::Compile(cmd) => pipeline(&cmd.config, Stages::only(Stage::Compile)),
        Command::Compact(cmd) => compact(&cmd.config),
        Command::Clean(cmd) => clean(&cmd),
        Command::Init => init(),
    }
}
