// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use crate::commands;
use crate::tools::{
    ProcessUploader, Toolchain, DEFAULT_OBJCOPY, DEFAULT_SIZE, DEFAULT_UPLOADER, UPLOAD_SUBCOMMAND,
};

/// Command-line arguments.
///
/// Only the executable path is required; everything else defaults to the
/// conventional toolchain and uploader names.
#[derive(Parser)]
#[command(name = "v5-deploy")]
#[command(about = "Convert a V5 executable to a flat binary and upload it")]
pub struct Cli {
    /// Compiled executable (e.g., target/armv7a-vex-v5/release/robot)
    #[arg(value_name = "ELF")]
    pub elf: PathBuf,

    /// Binary extraction tool
    #[arg(long, env = "V5_OBJCOPY", default_value = DEFAULT_OBJCOPY)]
    pub objcopy: PathBuf,

    /// Section size reporting tool
    #[arg(long, env = "V5_SIZE", default_value = DEFAULT_SIZE)]
    pub size: PathBuf,

    /// Uploader program, invoked as `<uploader> upload`
    #[arg(long, env = "V5_UPLOADER", default_value = DEFAULT_UPLOADER)]
    pub uploader: PathBuf,

    /// Directory receiving project.pros; the uploader runs there
    #[arg(long, env = "V5_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let mut toolchain = Toolchain::new(cli.objcopy, cli.size);
    let mut uploader = ProcessUploader::new(cli.uploader, vec![UPLOAD_SUBCOMMAND.to_string()]);

    let deployment = commands::deploy(&cli.elf, &cli.project_dir, &mut toolchain, &mut uploader)
        .with_context(|| format!("Failed to deploy {}", cli.elf.display()))?;
    log::info!(
        "deployed {} via {}",
        deployment.artifact.name,
        deployment.descriptor_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_executable_is_required() {
        assert!(Cli::try_parse_from(["v5-deploy"]).is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["v5-deploy", "-vv", "robot"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.elf, PathBuf::from("robot"));
    }

    #[test]
    fn tool_overrides() {
        let cli = Cli::try_parse_from([
            "v5-deploy",
            "--objcopy",
            "/opt/arm/bin/objcopy",
            "--project-dir",
            "/tmp/work",
            "robot",
        ])
        .unwrap();
        assert_eq!(cli.objcopy, PathBuf::from("/opt/arm/bin/objcopy"));
        assert_eq!(cli.project_dir, PathBuf::from("/tmp/work"));
    }
}
