// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Build-and-deploy tool for V5 robot firmware.
//!
//! Usage:
//!   v5-deploy target/armv7a-vex-v5/release/robot
//!   v5-deploy -v --project-dir /tmp/robot /build/auton.elf
//!
//! The executable is converted to `<elf>.bin`, a `project.pros` descriptor
//! pointing at it is written, and `pros upload` transfers it to the brain.
//! The process exits with the failing tool's exit code.

mod cli;
mod commands;
mod error;
mod tools;

use std::process::ExitCode;

use clap::Parser;

use crate::error::{DeployError, GENERIC_FAILURE};

fn main() -> ExitCode {
    let args = cli::Cli::parse();
    init_logging(args.verbose);

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<DeployError>()
                .map(DeployError::exit_code)
                .unwrap_or(GENERIC_FAILURE);
            ExitCode::from(code)
        }
    }
}

/// `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
