// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Failure kinds of a deploy run and their process exit codes.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use v5_deploy_common::DescriptorError;

/// Exit code used when no external tool supplied one.
pub const GENERIC_FAILURE: u8 = 1;

/// Why an external tool did not do its job.
#[derive(Debug)]
pub enum ToolFailure {
    /// The program could not be started (not installed, not executable).
    Spawn(std::io::Error),
    /// The program ran and exited unsuccessfully. `None` when killed by a signal.
    Exit(Option<i32>),
    /// The program reported success but its output file cannot be read.
    MissingOutput(PathBuf, std::io::Error),
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolFailure::Spawn(e) => write!(f, "could not be started: {}", e),
            ToolFailure::Exit(code) => f.write_str(&describe_exit(code)),
            ToolFailure::MissingOutput(path, e) => {
                write!(f, "did not produce {}: {}", path.display(), e)
            }
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("input executable {} not found or unreadable", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} {failure}")]
    ToolInvocation { tool: String, failure: ToolFailure },

    #[error("could not write project descriptor")]
    DescriptorWrite(#[from] DescriptorError),

    #[error("uploader {}", describe_exit(.code))]
    Upload { code: Option<i32> },
}

impl DeployError {
    /// Process exit code for this failure: the external tool's own code when
    /// it has one that fits, otherwise [`GENERIC_FAILURE`].
    pub fn exit_code(&self) -> u8 {
        let code = match self {
            DeployError::ToolInvocation {
                failure: ToolFailure::Exit(code),
                ..
            } => *code,
            DeployError::Upload { code } => *code,
            _ => None,
        };

        code.and_then(|c| u8::try_from(c).ok())
            .filter(|c| *c != 0)
            .unwrap_or(GENERIC_FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_error_keeps_uploader_code() {
        assert_eq!(DeployError::Upload { code: Some(3) }.exit_code(), 3);
    }

    #[test]
    fn tool_exit_code_is_propagated() {
        let err = DeployError::ToolInvocation {
            tool: "arm-none-eabi-objcopy".into(),
            failure: ToolFailure::Exit(Some(2)),
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "arm-none-eabi-objcopy exited with code 2");
    }

    #[test]
    fn failures_without_code_are_generic() {
        let spawn = DeployError::ToolInvocation {
            tool: "arm-none-eabi-size".into(),
            failure: ToolFailure::Spawn(std::io::ErrorKind::NotFound.into()),
        };
        assert_eq!(spawn.exit_code(), GENERIC_FAILURE);
        assert_eq!(DeployError::Upload { code: None }.exit_code(), GENERIC_FAILURE);

        let missing = DeployError::InputNotFound {
            path: "/nope".into(),
            source: std::io::ErrorKind::NotFound.into(),
        };
        assert_eq!(missing.exit_code(), GENERIC_FAILURE);
    }

    #[test]
    fn out_of_range_codes_are_generic() {
        assert_eq!(DeployError::Upload { code: Some(-1) }.exit_code(), GENERIC_FAILURE);
        assert_eq!(DeployError::Upload { code: Some(300) }.exit_code(), GENERIC_FAILURE);
    }
}
