// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! External tool layer: image transformation and upload.
//!
//! The pipeline only talks to the [`ImageTransformer`] and [`Uploader`]
//! traits. The process-backed implementations below inherit stdio, so
//! whatever the tools print reaches the user unmodified.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::{DeployError, ToolFailure};

/// Default binary extraction tool.
pub const DEFAULT_OBJCOPY: &str = "arm-none-eabi-objcopy";

/// Default section size reporting tool.
pub const DEFAULT_SIZE: &str = "arm-none-eabi-size";

/// Default uploader program.
pub const DEFAULT_UPLOADER: &str = "pros";

/// Uploader subcommand. The uploader finds the descriptor on its own.
pub const UPLOAD_SUBCOMMAND: &str = "upload";

/// Turns a compiled executable into a flat bootloader image.
pub trait ImageTransformer {
    /// Print static section sizes of `elf` for the user.
    fn report_size(&mut self, elf: &Path) -> Result<(), DeployError>;

    /// Write the loadable sections of `elf` to `binary`, replacing it.
    fn extract_binary(&mut self, elf: &Path, binary: &Path) -> Result<(), DeployError>;
}

/// Transfers the image referenced by the descriptor in `project_dir`.
pub trait Uploader {
    fn upload(&mut self, project_dir: &Path) -> Result<(), DeployError>;
}

/// Cross toolchain binutils.
pub struct Toolchain {
    objcopy: PathBuf,
    size: PathBuf,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::new(DEFAULT_OBJCOPY, DEFAULT_SIZE)
    }
}

impl Toolchain {
    pub fn new(objcopy: impl Into<PathBuf>, size: impl Into<PathBuf>) -> Self {
        Self {
            objcopy: objcopy.into(),
            size: size.into(),
        }
    }
}

impl ImageTransformer for Toolchain {
    fn report_size(&mut self, elf: &Path) -> Result<(), DeployError> {
        let mut command = Command::new(&self.size);
        command.arg(elf);
        run_tool(&self.size, &mut command)
    }

    fn extract_binary(&mut self, elf: &Path, binary: &Path) -> Result<(), DeployError> {
        let mut command = Command::new(&self.objcopy);
        command.args(["-O", "binary"]).arg(elf).arg(binary);
        run_tool(&self.objcopy, &mut command)
    }
}

/// Run a tool to completion, mapping spawn errors and failed exits.
fn run_tool(program: &Path, command: &mut Command) -> Result<(), DeployError> {
    debug!("running {:?}", command);

    let tool = || program.display().to_string();
    let status = command.status().map_err(|e| DeployError::ToolInvocation {
        tool: tool(),
        failure: ToolFailure::Spawn(e),
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(DeployError::ToolInvocation {
            tool: tool(),
            failure: ToolFailure::Exit(status.code()),
        })
    }
}

/// Uploader run as a child process inside the project directory.
pub struct ProcessUploader {
    program: PathBuf,
    args: Vec<String>,
}

impl Default for ProcessUploader {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOADER, vec![UPLOAD_SUBCOMMAND.to_string()])
    }
}

impl ProcessUploader {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Uploader for ProcessUploader {
    fn upload(&mut self, project_dir: &Path) -> Result<(), DeployError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(project_dir);
        debug!("running {:?} in {}", command, project_dir.display());

        let status = command.status().map_err(|e| DeployError::ToolInvocation {
            tool: self.program.display().to_string(),
            failure: ToolFailure::Spawn(e),
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(DeployError::Upload {
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_TOOL: &str = "/nonexistent/bin/arm-none-eabi-objcopy";

    #[test]
    fn missing_tool_is_a_spawn_failure() {
        let mut toolchain = Toolchain::new(MISSING_TOOL, MISSING_TOOL);
        let err = toolchain
            .extract_binary(Path::new("robot"), Path::new("robot.bin"))
            .unwrap_err();

        match err {
            DeployError::ToolInvocation {
                tool,
                failure: ToolFailure::Spawn(_),
            } => assert_eq!(tool, MISSING_TOOL),
            other => panic!("expected spawn failure, got {:?}", other),
        }
    }

    #[test]
    fn missing_uploader_is_a_tool_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut uploader = ProcessUploader::new("/nonexistent/bin/pros", vec![]);

        assert!(matches!(
            uploader.upload(dir.path()),
            Err(DeployError::ToolInvocation {
                failure: ToolFailure::Spawn(_),
                ..
            })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_reports_exit_code() {
        let mut toolchain = Toolchain::new("false", "true");
        toolchain.report_size(Path::new("robot")).unwrap();

        let err = toolchain
            .extract_binary(Path::new("robot"), Path::new("robot.bin"))
            .unwrap_err();
        assert!(matches!(
            err,
            DeployError::ToolInvocation {
                failure: ToolFailure::Exit(Some(1)),
                ..
            }
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn uploader_exit_code_is_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut uploader = ProcessUploader::new("sh", vec!["-c".into(), "exit 7".into()]);

        let err = uploader.upload(dir.path()).unwrap_err();
        assert!(matches!(err, DeployError::Upload { code: Some(7) }));
        assert_eq!(err.exit_code(), 7);
    }

    #[cfg(unix)]
    #[test]
    fn uploader_runs_in_project_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("project.pros"), "{}").unwrap();

        let mut uploader =
            ProcessUploader::new("sh", vec!["-c".into(), "test -f project.pros".into()]);
        uploader.upload(dir.path()).unwrap();
    }
}
