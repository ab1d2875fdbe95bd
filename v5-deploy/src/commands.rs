// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! The deploy pipeline: transform, write the descriptor, upload.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crc::{Crc, CRC_32_ISO_HDLC};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};

use v5_deploy_common::{
    BuildArtifact, PipelineTrace, ProjectDescriptor, StageEvent, DESCRIPTOR_FILE_NAME,
};

use crate::error::{DeployError, ToolFailure};
use crate::tools::{ImageTransformer, Uploader};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Outcome of a successful run.
#[derive(Debug)]
pub struct Deployment {
    pub artifact: BuildArtifact,
    pub descriptor_path: PathBuf,
    pub trace: PipelineTrace,
}

/// Deploy the executable at `elf`.
///
/// The descriptor is written to `project_dir`, where the uploader is run.
/// Every failure aborts the run; nothing is retried.
pub fn deploy<T, U>(
    elf: &Path,
    project_dir: &Path,
    transformer: &mut T,
    uploader: &mut U,
) -> Result<Deployment, DeployError>
where
    T: ImageTransformer,
    U: Uploader,
{
    let mut trace = PipelineTrace::new();
    let artifact = BuildArtifact::from_elf(elf);

    step(&mut trace, StageEvent::Begin);
    settle(
        &mut trace,
        transform(&artifact, transformer),
        StageEvent::TransformOk,
        StageEvent::TransformErr,
    )?;

    step(&mut trace, StageEvent::Begin);
    let descriptor_path = project_dir.join(DESCRIPTOR_FILE_NAME);
    let written = ProjectDescriptor::for_uploader(&artifact)
        .and_then(|descriptor| descriptor.write_to(&descriptor_path))
        .map_err(DeployError::from);
    settle(
        &mut trace,
        written,
        StageEvent::DescriptorWritten,
        StageEvent::DescriptorErr,
    )?;
    println!("Descriptor: {}", descriptor_path.display());
    println!();

    println!("Uploading {}...", artifact.name);
    settle(
        &mut trace,
        uploader.upload(project_dir),
        StageEvent::UploadOk,
        StageEvent::UploadErr,
    )?;

    println!();
    println!("Firmware uploaded successfully!");

    Ok(Deployment {
        artifact,
        descriptor_path,
        trace,
    })
}

/// Check the input, report sizes and extract the flat image.
fn transform<T: ImageTransformer>(
    artifact: &BuildArtifact,
    transformer: &mut T,
) -> Result<(), DeployError> {
    check_input(&artifact.elf_path)?;

    println!("Executable: {}", artifact.elf_path.display());
    transformer.report_size(&artifact.elf_path)?;

    let spinner = status_spinner("Extracting binary image...");
    // Hidden while the tool runs so its diagnostics reach stderr untouched.
    let extracted =
        spinner.suspend(|| transformer.extract_binary(&artifact.elf_path, &artifact.binary_path));
    match extracted {
        Ok(()) => spinner.finish_with_message("Binary image extracted"),
        Err(e) => {
            spinner.abandon_with_message("Binary extraction failed");
            return Err(e);
        }
    }

    // The uploader must never be pointed at a binary that is not there.
    let image = fs::read(&artifact.binary_path).map_err(|e| DeployError::ToolInvocation {
        tool: "binary extraction".to_string(),
        failure: ToolFailure::MissingOutput(artifact.binary_path.clone(), e),
    })?;

    println!(
        "Binary:     {} ({} bytes, CRC32: 0x{:08x})",
        artifact.binary_path.display(),
        image.len(),
        CRC32.checksum(&image)
    );
    if image.is_empty() {
        warn!(
            "{} is empty: {} has no loadable sections",
            artifact.binary_path.display(),
            artifact.elf_path.display()
        );
    }

    Ok(())
}

/// One-line status shown between tool runs. It does not tick on its own.
fn status_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner
}

fn check_input(elf: &Path) -> Result<(), DeployError> {
    let not_found = |source| DeployError::InputNotFound {
        path: elf.to_path_buf(),
        source,
    };

    let file = fs::File::open(elf).map_err(not_found)?;
    let metadata = file.metadata().map_err(not_found)?;
    if !metadata.is_file() {
        return Err(not_found(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    Ok(())
}

/// `deploy` only emits events in diagram order, so a refused transition is a bug.
fn step(trace: &mut PipelineTrace, event: StageEvent) {
    match trace.advance(event) {
        Ok(stage) => debug!("pipeline stage: {:?}", stage),
        Err((stage, event)) => {
            debug_assert!(false, "illegal pipeline transition {:?} in {:?}", event, stage);
            warn!("ignored {:?} in stage {:?}", event, stage);
        }
    }
}

/// Record the outcome of a stage and pass the result through.
fn settle<V>(
    trace: &mut PipelineTrace,
    result: Result<V, DeployError>,
    ok: StageEvent,
    err: StageEvent,
) -> Result<V, DeployError> {
    step(trace, if result.is_ok() { ok } else { err });
    result
}
