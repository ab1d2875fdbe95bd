// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Common types for the v5-deploy firmware pipeline.
//!
//! This crate holds everything that does not touch a process or a terminal:
//! - `descriptor`: the build artifact paths and the project descriptor schema
//! - `pipeline_fsm`: the linear stage machine driven by the deploy tool

pub mod descriptor;
pub mod pipeline_fsm;

// Re-export commonly used types
pub use descriptor::{BuildArtifact, DescriptorError, ProjectDescriptor, TemplateEntry, Templates};
pub use descriptor::{DESCRIPTOR_FILE_NAME, KERNEL_TEMPLATE, TARGET_PLATFORM};
pub use pipeline_fsm::{PipelineTrace, Stage, StageEvent};
