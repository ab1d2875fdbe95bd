// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Build artifact paths and the project descriptor read by the uploader.
//!
//! The descriptor is a JSON document in the uploader's object-envelope
//! format. Every field except the project name and the binary path is a
//! fixed constant, so the same artifact always serializes to the same bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// --- Descriptor constants ---

/// Well-known file name the uploader looks for in its working directory.
pub const DESCRIPTOR_FILE_NAME: &str = "project.pros";

/// Suffix appended to the executable path to name the raw binary.
pub const BINARY_SUFFIX: &str = ".bin";

/// Hardware platform identifier.
pub const TARGET_PLATFORM: &str = "v5";

/// Template kind and template name of the only entry in a descriptor.
pub const KERNEL_TEMPLATE: &str = "kernel";

/// Kernel template version the uploader checks compatibility against.
pub const KERNEL_VERSION: &str = "3.8.0";

/// Provenance tag of locally built artifacts.
pub const TEMPLATE_ORIGIN: &str = "pros-mainline";

/// Object tag of the project record.
pub const PROJECT_CLASS: &str = "pros.conductor.project.Project";

/// Object tag of a local template entry.
pub const LOCAL_TEMPLATE_CLASS: &str = "pros.conductor.templates.local_template.LocalTemplate";

// --- Errors ---

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to encode project descriptor")]
    Serialize(#[from] serde_json::Error),

    #[error("unexpected descriptor object tag {0:?}")]
    UnexpectedClass(String),

    #[error("cannot resolve {} to an absolute path", .path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// --- BuildArtifact ---

/// Paths involved in one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Base name of the executable, directories stripped, extension kept.
    pub name: String,
    /// Compiled executable. Never written to.
    pub elf_path: PathBuf,
    /// Flat binary extracted from `elf_path`.
    pub binary_path: PathBuf,
}

impl BuildArtifact {
    /// Derive the artifact paths for an executable.
    ///
    /// `binary_path` is the executable path with [`BINARY_SUFFIX`] appended
    /// to the raw path, so `/build/auton.elf` becomes `/build/auton.elf.bin`.
    pub fn from_elf(elf_path: impl Into<PathBuf>) -> Self {
        let elf_path = elf_path.into();
        let name = match elf_path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => elf_path.to_string_lossy().into_owned(),
        };

        let mut binary_path = elf_path.clone().into_os_string();
        binary_path.push(BINARY_SUFFIX);

        Self {
            name,
            elf_path,
            binary_path: PathBuf::from(binary_path),
        }
    }
}

// --- ProjectDescriptor ---

/// Provenance and output location of a template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub origin: String,
    pub output: String,
}

/// A single template entry. Field order matches the uploader's own output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub location: String,
    pub metadata: TemplateMetadata,
    pub name: String,
    #[serde(rename = "py/object")]
    pub class: String,
    pub supported_kernels: Option<String>,
    pub system_files: Vec<String>,
    pub target: String,
    pub upload_options: BTreeMap<String, String>,
    pub user_files: Vec<String>,
    pub version: String,
}

impl TemplateEntry {
    /// Local kernel template pointing at a binary image.
    pub fn kernel(output: &Path) -> Self {
        Self {
            location: String::new(),
            metadata: TemplateMetadata {
                origin: TEMPLATE_ORIGIN.to_string(),
                output: output.to_string_lossy().into_owned(),
            },
            name: KERNEL_TEMPLATE.to_string(),
            class: LOCAL_TEMPLATE_CLASS.to_string(),
            supported_kernels: None,
            system_files: Vec::new(),
            target: TARGET_PLATFORM.to_string(),
            upload_options: BTreeMap::new(),
            user_files: Vec::new(),
            version: KERNEL_VERSION.to_string(),
        }
    }
}

/// Template table. A descriptor carries exactly one kernel template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Templates {
    pub kernel: TemplateEntry,
}

/// One deployable unit as seen by the uploader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub project_name: String,
    pub target: String,
    pub templates: Templates,
}

/// Object envelope wrapped around the project record on disk.
#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "py/object")]
    class: String,
    #[serde(rename = "py/state")]
    state: T,
}

impl ProjectDescriptor {
    /// Build the descriptor for a freshly extracted artifact.
    ///
    /// The output path is recorded as given; see [`Self::for_uploader`].
    pub fn for_artifact(artifact: &BuildArtifact) -> Self {
        Self::new(&artifact.name, &artifact.binary_path)
    }

    /// Build the descriptor the uploader reads from another directory.
    ///
    /// The uploader runs in the project directory, so a relative binary path
    /// is resolved against the current directory first.
    pub fn for_uploader(artifact: &BuildArtifact) -> Result<Self, DescriptorError> {
        let output =
            std::path::absolute(&artifact.binary_path).map_err(|source| DescriptorError::Resolve {
                path: artifact.binary_path.clone(),
                source,
            })?;
        Ok(Self::new(&artifact.name, &output))
    }

    pub fn new(project_name: &str, output: &Path) -> Self {
        Self {
            project_name: project_name.to_string(),
            target: TARGET_PLATFORM.to_string(),
            templates: Templates {
                kernel: TemplateEntry::kernel(output),
            },
        }
    }

    /// Encode as pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, DescriptorError> {
        let envelope = Envelope {
            class: PROJECT_CLASS.to_string(),
            state: self,
        };
        let mut json = serde_json::to_string_pretty(&envelope)?;
        json.push('\n');
        Ok(json)
    }

    /// Decode a descriptor previously produced by [`Self::to_json`].
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        let envelope: Envelope<Self> = serde_json::from_str(json)?;
        if envelope.class != PROJECT_CLASS {
            return Err(DescriptorError::UnexpectedClass(envelope.class));
        }
        Ok(envelope.state)
    }

    /// Replace the file at `path` with this descriptor.
    ///
    /// Encoding happens before the file is touched, so an encoding failure
    /// leaves any previous descriptor in place.
    pub fn write_to(&self, path: &Path) -> Result<(), DescriptorError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
