// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Pipeline stage FSM - pure logic without process dependencies.
//!
//! A deploy run is a single linear traversal:
//!
//! ```text
//! Start -> Transforming -> Transformed -> Synthesizing -> Uploading -> Succeeded
//!               |                              |              |
//!               v                              v              v
//!        TransformFailed                SynthesisFailed   UploadFailed
//! ```
//!
//! No stage is revisited and nothing resumes from a failed stage; a new run
//! starts again from [`Stage::Start`].

/// Stage of a deploy run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Start,
    Transforming,
    Transformed,
    TransformFailed,
    Synthesizing,
    SynthesisFailed,
    Uploading,
    Succeeded,
    UploadFailed,
}

/// Outcome reported by the driver to move the FSM forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageEvent {
    /// Start the next unit of work (transform from `Start`, synthesis from `Transformed`).
    Begin,
    TransformOk,
    TransformErr,
    DescriptorWritten,
    DescriptorErr,
    UploadOk,
    UploadErr,
}

impl Stage {
    /// Terminal stages accept no further events.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Stage::TransformFailed | Stage::SynthesisFailed | Stage::Succeeded | Stage::UploadFailed
        )
    }

    pub fn is_success(self) -> bool {
        self == Stage::Succeeded
    }
}

/// Compute the stage reached from `stage` on `event`.
///
/// Returns `None` when the transition is not part of the pipeline.
pub fn next_stage(stage: Stage, event: StageEvent) -> Option<Stage> {
    use Stage::*;
    use StageEvent::*;

    match (stage, event) {
        (Start, Begin) => Some(Transforming),
        (Transforming, TransformOk) => Some(Transformed),
        (Transforming, TransformErr) => Some(TransformFailed),
        (Transformed, Begin) => Some(Synthesizing),
        (Synthesizing, DescriptorWritten) => Some(Uploading),
        (Synthesizing, DescriptorErr) => Some(SynthesisFailed),
        (Uploading, UploadOk) => Some(Succeeded),
        (Uploading, UploadErr) => Some(UploadFailed),
        _ => None,
    }
}

/// Ordered record of the stages visited by one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineTrace {
    stages: Vec<Stage>,
}

impl Default for PipelineTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineTrace {
    pub fn new() -> Self {
        Self {
            stages: vec![Stage::Start],
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        // `stages` always holds at least `Start`.
        self.stages.last().copied().unwrap_or(Stage::Start)
    }

    /// All visited stages, `Start` first.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Apply an event. On an illegal transition the trace is left untouched
    /// and the rejected `(stage, event)` pair is returned.
    pub fn advance(&mut self, event: StageEvent) -> Result<Stage, (Stage, StageEvent)> {
        let current = self.stage();
        let next = next_stage(current, event).ok_or((current, event))?;
        self.stages.push(next);
        Ok(next)
    }
}
