//! The audit-log entry written after every successful generation.

use crate::generation::{CommandKind, GenerationOutput, GenerationRequest};

/// One append-only row describing a finished generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRecord {
    pub caller_id: String,
    pub prompt: String,
    pub content: String,
    pub kind: CommandKind,
}

impl CreationRecord {
    pub fn from_generation(
        caller_id: &str,
        request: &GenerationRequest,
        output: &GenerationOutput,
    ) -> Self {
        Self {
            caller_id: caller_id.to_string(),
            prompt: request.record_prompt(),
            content: output.record_content(),
            kind: request.kind(),
        }
    }
}
