//! Insertion into the processor pipeline.

use crate::tree::{Pipeline, Processor};

use super::InsertOutcome;

/// Appends `processor` to the end of the pipeline. Duplicates are allowed.
pub(crate) fn append_processor(pipeline: &mut Pipeline, processor: Processor) -> InsertOutcome {
    pipeline.processors.push(processor);
    InsertOutcome::Appended {
        position: pipeline.processors.len() - 1,
    }
}
