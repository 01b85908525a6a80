use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::engine::llm_client::ModelClient;
use crate::engine::loader::{load_diagram, load_metamodel};
use crate::engine::prompt_builder::{
    PromptBuilder, RATE_INSTRUCTIONS, RATE_PLACEHOLDER, STRUCTURE_INSTRUCTIONS,
};
use crate::engine::transcript_writer::write_transcript;
use crate::error::{LoadError, ServiceError};
use crate::model::job::{Job, JobOutcome};
use crate::model::transcript::Transcript;

/// Where the workflow reads its inputs and writes transcripts.
#[derive(Debug, Clone)]
pub struct Paths {
    pub metamodel: PathBuf,
    pub diagrams_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Runs the two-stage generation for one job at a time.
///
/// Input problems and transcript write failures come back as
/// `JobOutcome::Aborted`; model failures are returned as `Err` and are
/// expected to stop the caller.
pub struct Engine<'a, C: ModelClient> {
    client: &'a C,
    paths: Paths,
}

impl<'a, C: ModelClient> Engine<'a, C> {
    pub fn new(client: &'a C, paths: Paths) -> Self {
        Self { client, paths }
    }

    pub fn run(&self, job: &Job) -> Result<JobOutcome, ServiceError> {
        let (metamodel, diagram) = match load_metamodel(&self.paths.metamodel)
            .and_then(|m| Ok((m, load_diagram(&self.paths.diagrams_dir, &job.image)?)))
        {
            Ok(inputs) => inputs,
            Err(err) => {
                let reason = read_failure_message(&err);
                error!("{reason}");
                return Ok(JobOutcome::Aborted { reason });
            }
        };

        info!("'{}' loaded successfully.", diagram.file_name);
        info!("'{}' loaded successfully.", metamodel.source_name);

        let user_input = job.dataset.text();
        let metamodel_text = metamodel.pretty();

        let structure_prompt = PromptBuilder::structure_prompt(&metamodel_text, user_input);
        let structure = self.client.generate_structure(&diagram, &structure_prompt)?;
        drop(diagram);
        debug!(
            placeholders = structure.matches(RATE_PLACEHOLDER).count(),
            "stage 1 response received"
        );

        let rate_prompt = PromptBuilder::rate_prompt(user_input, &structure);
        let rates = self.client.generate_rates(&rate_prompt)?;

        let transcript = Transcript {
            structure_instructions: STRUCTURE_INSTRUCTIONS,
            metamodel: &metamodel_text,
            user_input,
            structure_response: &structure,
            rate_instructions: RATE_INSTRUCTIONS,
            rate_response: &rates,
        };

        match write_transcript(&self.paths.output_dir.join(&job.output), &transcript) {
            Ok(path) => {
                let outcome = JobOutcome::Written { path };
                info!("{outcome}");
                Ok(outcome)
            }
            Err(err) => {
                let reason = format!("Error writing to output file '{}': {}", job.output, err);
                error!("{reason}");
                Ok(JobOutcome::Aborted { reason })
            }
        }
    }
}

fn read_failure_message(err: &LoadError) -> String {
    if err.is_not_found() {
        format!("Error: A required file was not found - {err}")
    } else {
        format!("An unexpected error occurred while reading files: {err}")
    }
}
