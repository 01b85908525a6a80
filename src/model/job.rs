use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

pub const HIV_DATASET: &str = include_str!("../../datasets/hiv.txt");
pub const COVID_DATASET: &str = include_str!("../../datasets/covid.txt");
pub const SIMPLE_DATASET: &str = include_str!("../../datasets/simple.txt");

/// One diagram + table pairing to run through both stages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    /// File name under the diagrams directory.
    pub image: String,
    pub dataset: Dataset,
    /// Transcript file name; written under `<output_dir>/prompt_sample/`.
    pub output: String,
}

/// Tabular input, either one of the bundled tables or inline text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Hiv,
    Covid,
    Simple,
    Inline(String),
}

impl Dataset {
    pub fn text(&self) -> &str {
        match self {
            Dataset::Hiv => HIV_DATASET,
            Dataset::Covid => COVID_DATASET,
            Dataset::Simple => SIMPLE_DATASET,
            Dataset::Inline(text) => text,
        }
    }
}

impl Job {
    pub fn new(image: impl Into<String>, dataset: Dataset, output: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            dataset,
            output: output.into(),
        }
    }

    pub fn builtin() -> Vec<Job> {
        vec![
            Job::new("hivModel(paper).jpeg", Dataset::Hiv, "finalHivModel.txt"),
            Job::new("covidModel(paper).png", Dataset::Covid, "finalCovidModel.txt"),
            Job::new("simple_seirmodel.png", Dataset::Simple, "finalSimpleModel.txt"),
        ]
    }
}

/// Result of a single workflow run that did not hit a service failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Written { path: PathBuf },
    Aborted { reason: String },
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Written { path } => {
                write!(f, "SEIR model successfully written to {}", path.display())
            }
            JobOutcome::Aborted { reason } => f.write_str(reason),
        }
    }
}
