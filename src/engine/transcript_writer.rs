use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WriteError;
use crate::model::transcript::Transcript;

pub const TRANSCRIPT_DIR: &str = "prompt_sample";

/// `<parent of output>/prompt_sample/<file name of output>`.
pub fn transcript_path(output: &Path) -> PathBuf {
    let parent = output.parent().unwrap_or_else(|| Path::new(""));
    let name = output.file_name().unwrap_or(output.as_os_str());
    parent.join(TRANSCRIPT_DIR).join(name)
}

/// Writes the rendered transcript, replacing any earlier file.
pub fn write_transcript(output: &Path, transcript: &Transcript<'_>) -> Result<PathBuf, WriteError> {
    let path = transcript_path(output);
    let io_err = |source| WriteError::Io {
        path: path.clone(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(&path, transcript.render()).map_err(io_err)?;

    Ok(path)
}
