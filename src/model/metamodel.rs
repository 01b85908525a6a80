use serde_json::Value;

/// The language specification the stage-1 model must follow.
/// Only ever used in its pretty-printed form.
#[derive(Debug, Clone)]
pub struct Metamodel {
    pub source_name: String,
    pub document: Value,
}

impl Metamodel {
    /// Two-space indented JSON, matching what the prompts embed.
    pub fn pretty(&self) -> String {
        // Serializing a `Value` cannot fail.
        serde_json::to_string_pretty(&self.document).unwrap_or_default()
    }
}
