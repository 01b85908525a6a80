/// Everything exchanged with the model during one workflow run.
#[derive(Debug, Clone)]
pub struct Transcript<'a> {
    pub structure_instructions: &'a str,
    pub metamodel: &'a str,
    pub user_input: &'a str,
    pub structure_response: &'a str,
    pub rate_instructions: &'a str,
    pub rate_response: &'a str,
}

pub const SEPARATOR_WIDTH: usize = 80;

pub fn separator() -> String {
    format!("\n{}\n", "*".repeat(SEPARATOR_WIDTH))
}

impl Transcript<'_> {
    /// Renders the human-readable log, stage 1 first, then stage 2.
    pub fn render(&self) -> String {
        let sep = separator();
        let mut out = String::new();

        out.push_str("LLM1 PROMPT:\n");
        out.push_str(self.structure_instructions.trim());
        out.push_str(&sep);
        out.push_str("METAMODEL:\n");
        out.push_str(self.metamodel.trim());
        out.push_str(&sep);
        out.push_str("User Input:\n");
        out.push_str(self.user_input.trim());
        out.push_str(&sep);
        out.push_str("Image is also provided with the above textual input!");
        out.push_str(&sep);
        out.push_str("LLM1 RESPONSE:\n ");
        out.push_str(self.structure_response);
        out.push_str(&sep);
        out.push_str(&sep);

        out.push_str("LLM2 PROMPT:\n");
        out.push_str(self.rate_instructions.trim());
        out.push_str(&sep);
        out.push_str("USER INPUT: \n");
        out.push_str(self.user_input);
        out.push_str(&sep);
        out.push_str("LLM1'S RESPONSE: \n");
        out.push_str(self.structure_response);
        out.push_str(&sep);
        out.push_str("LLM2'S RESPONSE:\n");
        out.push_str(self.rate_response);

        out
    }
}
