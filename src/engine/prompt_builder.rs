use crate::model::transcript::separator;

/// Placeholder stage 1 must put in every `rate` attribute.
pub const RATE_PLACEHOLDER: &str = "[[rate_missing]]";

pub const STRUCTURE_INSTRUCTIONS: &str = "\
You are an expert in XML structure generation for epidemiological models.

Your task is to generate a structurally correct SEIR model in XML format using the provided **model diagram (image)** and **language specification/metamodel**.

You must:
- Focus ONLY on generating compartment and flow structure.
- DO NOT attempt to calculate or insert any numeric rate values.
- Instead, use a placeholder `[[rate_missing]]` for all `rate` attributes that require computation later.
- Use 0-based indexing for compartments in the order they appear (top-down, left-to-right).
- Follow the metamodel strictly for element names, attributes, and nesting.
- Include all compartments and their directional flows shown in the diagram.

Inputs:
- model_diagram (image): Shows compartments and directional transitions.
- language_specification (text): Defines the structure and rules for valid SEIR XML.

Output:
- Only the final XML file. Do not include explanations or markdown formatting.
- Ensure all required attributes are present and validate against the provided metamodel.
";

pub const RATE_INSTRUCTIONS: &str = "\
You are an expert at interpreting epidemiological equations and inserting computed rates into XML model files.

You are given:
1. A partially completed SEIR XML file, where all rate fields are marked as [[rate_missing]].
2. A user_input section that includes all relevant parameter values, formulas, and **explicit population data (e.g., S, I, N)** if required for calculations.

YOUR TASK:
1. Identify each [[rate_missing]] inside an <outgoingFlows> tag.
2. Use the description and flow direction (source → target) to determine which rate formula applies.
3. Compute the rate using the correct formula and **ONLY THE VALUES EXPLICITLY PROVIDED in the user_input**.
   - For contact-based flows (e.g., βSI/N), use the **exact population values (S, I, N)** given in the user_input.
   - **CRITICAL: If any variable (like N, S, or I for contact rates) required for computation is NOT explicitly provided in the user_input, you MUST NOT assume a value or attempt to derive it. Instead, leave a clear comment stating the missing variable and why the rate cannot be computed.**
4. Before writing the rate, first add a detailed comment explaining your full reasoning.
5. Then insert the final computed value as the rate.

IMPORTANT RULES:
- Do not round — use full numerical precision at all times.
- **DO NOT modify the XML structure, tags, or ANY EXISTING ATTRIBUTES (e.g., 'target', 'description') in the provided XML file.** Your ONLY task is to calculate and insert the 'rate' value and add comprehensive comments.
- If a rate cannot be computed (due to missing data, as per Rule 3), leave a clear comment:
    <!-- Rate cannot be computed: N is not provided in user_input. -->

How to Write Reasoning (Baby-Step Style):
  For each <outgoingFlows> you process:
    First, add a full step-by-step comment above the rate:
      - Use simple language, no skipped math
      - Treat it like teaching someone new to equations
      - Explain each substitution and operation clearly
      - Then, insert the rate based on that computation.
  Example:
        <!-- Step 1: The flow E -> I is the end of latency, so the rate is σ.
             Step 2: σ = 1/7 days = 0.14285714285714285 per day. -->
        <outgoingFlows rate=\"0.14285714285714285\" target=\"//@compartments.2\" description=\"Example flow\">
      </outgoingFlows>

Final Note: Your only task is to calculate and insert correct rate values. Please Do not add, remove, or reorder compartments or flows. Also don't change the target parameter in any outgoingFlows tag.
";

/// Assembles the two stage prompts. Pure string formatting; no validation,
/// no I/O.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Stage 1: instructions, already pretty-printed metamodel, tabular input.
    /// The diagram travels alongside this text, not inside it.
    pub fn structure_prompt(metamodel: &str, user_input: &str) -> String {
        let mut prompt = String::new();

        push_section(&mut prompt, "PROMPT: \n", STRUCTURE_INSTRUCTIONS, true);
        push_section(&mut prompt, "METAMODEL: \n", metamodel, true);
        push_section(&mut prompt, "USER_INPUT: \n", user_input, false);

        prompt.trim().to_string()
    }

    /// Stage 2: instructions, tabular input, stage-1 XML.
    pub fn rate_prompt(user_input: &str, structure_xml: &str) -> String {
        let mut prompt = String::new();

        push_section(&mut prompt, "PROMPT:\n", RATE_INSTRUCTIONS, true);
        push_section(&mut prompt, "USER INPUT:\n", user_input, true);
        push_section(
            &mut prompt,
            "STRUCTURALLY CORRECT SEIRMODEL FILE:\n",
            structure_xml,
            true,
        );
        prompt.push_str(&separator());

        prompt.trim().to_string()
    }
}

fn push_section(prompt: &mut String, label: &str, body: &str, newline: bool) {
    prompt.push_str(&separator());
    prompt.push_str(label);
    prompt.push_str(body.trim());
    if newline {
        prompt.push('\n');
    }
}
