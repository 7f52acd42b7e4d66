//! Interactive collection of the descriptive `General` fields.

use crate::{
    error::{Error, Result},
    store::HeaderField,
};
use std::io::{BufRead, Write};

const CONSENT_PROMPT: &str = "Would you like to set general project information to assist AI? (optional) (y/N): ";

/// The fields asked for by `cbatch init`, with their prompts.
pub const FIELD_PROMPTS: &[(&str, &str)] = &[
    ("codebase_type", "Enter Codebase Type (e.g., FastAPI backend, React frontend): "),
    ("deployment_location", "Enter Deployment Location (e.g., Vercel, AWS): "),
    ("general_description", "Enter General Description (e.g., AI Chatbot backend): "),
    ("execution_command", "Enter Execution Command (e.g., npm run dev, uvicorn ...): "),
];

/// Asks for the descriptive fields, reading answers from `input`.
///
/// Prompts go to `prompts`. Unless the first answer is `y` or `yes`, every
/// field is left empty. End of input counts as an empty answer. All fields
/// of [`FIELD_PROMPTS`] are always returned, in order.
///
/// # Errors
///
/// Returns an error if reading or prompting fails.
pub fn collect_fields<R: BufRead, W: Write>(
    input: &mut R,
    prompts: &mut W,
) -> Result<Vec<HeaderField>> {
    let consent = ask(input, prompts, CONSENT_PROMPT)?;
    let wanted = matches!(consent.to_lowercase().as_str(), "y" | "yes");

    if !wanted {
        writeln!(prompts, "Skipping general project information setup.").map_err(prompt_error)?;
    }

    FIELD_PROMPTS
        .iter()
        .map(|(key, prompt)| {
            let value = if wanted { ask(input, prompts, prompt)? } else { String::new() };
            Ok(HeaderField::new(*key, value))
        })
        .collect()
}

fn ask<R: BufRead, W: Write>(input: &mut R, prompts: &mut W, prompt: &str) -> Result<String> {
    write!(prompts, "{prompt}").map_err(prompt_error)?;
    prompts.flush().map_err(prompt_error)?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| Error::io("<stdin>", e))?;

    Ok(answer.trim().to_string())
}

fn prompt_error(e: std::io::Error) -> Error {
    Error::io("<stdout>", e)
}
