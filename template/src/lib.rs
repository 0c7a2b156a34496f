//! Literal `@NAME@` token substitution over whole text files. No
//! templating language: tokens are matched as exact substrings and
//! everything else passes through byte for byte.

use std::{fs, path::Path};

/// Errors raised while expanding a template file.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("The template {0} could not be read: {1}")]
    ReadError(std::path::PathBuf, std::io::Error),
    #[error("The output {0} could not be written: {1}")]
    WriteError(std::path::PathBuf, std::io::Error),
}

/// Replace every occurrence of `@NAME@` for each `(NAME, value)` pair.
pub fn render(text: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = text.to_string();
    for (name, value) in substitutions {
        out = out.replace(&format!("@{name}@"), value);
    }
    out
}

/// Read `input` as text, substitute the tokens, and write the result to
/// `output`, creating or overwriting it. A failed write is not rolled
/// back.
pub fn expand_file(
    input: &Path,
    output: &Path,
    substitutions: &[(&str, &str)],
) -> Result<(), TemplateError> {
    let text = fs::read_to_string(input)
        .map_err(|err| TemplateError::ReadError(input.to_path_buf(), err))?;
    let rendered = render(&text, substitutions);
    fs::write(output, &rendered)
        .map_err(|err| TemplateError::WriteError(output.to_path_buf(), err))?;
    tracing::info!("expanded {:?} into {:?}", input, output);
    Ok(())
}
