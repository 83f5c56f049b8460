//! Loan requests read as JSON from a `--input` file or a piped stdin.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use loan_calc_core::validation::LoanInput;
use loan_calc_core::{LoanCalcError, LoanCalcResult};

/// Decode a loan request. `origin` names where the text came from so a
/// malformed request can be traced back to its file or to stdin.
pub fn parse_request(text: &str, origin: &str) -> LoanCalcResult<LoanInput> {
    serde_json::from_str(text).map_err(|e| {
        LoanCalcError::SerializationError(format!("{origin} is not a loan request: {e}"))
    })
}

pub fn from_file(path: &str) -> Result<LoanInput, Box<dyn std::error::Error>> {
    let resolved = resolve_path(path)?;
    tracing::debug!(path = %resolved.display(), "reading loan request file");
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    Ok(parse_request(&contents, &format!("'{}'", resolved.display()))?)
}

/// None when stdin is a terminal or the pipe carries nothing.
pub fn from_stdin() -> Result<Option<LoanInput>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    tracing::debug!(bytes = trimmed.len(), "loan request piped on stdin");
    Ok(Some(parse_request(trimmed, "stdin")?))
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.exists() {
        return Err(format!("File not found: {}", resolved.display()).into());
    }
    if !resolved.is_file() {
        return Err(format!("Not a file: {}", resolved.display()).into());
    }
    Ok(resolved)
}
