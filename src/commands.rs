pub mod bookmark;
pub mod comment;
pub mod serve;
pub mod track;
pub mod validate;

use anyhow::{Context, Result};
use std::io::Read;

/// Fragments from the command line, or one per stdin line when none are given.
pub(crate) fn read_fragments(args: Vec<String>) -> Result<Vec<Option<String>>> {
    if !args.is_empty() {
        return Ok(args.into_iter().map(Some).collect());
    }
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read fragments from stdin")?;
    Ok(input.lines().map(|line| Some(line.to_string())).collect())
}
