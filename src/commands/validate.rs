use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::Read;
use std::path::Path;

use crate::schema::{validate_document, SchemaKind};

/// Validate a JSON document against a form schema. `-` reads stdin.
pub fn run(kind: SchemaKind, file: &Path) -> Result<()> {
    let raw = if file == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read document from stdin")?;
        input
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };

    match validate_document(kind, &raw) {
        Ok(()) => {
            println!("{} {} is a valid {:?} document", "✓".green(), file.display(), kind);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red(), file.display());
            bail!("{}", e)
        }
    }
}
