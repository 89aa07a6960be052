// src/seeds.rs
// =============================================================================
// Loading the seed list.
//
// The seed file is plain text with one URL per line; surrounding whitespace
// is trimmed and blank lines are skipped. Validation happens later (invalid
// seeds are dropped by the orchestrator), so this file only deals with I/O.
//
// Failing to read the file is the one fatal error of a run.
// =============================================================================

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

pub fn load_seeds(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
    Ok(parse_seeds(&content))
}

fn parse_seeds(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// Asks for the seed file path on stdin (used when no path was given).
pub fn prompt_for_seed_file() -> Result<PathBuf> {
    print!("Enter the path to the file containing URLs: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read seed file path from stdin")?;

    let path = line.trim();
    if path.is_empty() {
        return Err(anyhow!("no seed file path given"));
    }
    Ok(PathBuf::from(path))
}
