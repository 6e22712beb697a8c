use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB

/// Reads the whole document from `path`, or from stdin when `None`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open file: {}", path.display()))?;
            read_capped(file, &path.display().to_string())
        }
        None => read_capped(io::stdin().lock(), "stdin"),
    }
}

/// Reads at most [`MAX_INPUT_SIZE`] bytes of UTF-8 from `source`.
fn read_capped<R: Read>(source: R, name: &str) -> Result<String> {
    let mut buffer = Vec::new();
    // One byte past the cap is enough to detect oversize input.
    source
        .take(MAX_INPUT_SIZE as u64 + 1)
        .read_to_end(&mut buffer)
        .with_context(|| format!("Failed to read from {name}"))?;

    if buffer.len() > MAX_INPUT_SIZE {
        bail!(
            "Input from {name} exceeds maximum allowed size (1 MB).\n\n\
             Consider splitting it into smaller parts."
        );
    }

    String::from_utf8(buffer).with_context(|| format!("Input from {name} is not valid UTF-8"))
}
