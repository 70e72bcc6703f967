/// Interactive prompts for the command line.
use crate::error::Result;
use std::io::{self, BufRead, Write};

const PREVIEW_LIMIT: usize = 5;

/// Ask on the terminal before permanently deleting `file_ids`. `force` skips the prompt.
pub fn confirm_deletion(file_ids: &[String], force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    confirm_with(file_ids, &mut io::stdin().lock(), &mut io::stdout())
}

fn confirm_with(
    file_ids: &[String],
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<bool> {
    writeln!(
        output,
        "Permanently delete {} file(s)? They bypass the trash and cannot be restored.",
        file_ids.len()
    )?;
    for file_id in file_ids.iter().take(PREVIEW_LIMIT) {
        writeln!(output, "  {file_id}")?;
    }
    let hidden = file_ids.len().saturating_sub(PREVIEW_LIMIT);
    if hidden > 0 {
        writeln!(output, "  ... and {hidden} more")?;
    }
    write!(output, "Continue? (y/N): ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
