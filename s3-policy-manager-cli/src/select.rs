//! Interactive bucket selection: numbered list, comma-delimited indices or
//! `all`, re-prompting on invalid input.

use anyhow::{bail, Context, Result};
use s3_policy_manager_core::{S3PolicyManagerError, S3PolicyManagerResult};
use std::io::{BufRead, Write};

/// Parse a selection like `1,3` or `all` into zero-based indices.
///
/// Indices are 1-based as displayed, deduplicated, and kept in typed order
/// so the operation processes buckets in the order the user asked for.
pub fn parse_selection(input: &str, available: usize) -> S3PolicyManagerResult<Vec<usize>> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        return Ok((0..available).collect());
    }
    if trimmed.is_empty() {
        return Err(S3PolicyManagerError::InvalidSelection(
            "enter comma-separated bucket numbers or 'all'".to_string(),
        ));
    }

    let mut indices = Vec::new();
    for part in trimmed.split(',') {
        let number: usize = part.trim().parse().map_err(|_| {
            S3PolicyManagerError::InvalidSelection(format!("'{}' is not a number", part.trim()))
        })?;
        if number < 1 || number > available {
            return Err(S3PolicyManagerError::InvalidSelection(format!(
                "bucket number {number} is out of range (1-{available})"
            )));
        }
        let index = number - 1;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    Ok(indices)
}

/// Prompt on stdin until a valid selection is entered; EOF aborts.
pub fn prompt_for_buckets(buckets: &[String]) -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    println!("\nAvailable buckets:");
    for (i, bucket) in buckets.iter().enumerate() {
        println!("{}. {bucket}", i + 1);
    }

    loop {
        print!("\nEnter bucket numbers (comma-separated) or 'all': ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next() else {
            bail!("no selection entered");
        };
        let line = line.context("failed to read selection")?;

        match parse_selection(&line, buckets.len()) {
            Ok(indices) => {
                return Ok(indices.into_iter().map(|i| buckets[i].clone()).collect());
            }
            Err(e) => println!("{e}"),
        }
    }
}
