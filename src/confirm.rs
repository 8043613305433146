//! Textual confirmation of detected breaks.
//!
//! The user may accept every candidate, pick a numbered subset, type a
//! custom selector or ask for a single image. I/O goes through any
//! `BufRead`/`Write` pair so the protocol can be driven from tests.

use crate::detect::{BreakCandidate, BreakDetector, PREVIEW_LEN};
use std::io::{self, BufRead, Write};

/// A parsed answer to the break confirmation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Use every detected break (empty answer)
    All,
    /// Render the document as a single image (`n`)
    NoBreaks,
    /// Ask for a custom CSS selector (`c`)
    Custom,
    /// 1-based candidate numbers, in the order typed. Numbers outside
    /// `1..=N` (zero and negatives included) are dropped when applied.
    Numbers(Vec<i64>),
    /// A token that is not an integer; treated as [`Choice::All`]
    Invalid,
}

/// Parse an answer to the confirmation prompt
pub fn parse_choice(answer: &str) -> Choice {
    let answer = answer.trim().to_lowercase();
    match answer.as_str() {
        "" => Choice::All,
        "n" => Choice::NoBreaks,
        "c" => Choice::Custom,
        _ => answer
            .split(',')
            .map(|n| n.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map(Choice::Numbers)
            .unwrap_or(Choice::Invalid),
    }
}

/// Print the detected breaks with a short text preview of each
pub fn display_breaks<W: Write>(
    detector: &BreakDetector,
    candidates: &[BreakCandidate],
    out: &mut W,
) -> io::Result<()> {
    if candidates.is_empty() {
        writeln!(out, "\nNo automatic break points detected.")?;
        return Ok(());
    }

    writeln!(out, "\nDetected {} potential break point(s):", candidates.len())?;
    writeln!(out, "{}", "-".repeat(60))?;
    for (i, candidate) in candidates.iter().enumerate() {
        writeln!(out, "{}. [{}] {}", i + 1, candidate.confidence, candidate.reason)?;
        writeln!(out, "   Selector: {}", candidate.selector)?;
        writeln!(out, "   Preview: {}", detector.preview(candidate.element, PREVIEW_LEN))?;
        writeln!(out)?;
    }
    Ok(())
}

/// Ask the user which selectors to use as breaks.
///
/// An empty result means "render the whole document as one image".
pub fn prompt_for_selectors<R: BufRead, W: Write>(
    detector: &BreakDetector,
    candidates: &[BreakCandidate],
    input: &mut R,
    out: &mut W,
) -> io::Result<Vec<String>> {
    let all = || candidates.iter().map(|c| c.selector.clone()).collect::<Vec<_>>();

    if candidates.is_empty() {
        writeln!(out, "\nNo automatic break points were detected.")?;
        writeln!(out, "Please provide a CSS selector to identify slides/sections.")?;
        writeln!(out, "Examples: '.slide', '#slides > div', 'section'")?;
        let selector = ask(input, out, "Enter CSS selector: ")?;
        return Ok(non_empty(selector));
    }

    display_breaks(detector, candidates, out)?;
    writeln!(out, "Options:")?;
    writeln!(out, "  [Enter] - Use all detected breaks")?;
    writeln!(out, "  [1-N]   - Use specific break numbers (comma-separated)")?;
    writeln!(out, "  [c]     - Enter custom CSS selector")?;
    writeln!(out, "  [n]     - No breaks (single image)")?;

    let answer = ask(input, out, "\nYour choice: ")?;
    let selectors = match parse_choice(&answer) {
        Choice::All => all(),
        Choice::NoBreaks => Vec::new(),
        Choice::Custom => non_empty(ask(input, out, "Enter custom CSS selector: ")?),
        Choice::Numbers(numbers) => numbers
            .into_iter()
            .filter_map(|n| usize::try_from(n).ok())
            .filter(|n| (1..=candidates.len()).contains(n))
            .map(|n| candidates[n - 1].selector.clone())
            .collect(),
        Choice::Invalid => {
            writeln!(out, "Invalid selection. Using all detected breaks.")?;
            all()
        }
    };
    Ok(selectors)
}

// End of input reads as an empty answer.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> io::Result<String> {
    write!(out, "{}", prompt)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn non_empty(selector: String) -> Vec<String> {
    if selector.is_empty() {
        Vec::new()
    } else {
        vec![selector]
    }
}
