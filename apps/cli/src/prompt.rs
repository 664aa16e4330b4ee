//! # Interactive Prompt
//!
//! Reads one command per line and runs it with the same grammar as the
//! binary. The collection is re-rendered after every mutation.
//!
//! ## Session
//! ```text
//! shelf> add -t Dune -a "Frank Herbert" -i 111
//! ✓ new book created
//!
//! ID  TITLE  AUTHOR         ISBN  AVAILABLE
//!  1  Dune   Frank Herbert  111   1/1
//!
//! 1 title, 1 copy, 1 available, 0 on loan
//! shelf> quit
//! ```
//!
//! Parse errors are printed and the prompt continues. End of input, `quit`
//! and `exit` end the session.

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use clap::Parser;

use crate::cli::{Commands, PromptLine};
use crate::error::ShellResult;
use shelf_db::Database;

const PROMPT: &str = "shelf> ";

/// Runs the prompt until end of input or `quit`.
pub async fn run_prompt<R>(
    db: &Database,
    input: R,
    out: &mut impl Write,
    json: bool,
) -> ShellResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    if !json {
        writeln!(out, "Shelf interactive mode. Type 'help' for commands, 'quit' to leave.")?;
    }

    loop {
        if !json {
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let words = match split_words(&line) {
            Ok(words) => words,
            Err(e) => {
                writeln!(out, "✗ {}", e)?;
                continue;
            }
        };

        match words.first().map(String::as_str) {
            None => continue,
            Some("quit" | "exit") => break,
            Some(_) => {}
        }

        let command = match PromptLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // Covers `help` and `--help` as well as real mistakes
                write!(out, "{}", e.render())?;
                continue;
            }
        };

        debug!(?command, mutation = command.is_mutation(), "Prompt command");

        if command == Commands::Shell {
            writeln!(out, "Already in interactive mode")?;
            continue;
        }

        command.execute(db, out, json).await?;
    }

    if !json {
        writeln!(out)?;
    }
    Ok(())
}

/// Splits a line into words, honouring single and double quotes.
///
/// Inside double quotes a backslash escapes the next character.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err("unterminated single quote".into()),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch) => current.push(ch),
                            None => return Err("unterminated double quote".into()),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err("unterminated double quote".into()),
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}
