//! # Output Rendering
//!
//! Plain-text and JSON views of command results.
//!
//! ## Text Layout
//! ```text
//! ✓ copy added to existing book
//!
//!  ID  TITLE       AUTHOR   ISBN  AVAILABLE
//!   1  Dune        Herbert  111   1/2
//!   2  Emma        Austen   222   1/1
//!
//! 2 titles, 3 copies, 2 available, 1 on loan
//! ```
//!
//! Every writer takes `impl Write` so tests render into a `Vec<u8>`.

use serde::Serialize;
use std::io::{self, Write};

use crate::commands::{BookDto, Snapshot};
use crate::error::{ApiError, ShellResult};
use shelf_core::{InventoryStats, Outcome};

/// Longest title or author shown in the table before truncation.
const MAX_CELL_WIDTH: usize = 40;

/// Writes the outcome of a mutating command.
pub fn render_outcome(out: &mut impl Write, outcome: &Outcome) -> io::Result<()> {
    let mark = if outcome.is_success() { '✓' } else { '✗' };
    writeln!(out, "{} {}", mark, outcome.message())
}

/// Writes an error from a read command.
pub fn render_error(out: &mut impl Write, err: &ApiError) -> io::Result<()> {
    writeln!(out, "✗ {}", err.message)
}

/// Writes a snapshot: optional search header, table and totals.
pub fn render_snapshot(out: &mut impl Write, snapshot: &Snapshot) -> io::Result<()> {
    if let Some(query) = snapshot.query.as_deref().filter(|q| !q.is_empty()) {
        writeln!(out, "Search: \"{}\"", query)?;
    }
    render_books(out, &snapshot.books)?;
    writeln!(out)?;
    render_stats(out, &snapshot.stats)
}

/// Writes books as an aligned table.
pub fn render_books(out: &mut impl Write, books: &[BookDto]) -> io::Result<()> {
    if books.is_empty() {
        return writeln!(out, "(no books)");
    }

    let rows: Vec<[String; 5]> = books
        .iter()
        .map(|b| {
            [
                b.id.to_string(),
                truncate(&b.title, MAX_CELL_WIDTH),
                truncate(&b.author, MAX_CELL_WIDTH),
                b.isbn.clone(),
                format!("{}/{}", b.available_copies, b.total_copies),
            ]
        })
        .collect();

    let header = ["ID", "TITLE", "AUTHOR", "ISBN", "AVAILABLE"].map(String::from);
    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in std::iter::once(&header).chain(&rows) {
        // Id column is right-aligned, the rest left-aligned
        let mut line = format!("{:>w$}", row[0], w = widths[0]);
        for (cell, width) in row.iter().zip(widths).skip(1) {
            line.push_str("  ");
            line.push_str(cell);
            line.extend(std::iter::repeat(' ').take(width - cell.chars().count()));
        }
        writeln!(out, "{}", line.trim_end())?;
    }

    Ok(())
}

/// Writes one book in detail.
pub fn render_book(out: &mut impl Write, book: &BookDto) -> io::Result<()> {
    writeln!(out, "Book #{}", book.id)?;
    writeln!(out, "  Title:     {}", book.title)?;
    writeln!(out, "  Author:    {}", book.author)?;
    writeln!(out, "  ISBN:      {}", book.isbn)?;
    writeln!(
        out,
        "  Copies:    {} total, {} available, {} on loan",
        book.total_copies, book.available_copies, book.on_loan
    )?;
    writeln!(
        out,
        "  Updated:   {}",
        book.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Writes the totals line.
pub fn render_stats(out: &mut impl Write, stats: &InventoryStats) -> io::Result<()> {
    writeln!(
        out,
        "{} {}, {} {}, {} available, {} on loan",
        stats.titles,
        plural(stats.titles, "title", "titles"),
        stats.total_copies,
        plural(stats.total_copies, "copy", "copies"),
        stats.available_copies,
        stats.on_loan
    )
}

/// Writes any serializable value as pretty JSON.
pub fn render_json<T: Serialize>(out: &mut impl Write, value: &T) -> ShellResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn plural<'a>(n: i64, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    cut.push('…');
    cut
}
