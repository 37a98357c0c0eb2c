//! Tab-indented JSON output for word counts, the inverted index and query
//! results.
//!
//! Every element sits on its own line, keys are JSON-escaped strings and
//! scores carry eight decimal places. Empty containers close on the line
//! after they open.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use crate::core::error::Result;
use crate::core::types::{Location, PositionSet, Postings};
use crate::index::inverted::InvertedIndex;
use crate::query::results::QueryResults;
use crate::search::results::SearchResult;

fn indent<W: Write>(writer: &mut W, level: usize) -> io::Result<()> {
    for _ in 0..level {
        writer.write_all(b"\t")?;
    }
    Ok(())
}

fn quote<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, text)?;
    Ok(())
}

/// Writes `open`, one item per line at `level + 1`, then `close` at `level`
fn write_block<W, T, F>(
    writer: &mut W,
    (open, close): (&str, &str),
    items: impl IntoIterator<Item = T>,
    level: usize,
    mut write_item: F,
) -> io::Result<()>
where
    W: Write,
    F: FnMut(&mut W, T, usize) -> io::Result<()>,
{
    writeln!(writer, "{}", open)?;

    let mut empty = true;
    for item in items {
        if !empty {
            writer.write_all(b",\n")?;
        }
        empty = false;
        indent(writer, level + 1)?;
        write_item(writer, item, level + 1)?;
    }
    if !empty {
        writeln!(writer)?;
    }

    indent(writer, level)?;
    writer.write_all(close.as_bytes())
}

fn write_positions<W: Write>(writer: &mut W, positions: &PositionSet, level: usize) -> io::Result<()> {
    write_block(writer, ("[", "]"), positions, level, |writer, position, _| {
        write!(writer, "{}", position)
    })
}

fn write_postings<W: Write>(writer: &mut W, postings: &Postings, level: usize) -> io::Result<()> {
    write_block(writer, ("{", "}"), postings, level, |writer, (location, positions), level| {
        quote(writer, location)?;
        writer.write_all(b": ")?;
        write_positions(writer, positions, level)
    })
}

const SCORE_DECIMALS: usize = 8;

/// Score to eight decimal places, rounding its shortest decimal form half up
fn format_score(score: f64) -> String {
    if !score.is_finite() || score < 0.0 {
        return format!("{:.*}", SCORE_DECIMALS, score);
    }

    let shortest = score.to_string();
    let (whole, fraction) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    if fraction.len() <= SCORE_DECIMALS {
        return format!("{}.{:0<width$}", whole, fraction, width = SCORE_DECIMALS);
    }

    let mut digits: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes().take(SCORE_DECIMALS))
        .collect();
    if fraction.as_bytes()[SCORE_DECIMALS] >= b'5' {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - SCORE_DECIMALS;
    let text: String = digits.into_iter().map(char::from).collect();
    format!("{}.{}", &text[..split], &text[split..])
}

fn write_result<W: Write>(writer: &mut W, result: &SearchResult, level: usize) -> io::Result<()> {
    writeln!(writer, "{{")?;
    indent(writer, level + 1)?;
    writer.write_all(b"\"where\": ")?;
    quote(writer, &result.location)?;
    writeln!(writer, ",")?;
    indent(writer, level + 1)?;
    writeln!(writer, "\"count\": {},", result.count)?;
    indent(writer, level + 1)?;
    writeln!(writer, "\"score\": {}", format_score(result.score))?;
    indent(writer, level)?;
    writer.write_all(b"}")
}

/// `{"location": count, ...}`
pub fn write_counts<W: Write>(counts: &BTreeMap<Location, usize>, writer: &mut W) -> Result<()> {
    write_block(writer, ("{", "}"), counts, 0, |writer, (location, count), _| {
        quote(writer, location)?;
        write!(writer, ": {}", count)
    })?;
    Ok(())
}

/// `{"word": {"location": [positions], ...}, ...}`
pub fn write_index<W: Write>(index: &InvertedIndex, writer: &mut W) -> Result<()> {
    write_block(writer, ("{", "}"), index.iter(), 0, |writer, (word, postings), level| {
        quote(writer, word)?;
        writer.write_all(b": ")?;
        write_postings(writer, postings, level)
    })?;
    Ok(())
}

/// `{"query": [{"where": .., "count": .., "score": ..}, ...], ...}`
pub fn write_results<W: Write>(results: &QueryResults, writer: &mut W) -> Result<()> {
    write_block(writer, ("{", "}"), results.iter(), 0, |writer, (query, matches), level| {
        quote(writer, query)?;
        writer.write_all(b": ")?;
        write_block(writer, ("[", "]"), matches, level, write_result)
    })?;
    Ok(())
}

fn to_path<F>(path: &Path, render: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    render(&mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_counts_to_path(counts: &BTreeMap<Location, usize>, path: &Path) -> Result<()> {
    to_path(path, |writer| write_counts(counts, writer))
}

pub fn write_index_to_path(index: &InvertedIndex, path: &Path) -> Result<()> {
    to_path(path, |writer| write_index(index, writer))
}

pub fn write_results_to_path(results: &QueryResults, path: &Path) -> Result<()> {
    to_path(path, |writer| write_results(results, writer))
}
