//! Line-oriented CSV parsing for the per-timeframe question files.
//!
//! Each data line is split by a two-state scanner: a double quote toggles
//! between [`ScanState::OutsideQuotes`] and [`ScanState::InsideQuotes`], and a
//! comma only ends a field while outside quotes. Quote characters themselves
//! are dropped. A doubled quote (`""`) inside a quoted field is *not* an
//! escape; it simply toggles twice.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{Difficulty, Question};

/// Minimum number of fields a data line must yield to be accepted.
pub const REQUIRED_FIELDS: usize = 6;

const QUOTE: char = '"';
const SEPARATOR: char = ',';

// ── Scanner ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    OutsideQuotes,
    InsideQuotes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Quote,
    Separator,
    Other,
}

fn classify(c: char) -> CharClass {
    match c {
        QUOTE => CharClass::Quote,
        SEPARATOR => CharClass::Separator,
        _ => CharClass::Other,
    }
}

/// Incremental field splitter for a single line.
#[derive(Debug)]
pub struct LineScanner {
    state: ScanState,
    current: String,
    fields: Vec<String>,
}

impl LineScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::OutsideQuotes,
            current: String::new(),
            fields: Vec::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Advance the scanner by one character.
    pub fn feed(&mut self, c: char) {
        match (self.state, classify(c)) {
            (ScanState::OutsideQuotes, CharClass::Quote) => self.state = ScanState::InsideQuotes,
            (ScanState::InsideQuotes, CharClass::Quote) => self.state = ScanState::OutsideQuotes,
            (ScanState::OutsideQuotes, CharClass::Separator) => {
                self.fields.push(std::mem::take(&mut self.current));
            }
            (ScanState::InsideQuotes, CharClass::Separator) | (_, CharClass::Other) => {
                self.current.push(c);
            }
        }
    }

    /// Close the trailing field and return every field seen.
    ///
    /// An unterminated quote is not an error; whatever was collected becomes
    /// the last field.
    pub fn finish(mut self) -> Vec<String> {
        self.fields.push(self.current);
        self.fields
    }
}

impl Default for LineScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Split one line into raw, untrimmed fields.
pub fn split_line(line: &str) -> Vec<String> {
    let mut scanner = LineScanner::new();
    for c in line.chars() {
        scanner.feed(c);
    }
    scanner.finish()
}

// ── Record parsing ────────────────────────────────────────────────────────────

/// Parse a whole CSV file body into questions.
///
/// The first line is a header and is ignored. Blank lines and lines with fewer
/// than [`REQUIRED_FIELDS`] fields are dropped silently. Extra fields beyond
/// the sixth are ignored.
pub fn parse_questions(content: &str) -> Vec<Question> {
    let body = content.trim_start_matches('\u{feff}').trim();
    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() <= 1 {
        return Vec::new();
    }

    lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_record(line))
        .collect()
}

/// Map one data line to a [`Question`], or `None` when it is too short.
pub fn parse_record(line: &str) -> Option<Question> {
    let fields = split_line(line);
    if fields.len() < REQUIRED_FIELDS {
        return None;
    }
    Some(Question {
        id: lenient_int(&fields[0]),
        url: fields[1].trim().to_string(),
        title: fields[2].trim().to_string(),
        difficulty: Difficulty::parse(fields[3].trim()),
        acceptance: lenient_float(&fields[4]),
        frequency: lenient_float(&fields[5]),
    })
}

/// Integer from the leading numeric prefix of `raw`, or 0.
///
/// `" 42"` and `"42abc"` both give 42; `"abc"` gives 0.
pub fn lenient_int(raw: &str) -> i64 {
    static INT_PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = INT_PREFIX.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("regex is valid"));
    re.find(raw.trim_start())
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Float from the leading numeric prefix of `raw`, or 0.0.
pub fn lenient_float(raw: &str) -> f64 {
    static FLOAT_PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = FLOAT_PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("regex is valid")
    });
    re.find(raw.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
