//! Section and loop location inside a loosely structured STAR document.
//!
//! Scanning is driven by a small state machine ([`ScanState`]) whose
//! transitions depend only on the current state and the trimmed content of
//! the next line:
//!
//! ```text
//! Outside --(line == marker)--> InSection --(line == loop_)--> InDeclarations
//! InDeclarations --(non-blank, non-declaration line)--> InData
//! InData --(blank line or other section marker)--> Outside
//! ```
//!
//! A section marker other than the addressed one closes the section from any
//! inner state.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{
    document::Document,
    error::{Result, StarError},
};

pub const DEFAULT_SECTION: &str = "data_particles";

/// Structural tokens recognized by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    pub section_prefix: String,
    pub loop_token: String,
    pub sigil: char,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            section_prefix: "data_".to_string(),
            loop_token: "loop_".to_string(),
            sigil: '_',
        }
    }
}

impl Dialect {
    /// True when `trimmed` opens a section other than `marker`.
    pub fn closes_section(&self, trimmed: &str, marker: &str) -> bool {
        trimmed.starts_with(self.section_prefix.as_str()) && trimmed != marker
    }

    pub fn is_declaration(&self, trimmed: &str) -> bool {
        trimmed.starts_with(self.sigil)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Outside,
    InSection,
    InDeclarations,
    InData,
}

impl ScanState {
    pub fn next(self, line: &str, dialect: &Dialect, marker: &str) -> ScanState {
        let trimmed = line.trim();
        match self {
            ScanState::Outside if trimmed == marker => ScanState::InSection,
            ScanState::Outside => ScanState::Outside,
            _ if dialect.closes_section(trimmed, marker) => ScanState::Outside,
            ScanState::InSection if trimmed == dialect.loop_token => ScanState::InDeclarations,
            ScanState::InSection => ScanState::InSection,
            ScanState::InDeclarations
                if trimmed.is_empty() || dialect.is_declaration(trimmed) =>
            {
                ScanState::InDeclarations
            }
            ScanState::InDeclarations => ScanState::InData,
            ScanState::InData if trimmed.is_empty() => ScanState::Outside,
            ScanState::InData => ScanState::InData,
        }
    }
}

/// Line positions of the addressed table, all as indices into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub marker: String,
    pub section: Range<usize>,
    pub loop_line: usize,
    pub declarations: Vec<usize>,
    pub data: Range<usize>,
}

impl TableLayout {
    /// Position directly after the last declaration line.
    pub fn declaration_end(&self) -> usize {
        self.declarations
            .last()
            .map(|idx| idx + 1)
            .unwrap_or(self.loop_line + 1)
    }

    pub fn declaration_lines<'a>(&'a self, document: &'a Document) -> Vec<&'a str> {
        self.declarations
            .iter()
            .filter_map(|idx| document.line(*idx))
            .collect()
    }
}

/// Half-open line range of the section opened by `marker`.
pub fn locate(document: &Document, dialect: &Dialect, marker: &str) -> Result<Range<usize>> {
    let lines = document.lines();
    let start = lines
        .iter()
        .position(|line| line.trim() == marker)
        .ok_or_else(|| StarError::SectionNotFound {
            marker: marker.to_string(),
        })?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| dialect.closes_section(line.trim(), marker))
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());
    Ok(start..end)
}

/// Index of the first loop-begin line inside `section`.
pub fn locate_loop(
    document: &Document,
    dialect: &Dialect,
    section: Range<usize>,
    marker: &str,
) -> Result<usize> {
    section
        .clone()
        .find(|idx| {
            document
                .line(*idx)
                .is_some_and(|line| line.trim() == dialect.loop_token)
        })
        .ok_or_else(|| StarError::LoopNotFound {
            marker: marker.to_string(),
            loop_token: dialect.loop_token.clone(),
        })
}

/// Returns the layout of the table in `marker`.
///
/// The loop line comes from [`locate_loop`]; the state machine then walks
/// from the line after it to split declarations from data rows.
pub fn scan_table(document: &Document, dialect: &Dialect, marker: &str) -> Result<TableLayout> {
    let section = locate(document, dialect, marker)?;
    let loop_line = locate_loop(document, dialect, section.clone(), marker)?;
    let mut state = ScanState::InDeclarations;
    let mut declarations = Vec::new();
    let mut data_start = None;
    let mut data_end = section.end;

    for (idx, line) in document.lines().iter().enumerate().skip(loop_line + 1) {
        let next = state.next(line, dialect, marker);
        match (state, next) {
            (ScanState::InDeclarations, ScanState::InDeclarations) => {
                if !line.trim().is_empty() {
                    declarations.push(idx);
                }
            }
            (ScanState::InDeclarations, ScanState::InData) => data_start = Some(idx),
            (ScanState::InDeclarations | ScanState::InData, ScanState::Outside) => {
                data_end = idx;
                break;
            }
            _ => {}
        }
        state = next;
    }

    let data = match data_start {
        Some(start) => start..data_end.max(start),
        None => data_end..data_end,
    };

    Ok(TableLayout {
        marker: marker.to_string(),
        section,
        loop_line,
        declarations,
        data,
    })
}
