//! Data row decoding and encoding.
//!
//! Provides [`Row`], a tokenized data line whose fields are addressed through
//! [`ColumnPos`] values resolved by a [`crate::columns::ColumnIndex`], and
//! [`RowCodec`], which selects how a modified row is written back:
//!
//! - [`RowCodec::Rejoin`] joins fields with two spaces (visual alignment is lost).
//! - [`RowCodec::Preserve`] keeps the original leading, inter-field, and
//!   trailing whitespace byte-for-byte and only swaps the changed field text.
//!
//! Blank lines are never decoded; callers pass them through unchanged.

use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::columns::ColumnPos;

pub const FIELD_SEPARATOR: &str = "  ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowCodec {
    #[default]
    Rejoin,
    Preserve,
}

impl FromStr for RowCodec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rejoin" => Ok(RowCodec::Rejoin),
            "preserve" => Ok(RowCodec::Preserve),
            other => Err(anyhow!("Unknown row codec '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    fields: Vec<String>,
    // gaps[0] precedes the first field; gaps[fields.len()] trails the last.
    gaps: Vec<String>,
}

impl Row {
    pub fn decode(line: &str) -> Self {
        let mut fields = Vec::new();
        let mut gaps = Vec::new();
        let mut rest = line;
        loop {
            let field_start = rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len());
            gaps.push(rest[..field_start].to_string());
            rest = &rest[field_start..];
            if rest.is_empty() {
                break;
            }
            let field_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            fields.push(rest[..field_end].to_string());
            rest = &rest[field_end..];
        }
        Self { fields, gaps }
    }

    pub fn from_fields(fields: Vec<String>) -> Self {
        let mut gaps = vec![String::new()];
        gaps.extend((1..fields.len()).map(|_| FIELD_SEPARATOR.to_string()));
        if !fields.is_empty() {
            gaps.push(String::new());
        }
        Self { fields, gaps }
    }

    pub fn encode(&self, codec: RowCodec) -> String {
        match codec {
            RowCodec::Rejoin => self.fields.join(FIELD_SEPARATOR),
            RowCodec::Preserve => {
                let mut out = String::new();
                for (idx, gap) in self.gaps.iter().enumerate() {
                    out.push_str(gap);
                    if let Some(field) = self.fields.get(idx) {
                        out.push_str(field);
                    }
                }
                out
            }
        }
    }

    pub fn get(&self, pos: ColumnPos) -> Option<&str> {
        self.fields.get(pos.get()).map(String::as_str)
    }

    /// Replaces the field at `pos`. Returns false, leaving the row untouched,
    /// when the row is too short.
    pub fn set(&mut self, pos: ColumnPos, value: String) -> bool {
        match self.fields.get_mut(pos.get()) {
            Some(field) => {
                *field = value;
                true
            }
            None => false,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }

    pub fn is_blank(&self) -> bool {
        self.fields.is_empty()
    }
}
