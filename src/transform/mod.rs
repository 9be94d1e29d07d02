//! Numeric column transforms applied across every row of one loop block.
//!
//! A [`TransformPlan`] names a section, a row codec, and a list of
//! [`TransformOp`]s. Every op reads the original token of its own column, so
//! the ops of one plan are independent and their order does not matter. Plans
//! targeting one column twice are rejected.

pub mod angle;
pub mod plan;

use std::{collections::HashSet, fmt};

use anyhow::{Result as AnyResult, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    columns::{ColumnIndex, ColumnPos},
    document::Document,
    error::{Anomaly, Result, StarError},
    rows::{Row, RowCodec},
    scanner::{self, Dialect},
};

pub use plan::{Preset, TransformPlan};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Transform {
    /// `old + by`
    Offset { by: f64 },
    /// `(old + by) mod 360`
    Rotate { by: f64 },
    /// `-old + by`
    InvertOffset { by: f64 },
    /// `-old`
    Invert,
}

impl Transform {
    pub fn apply(self, old: f64) -> f64 {
        match self {
            Transform::Offset { by } => angle::offset(old, by),
            Transform::Rotate { by } => angle::rotate(old, by),
            Transform::InvertOffset { by } => angle::invert_offset(old, by),
            Transform::Invert => angle::invert(old),
        }
    }

    /// Rewrites a token, or returns `None` when it is not a finite number.
    pub fn rewrite(self, token: &str) -> Option<String> {
        angle::parse_angle(token).map(|old| angle::format_angle(self.apply(old)))
    }

    pub fn amount(self) -> Option<f64> {
        match self {
            Transform::Offset { by }
            | Transform::Rotate { by }
            | Transform::InvertOffset { by } => Some(by),
            Transform::Invert => None,
        }
    }

    /// Rejects NaN and infinite amounts.
    pub fn validate(self) -> AnyResult<()> {
        match self.amount() {
            Some(by) if !by.is_finite() => {
                Err(anyhow!("Invalid amount '{by}' for transform '{self}'"))
            }
            _ => Ok(()),
        }
    }

    /// Parses `offset:90`, `rotate:180`, `invert-offset:125`, or `invert`.
    pub fn parse(text: &str) -> AnyResult<Self> {
        let trimmed = text.trim();
        let (kind, amount) = match trimmed.split_once(':') {
            Some((kind, amount)) => (kind.trim(), Some(amount.trim())),
            None => (trimmed, None),
        };
        let by = || -> AnyResult<f64> {
            let raw = amount.ok_or_else(|| anyhow!("Transform '{kind}' requires an amount"))?;
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| anyhow!("Invalid amount '{raw}' for transform '{kind}'"))
        };
        match kind.to_ascii_lowercase().as_str() {
            "offset" => Ok(Transform::Offset { by: by()? }),
            "rotate" => Ok(Transform::Rotate { by: by()? }),
            "invert-offset" => Ok(Transform::InvertOffset { by: by()? }),
            "invert" if amount.is_none() => Ok(Transform::Invert),
            "invert" => Err(anyhow!(
                "Transform 'invert' takes no amount; use invert-offset:<k>"
            )),
            other => Err(anyhow!("Unknown transform '{other}'")),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Offset { by } => write!(f, "offset:{by}"),
            Transform::Rotate { by } => write!(f, "rotate:{by}"),
            Transform::InvertOffset { by } => write!(f, "invert-offset:{by}"),
            Transform::Invert => write!(f, "invert"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOp {
    pub column: String,
    pub transform: Transform,
    /// Missing required columns abort the plan; optional ones are skipped.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl TransformOp {
    pub fn new(column: impl Into<String>, transform: Transform) -> Self {
        Self {
            column: column.into(),
            transform,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Parses `COLUMN=KIND[:K]`, e.g. `_rlnAngleRot=rotate:180`.
    pub fn parse(text: &str) -> AnyResult<Self> {
        let (column, transform) = text
            .split_once('=')
            .ok_or_else(|| anyhow!("Operation '{text}' must look like COLUMN=KIND[:AMOUNT]"))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(anyhow!("Operation '{text}' is missing a column name"));
        }
        Ok(Self::new(column, Transform::parse(transform)?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub rows_scanned: usize,
    pub rows_rewritten: usize,
    pub tokens_rewritten: usize,
    pub skipped_columns: Vec<String>,
    pub anomalies: Vec<Anomaly>,
}

/// Applies `plan` to `document` in place.
///
/// Structural and required-column failures are reported before any line is
/// touched, so on `Err` the document is unchanged.
pub fn apply_plan(document: &mut Document, plan: &TransformPlan) -> Result<TransformReport> {
    apply(
        document,
        &plan.dialect,
        &plan.section,
        plan.codec,
        &plan.operations,
    )
}

pub fn apply(
    document: &mut Document,
    dialect: &Dialect,
    section: &str,
    codec: RowCodec,
    operations: &[TransformOp],
) -> Result<TransformReport> {
    ensure_distinct_targets(operations)?;
    let layout = scanner::scan_table(document, dialect, section)?;
    let columns = ColumnIndex::build(layout.declaration_lines(document));

    let mut report = TransformReport::default();
    let mut resolved: Vec<(&TransformOp, ColumnPos)> = Vec::with_capacity(operations.len());
    for op in operations {
        match columns.lookup(&op.column) {
            Some(pos) => {
                debug!("Resolved {} to position {}", op.column, pos.get() + 1);
                resolved.push((op, pos));
            }
            None if op.required => {
                return Err(StarError::RequiredColumnMissing {
                    column: op.column.clone(),
                    section: section.to_string(),
                });
            }
            None => {
                warn!("Column {} not declared in '{section}'; skipping", op.column);
                report.skipped_columns.push(op.column.clone());
            }
        }
    }

    for line_idx in layout.data.clone() {
        let Some(line) = document.line(line_idx) else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        report.rows_scanned += 1;
        let mut row = Row::decode(line);
        let mut changed = 0usize;
        for (op, pos) in &resolved {
            let Some(token) = row.get(*pos).map(str::to_string) else {
                report.anomalies.push(Anomaly::RowShortfall {
                    line: line_idx,
                    column: op.column.clone(),
                    width: row.width(),
                });
                continue;
            };
            match op.transform.rewrite(&token) {
                Some(value) => {
                    row.set(*pos, value);
                    changed += 1;
                }
                None => report.anomalies.push(Anomaly::TokenConversion {
                    line: line_idx,
                    column: op.column.clone(),
                    token,
                }),
            }
        }
        if changed > 0 {
            document.replace_line(line_idx, row.encode(codec));
            report.rows_rewritten += 1;
            report.tokens_rewritten += changed;
        }
    }

    Ok(report)
}

fn ensure_distinct_targets(operations: &[TransformOp]) -> Result<()> {
    let mut seen = HashSet::with_capacity(operations.len());
    for op in operations {
        if !seen.insert(op.column.as_str()) {
            return Err(StarError::ConflictingTransforms {
                column: op.column.clone(),
            });
        }
    }
    Ok(())
}
