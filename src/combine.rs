//! Sorting a source table by extracted key and merging selected columns into
//! a target table (the `combine` command).
//!
//! The source rows are ordered by the key of `key_column` (see
//! [`crate::key`]), the requested columns are pulled from each sorted row, and
//! the value sets are appended to the target rows by position. Row order is
//! the only link between the two files; [`Alignment`] decides whether a
//! row-count mismatch is ignored, logged, or fatal.

use anyhow::{Context, Result as AnyResult};
use clap::ValueEnum;
use log::{debug, info, warn};

use crate::{
    cli::CombineArgs,
    columns::{ColumnIndex, ColumnPos},
    document::Document,
    error::{Anomaly, Result, StarError},
    io_utils, key, merge,
    rows::{Row, RowCodec},
    scanner::{self, DEFAULT_SECTION, Dialect, TableLayout},
};

pub const DEFAULT_KEY_COLUMN: &str = "_rlnMicrographName";
pub const DEFAULT_MERGE_COLUMNS: [&str; 3] =
    ["_rlnHelicalTubeID", "_rlnAngleTiltPrior", "_rlnAnglePsiPrior"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Alignment {
    /// Merge without comparing row counts
    Off,
    /// Log a warning when row counts differ
    #[default]
    Warn,
    /// Abort when row counts differ
    Strict,
}

#[derive(Debug, Clone)]
pub struct CombineOptions {
    pub dialect: Dialect,
    pub source_section: String,
    pub target_section: String,
    pub key_column: String,
    pub columns: Vec<String>,
    pub alignment: Alignment,
    /// Value used for a column the source row is too short to provide.
    pub placeholder: String,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            source_section: DEFAULT_SECTION.to_string(),
            target_section: DEFAULT_SECTION.to_string(),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            columns: DEFAULT_MERGE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            alignment: Alignment::default(),
            placeholder: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceRow {
    pub line: usize,
    pub key: u64,
    pub row: Row,
}

#[derive(Debug, Clone)]
pub struct SortedSource {
    pub layout: TableLayout,
    pub columns: ColumnIndex,
    pub rows: Vec<SourceRow>,
    pub anomalies: Vec<Anomaly>,
}

impl SortedSource {
    /// The source document with its data rows replaced by the sorted rows,
    /// re-encoded with the two-space separator.
    pub fn render(&self, source: &Document) -> Document {
        let mut sorted = source.clone();
        let body = self
            .rows
            .iter()
            .map(|r| r.row.encode(RowCodec::Rejoin))
            .collect::<Vec<_>>();
        sorted.splice(self.layout.data.clone(), body);
        sorted
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineReport {
    pub source_rows: usize,
    pub target_rows: usize,
    pub rows_extended: usize,
    pub anomalies: Vec<Anomaly>,
}

fn require(columns: &ColumnIndex, name: &str, section: &str) -> Result<ColumnPos> {
    columns
        .lookup(name)
        .ok_or_else(|| StarError::RequiredColumnMissing {
            column: name.to_string(),
            section: section.to_string(),
        })
}

/// Reads the source table and orders its rows by the key in `key_column`.
/// Rows too short to hold the key are kept, sorted last, and reported.
pub fn sort_source(
    source: &Document,
    dialect: &Dialect,
    section: &str,
    key_column: &str,
) -> Result<SortedSource> {
    let layout = scanner::scan_table(source, dialect, section)?;
    let columns = ColumnIndex::build(layout.declaration_lines(source));
    let key_pos = require(&columns, key_column, section)?;

    let mut anomalies = Vec::new();
    let mut rows = Vec::with_capacity(layout.data.len());
    for line_idx in layout.data.clone() {
        let Some(line) = source.line(line_idx) else {
            break;
        };
        let row = Row::decode(line);
        if row.is_blank() {
            continue;
        }
        let key = match row.get(key_pos) {
            Some(value) => key::extract_key(value),
            None => {
                anomalies.push(Anomaly::RowShortfall {
                    line: line_idx,
                    column: key_column.to_string(),
                    width: row.width(),
                });
                key::UNKEYED
            }
        };
        rows.push(SourceRow {
            line: line_idx,
            key,
            row,
        });
    }

    let rows = key::sort_rows_by_key(rows, |r| r.key);
    Ok(SortedSource {
        layout,
        columns,
        rows,
        anomalies,
    })
}

/// Pulls `names` from every sorted row, in sorted order. A row too short for
/// any requested column contributes `placeholder` for every column.
pub fn extract_columns(
    sorted: &SortedSource,
    names: &[String],
    placeholder: &str,
) -> Result<(Vec<Vec<String>>, Vec<Anomaly>)> {
    let positions = names
        .iter()
        .map(|name| require(&sorted.columns, name, &sorted.layout.marker))
        .collect::<Result<Vec<_>>>()?;

    let mut anomalies = Vec::new();
    let values = sorted
        .rows
        .iter()
        .map(|source| {
            let picked = positions
                .iter()
                .map(|pos| source.row.get(*pos))
                .collect::<Option<Vec<_>>>();
            match picked {
                Some(values) => values.into_iter().map(str::to_string).collect(),
                None => {
                    let missing = positions
                        .iter()
                        .zip(names)
                        .find(|(pos, _)| source.row.get(**pos).is_none())
                        .map(|(_, name)| name.clone())
                        .unwrap_or_default();
                    anomalies.push(Anomaly::RowShortfall {
                        line: source.line,
                        column: missing,
                        width: source.row.width(),
                    });
                    vec![placeholder.to_string(); names.len()]
                }
            }
        })
        .collect();
    Ok((values, anomalies))
}

/// Merges the configured source columns into `target` in place and returns
/// the sorted source document alongside the report.
///
/// Every fatal check runs before `target` is modified.
pub fn combine(
    source: &Document,
    target: &mut Document,
    options: &CombineOptions,
) -> Result<(Document, CombineReport)> {
    let sorted = sort_source(
        source,
        &options.dialect,
        &options.source_section,
        &options.key_column,
    )?;
    let (values, extract_anomalies) =
        extract_columns(&sorted, &options.columns, &options.placeholder)?;

    let layout = scanner::scan_table(target, &options.dialect, &options.target_section)?;
    let target_rows = layout
        .data
        .clone()
        .filter(|idx| target.line(*idx).is_some_and(|l| !l.trim().is_empty()))
        .count();

    if target_rows != values.len() {
        match options.alignment {
            Alignment::Off => {}
            Alignment::Warn => warn!(
                "Target has {target_rows} data row(s) but the sorted source provides {}; merging by position anyway",
                values.len()
            ),
            Alignment::Strict => {
                return Err(StarError::RowCountMismatch {
                    target: target_rows,
                    source_rows: values.len(),
                });
            }
        }
    }

    debug!(
        "Merging {:?} into '{}' after line {}",
        options.columns,
        options.target_section,
        layout.declaration_end()
    );
    let rows_extended = merge::merge_into(target, &layout, &values, &options.columns);

    let mut anomalies = sorted.anomalies.clone();
    anomalies.extend(extract_anomalies);
    let report = CombineReport {
        source_rows: sorted.rows.len(),
        target_rows,
        rows_extended,
        anomalies,
    };
    Ok((sorted.render(source), report))
}

pub fn execute(args: &CombineArgs) -> AnyResult<()> {
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    info!(
        "Combining columns from {:?} into {:?}",
        args.source, args.target
    );

    let source = io_utils::read_document(&args.source, input_encoding)?;
    let mut target = io_utils::read_document(&args.target, input_encoding)?;

    let mut options = CombineOptions {
        source_section: args.source_section.clone(),
        target_section: args.target_section.clone(),
        key_column: args.key_column.clone(),
        alignment: args.alignment,
        placeholder: args.placeholder.clone(),
        ..CombineOptions::default()
    };
    let columns = args
        .columns
        .iter()
        .flat_map(|s| s.split(','))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    if !columns.is_empty() {
        options.columns = columns;
    }

    let (sorted, report) = combine(&source, &mut target, &options)
        .with_context(|| format!("Combining {:?} into {:?}", args.source, args.target))?;

    if let Some(path) = &args.sorted_output {
        io_utils::write_document(Some(path), &sorted, output_encoding)?;
        info!("Sorted source written to {:?}", path);
    }
    io_utils::write_document(args.output.as_deref(), &target, output_encoding)?;

    for anomaly in &report.anomalies {
        debug!("{anomaly}");
    }
    info!(
        "Extended {} of {} target row(s) with {} column(s) from {} sorted source row(s); {} anomaly(ies) tolerated -> {}",
        report.rows_extended,
        report.target_rows,
        options.columns.len(),
        report.source_rows,
        report.anomalies.len(),
        io_utils::describe_destination(args.output.as_deref())
    );
    Ok(())
}
