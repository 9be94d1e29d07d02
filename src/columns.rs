//! Column declarations and name lookup for a loop block.
//!
//! Also backs the `columns` command, which lists a section's declared columns
//! as a table or as JSON.

use std::collections::HashMap;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{cli::ColumnsArgs, io_utils, scanner, table};

/// Zero-based position of a resolved column within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnPos(usize);

impl ColumnPos {
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub name: String,
    pub ordinal: Option<u32>,
}

impl Declaration {
    /// Parses `_rlnAngleRot #3`. The ordinal is the first later token of the
    /// form `#N`; a line without one still declares a column.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next()?.to_string();
        let ordinal = tokens.find_map(|token| token.strip_prefix('#')?.parse::<u32>().ok());
        Some(Self { name, ordinal })
    }

    pub fn render(name: &str, ordinal: u32) -> String {
        format!("{name} #{ordinal}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    declarations: Vec<Declaration>,
    positions: HashMap<String, ColumnPos>,
}

impl ColumnIndex {
    pub fn build<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let declarations = lines
            .into_iter()
            .filter_map(Declaration::parse)
            .collect::<Vec<_>>();
        let mut positions = HashMap::with_capacity(declarations.len());
        for (idx, declaration) in declarations.iter().enumerate() {
            positions
                .entry(declaration.name.clone())
                .or_insert(ColumnPos(idx));
        }
        Self {
            declarations,
            positions,
        }
    }

    /// First declaration named exactly `name`.
    pub fn lookup(&self, name: &str) -> Option<ColumnPos> {
        self.positions.get(name).copied()
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Highest explicit ordinal, or 0 when no declaration carries one.
    pub fn max_ordinal(&self) -> u32 {
        self.declarations
            .iter()
            .filter_map(|d| d.ordinal)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
struct ColumnListing<'a> {
    position: usize,
    name: &'a str,
    ordinal: Option<u32>,
}

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let document = io_utils::read_document(&args.input, encoding)?;
    let dialect = scanner::Dialect::default();
    let layout = scanner::scan_table(&document, &dialect, &args.section)
        .with_context(|| format!("Scanning {:?}", args.input))?;
    let index = ColumnIndex::build(layout.declaration_lines(&document));

    let listing = index
        .declarations()
        .iter()
        .enumerate()
        .map(|(idx, d)| ColumnListing {
            position: idx + 1,
            name: &d.name,
            ordinal: d.ordinal,
        })
        .collect::<Vec<_>>();

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&listing).context("Serializing column listing")?;
        println!("{rendered}");
    } else {
        let headers = vec!["#".to_string(), "name".to_string(), "ordinal".to_string()];
        let rows = listing
            .iter()
            .map(|entry| {
                vec![
                    entry.position.to_string(),
                    entry.name.to_string(),
                    entry.ordinal.map(|o| format!("#{o}")).unwrap_or_default(),
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }
    info!(
        "Listed {} column(s) and {} data row(s) from '{}' in {:?}",
        index.len(),
        layout.data.len(),
        args.section,
        args.input
    );
    Ok(())
}
