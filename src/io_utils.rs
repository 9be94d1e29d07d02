//! I/O utilities for reading and writing STAR documents.
//!
//! All file I/O in star-managed flows through this module. It provides:
//!
//! - **Encoding**: input decoding and output transcoding via `encoding_rs`,
//!   defaulting to UTF-8.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.
//! - **All-or-nothing output**: a document is rendered completely in memory
//!   before the destination is created, so a failed operation never leaves a
//!   partial file behind.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::document::Document;

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn encode_text(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_8 {
        return Ok(text.as_bytes().to_vec());
    }
    let (encoded, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(anyhow!("Failed to encode text using {}", encoding.name()));
    }
    Ok(encoded.into_owned())
}

pub fn read_document(path: &Path, encoding: &'static Encoding) -> Result<Document> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading document from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    let text = decode_bytes(&bytes, encoding).with_context(|| format!("Decoding {path:?}"))?;
    Ok(Document::parse(&text))
}

pub fn write_document(
    path: Option<&Path>,
    document: &Document,
    encoding: &'static Encoding,
) -> Result<()> {
    let bytes = encode_text(&document.render(), encoding)?;
    let mut writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout().lock()),
    };
    writer
        .write_all(&bytes)
        .context("Writing output document")?;
    writer.flush().context("Flushing output document")?;
    Ok(())
}

pub fn describe_destination(path: Option<&Path>) -> String {
    match path {
        Some(p) if !is_dash(p) => p.display().to_string(),
        _ => "stdout".to_string(),
    }
}
