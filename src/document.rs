//! In-memory line buffer for a STAR file.
//!
//! A [`Document`] is only a list of lines. Sections, loops, and rows are found
//! by scanning (see [`crate::scanner`]) rather than by building a tree, so any
//! content the scanner does not address is written back exactly as read.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl Document {
    /// Splits `text` into lines, normalizing `\r\n` to `\n`.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = body
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self {
            lines,
            trailing_newline,
        }
    }

    pub fn render(&self) -> String {
        let capacity = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut out = String::with_capacity(capacity);
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(line);
        }
        if self.trailing_newline && !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn replace_line(&mut self, idx: usize, line: String) {
        self.lines[idx] = line;
    }

    /// Replaces the lines in `range` with `replacement`.
    pub fn splice<I>(&mut self, range: std::ops::Range<usize>, replacement: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.lines.splice(range, replacement);
    }

    pub fn insert_lines<I>(&mut self, at: usize, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.lines.splice(at..at, lines);
    }
}
