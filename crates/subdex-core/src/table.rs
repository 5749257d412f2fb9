//! Reading and writing the two-column subject table.
//!
//! The file format is fixed by the downstream consumers: CSV with the
//! header `assunto,links`, one record per subject row, links as a single
//! space-joined field.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::types::SubjectRow;

const HEADER: [&str; 2] = ["assunto", "links"];

/// Serialize the table and write it in one shot, so a failed run never
/// leaves a partial file behind.
pub fn write_table(path: &Path, rows: &[SubjectRow]) -> Result<()> {
    let mut out = String::new();
    out.push_str("assunto,links\n");
    for row in rows {
        out.push_str(&escape_field(&row.subject));
        out.push(',');
        out.push_str(&escape_field(&row.links));
        out.push('\n');
    }
    fs::write(path, out)?;
    info!(path = %path.display(), rows = rows.len(), "wrote subject table");
    Ok(())
}

/// Read a subject table, validating the header. A record missing the links
/// column reads as an empty links field (the filter pass drops those).
pub fn read_table(path: &Path) -> Result<Vec<SubjectRow>> {
    if !path.exists() {
        return Err(Error::missing(path));
    }
    let content = fs::read_to_string(path)?;
    let mut records = parse_records(&content);
    if records.is_empty() {
        return Err(Error::MalformedInput(format!("{}: empty table", path.display())));
    }
    let header = records.remove(0);
    if header.len() < 2 || header[0] != HEADER[0] || header[1] != HEADER[1] {
        return Err(Error::MalformedInput(format!(
            "{}: expected header 'assunto,links', got '{}'",
            path.display(),
            header.join(",")
        )));
    }
    Ok(records
        .into_iter()
        .map(|mut fields| {
            let subject = if fields.is_empty() { String::new() } else { fields.remove(0) };
            let links = if fields.is_empty() { String::new() } else { fields.remove(0) };
            SubjectRow { subject, links }
        })
        .collect())
}

fn escape_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Minimal CSV record parser: comma separated, double-quote quoting with
/// `""` escapes, quoted fields may span lines. Empty lines are skipped.
fn parse_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    if !fields.is_empty() || !field.is_empty() {
                        fields.push(std::mem::take(&mut field));
                        records.push(std::mem::take(&mut fields));
                    }
                }
                _ => field.push(c),
            }
        }
    }
    if !fields.is_empty() || !field.is_empty() {
        fields.push(field);
        records.push(fields);
    }
    records
}
