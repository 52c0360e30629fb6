//! Text renderings for tabular data: boxed tables, CSV and JSON.

use serde::Serialize;
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write CSV")]
    Csv(#[from] csv::Error),
    #[error("CSV output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("failed to serialize JSON")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        (0..columns)
            .map(|col| {
                self.rows
                    .iter()
                    .chain(std::iter::once(&self.headers))
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.width())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Draws the table with rounded Unicode dividers, one header separator line.
pub fn render_table(table: &Table) -> String {
    let widths = table.column_widths();
    if widths.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    out.push_str(&divider(&widths, '╭', '┬', '╮'));
    out.push_str(&row_line(&table.headers, &widths));
    out.push_str(&divider(&widths, '├', '┼', '┤'));
    for row in &table.rows {
        out.push_str(&row_line(row, &widths));
    }
    out.push_str(&divider(&widths, '╰', '┴', '╯'));
    out
}

pub fn render_csv(table: &Table) -> Result<String, RenderError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| RenderError::Csv(err.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn divider(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", segments.join(&mid.to_string()))
}

fn row_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(cell.width());
            format!(" {cell}{} ", " ".repeat(pad))
        })
        .collect();
    format!("│{}│\n", padded.join("│"))
}
