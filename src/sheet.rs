//! Destination grid abstraction and the full-replace write strategy.
//!
//! A [`RowDestination`] is anything shaped like a spreadsheet tab: a header
//! in row 1 and data rows beneath it. [`replace_rows`] is the only write
//! strategy the sync uses. It clears every data row that is currently in use
//! and then writes the new rows from row 2 down, so after it returns the
//! grid holds exactly the new rows below an untouched header.
//!
//! Clear-then-write is not atomic. If the write fails after the clear, the
//! tab is left with only its header; the next successful run repairs it.
//!
//! Rows and columns are 1-based throughout, matching A1 notation.

use tracing::{debug, info};

use crate::error::Result;
use crate::row::{HEADER, OutputRow};

/// First row that holds data.
pub const FIRST_DATA_ROW: usize = 2;

/// The used area of a grid: last non-empty row and column, or zero for an
/// empty grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extent {
    /// Last non-empty row.
    pub rows: usize,
    /// Widest non-empty column across all rows.
    pub columns: usize,
}

/// A tabular destination.
#[allow(async_fn_in_trait)]
pub trait RowDestination {
    /// Reports the used area.
    async fn extent(&mut self) -> Result<Extent>;

    /// Clears cell contents (not formatting) of rows `first_row..=last_row`
    /// across columns `1..=columns`.
    async fn clear(&mut self, first_row: usize, last_row: usize, columns: usize) -> Result<()>;

    /// Writes `rows` starting at `first_row`, column 1.
    async fn write(&mut self, first_row: usize, rows: Vec<Vec<String>>) -> Result<()>;
}

/// What [`replace_rows`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Data rows cleared before writing.
    pub cleared: usize,
    /// Data rows written.
    pub written: usize,
    /// Whether the header was written into an empty grid.
    pub header_seeded: bool,
}

/// Replaces every data row of `dest` with `rows`.
///
/// Row 1 is never touched, except that with `seed_header` set a completely
/// empty grid first gets [`HEADER`] written into it. An empty `rows` clears
/// and issues no write.
pub async fn replace_rows<D: RowDestination>(
    dest: &mut D,
    rows: Vec<OutputRow>,
    seed_header: bool,
) -> Result<ReplaceSummary> {
    let mut summary = ReplaceSummary::default();
    let extent = dest.extent().await?;
    debug!(rows = extent.rows, columns = extent.columns, "destination extent");

    if extent.rows >= FIRST_DATA_ROW {
        dest.clear(FIRST_DATA_ROW, extent.rows, extent.columns.max(1))
            .await?;
        summary.cleared = extent.rows - 1;
    } else if extent.rows == 0 && seed_header {
        let header = HEADER.iter().map(|h| h.to_string()).collect();
        dest.write(1, vec![header]).await?;
        summary.header_seeded = true;
    }

    if !rows.is_empty() {
        summary.written = rows.len();
        let cells = rows.into_iter().map(OutputRow::into_cells).collect();
        dest.write(FIRST_DATA_ROW, cells).await?;
    }

    info!(
        cleared = summary.cleared,
        written = summary.written,
        "destination rows replaced"
    );
    Ok(summary)
}

/// Converts a 1-based column number to letters (1 = A, 26 = Z, 27 = AA).
pub fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Sheet name as it appears in A1 notation.
///
/// Names made only of ASCII letters and `_` go bare. Anything else is
/// single-quoted with `'` doubled, so names containing digits (`A1`, `R1C1`,
/// `2024`) are never read as cell references.
pub fn quote_sheet_name(sheet: &str) -> String {
    if !sheet.is_empty() && sheet.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// Builds an A1 range such as `Devices!A2:I10`.
pub fn a1_range(sheet: &str, first_row: usize, last_row: usize, columns: usize) -> String {
    format!(
        "{}!A{first_row}:{}{last_row}",
        quote_sheet_name(sheet),
        column_letter(columns.max(1))
    )
}

/// In-process grid. Used for dry runs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySheet {
    grid: Vec<Vec<String>>,
    /// Number of `write` calls received.
    pub writes: usize,
    /// Number of `clear` calls received.
    pub clears: usize,
}

impl MemorySheet {
    /// A grid holding only the standard header row.
    pub fn with_header() -> Self {
        Self::from_rows(vec![HEADER.iter().map(|h| h.to_string()).collect()])
    }

    /// A grid with the given contents, row 1 first.
    pub fn from_rows(grid: Vec<Vec<String>>) -> Self {
        MemorySheet {
            grid,
            writes: 0,
            clears: 0,
        }
    }

    /// The grid as stored, trailing empty cells included.
    pub fn grid(&self) -> &[Vec<String>] {
        &self.grid
    }

    /// Row `n` (1-based), if it exists.
    pub fn row(&self, n: usize) -> Option<&[String]> {
        n.checked_sub(1)
            .and_then(|i| self.grid.get(i))
            .map(Vec::as_slice)
    }

    /// Non-empty rows below the header, in order.
    pub fn data_rows(&self) -> Vec<Vec<String>> {
        self.grid
            .iter()
            .skip(1)
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .cloned()
            .collect()
    }

    fn used(&self) -> Extent {
        let mut extent = Extent::default();
        for (i, row) in self.grid.iter().enumerate() {
            if let Some(last) = row.iter().rposition(|c| !c.is_empty()) {
                extent.rows = i + 1;
                extent.columns = extent.columns.max(last + 1);
            }
        }
        extent
    }
}

impl RowDestination for MemorySheet {
    async fn extent(&mut self) -> Result<Extent> {
        Ok(self.used())
    }

    async fn clear(&mut self, first_row: usize, last_row: usize, columns: usize) -> Result<()> {
        self.clears += 1;
        for row in self
            .grid
            .iter_mut()
            .take(last_row)
            .skip(first_row.saturating_sub(1))
        {
            for cell in row.iter_mut().take(columns) {
                cell.clear();
            }
        }
        Ok(())
    }

    async fn write(&mut self, first_row: usize, rows: Vec<Vec<String>>) -> Result<()> {
        self.writes += 1;
        for (offset, cells) in rows.into_iter().enumerate() {
            let index = first_row - 1 + offset;
            if self.grid.len() <= index {
                self.grid.resize_with(index + 1, Vec::new);
            }
            let target = &mut self.grid[index];
            if target.len() < cells.len() {
                target.resize(cells.len(), String::new());
            }
            for (col, value) in cells.into_iter().enumerate() {
                target[col] = value;
            }
        }
        Ok(())
    }
}
