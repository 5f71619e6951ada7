// DetailTable: one row of metrics per bucket, rendered or exported
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use comfy_table::presets::ASCII_FULL;
use comfy_table::Table;
use crate::common::{
    display_timestamp,
    size_header,
    BucketDetails,
    Error,
    Result,
    SizeUnit,
};
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tracing::{
    debug,
    info,
};

// Columns written to workbooks as numbers.
const COUNT_COLUMN: usize = 2;
const SIZE_COLUMN: usize = 3;

/// File formats `DetailTable::save` can write.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExportFormat {
    /// Comma separated values.
    Csv,

    /// Excel workbook.
    Xlsx,
}

impl ExportFormat {
    /// Pick the format from the extension of `path`.
    ///
    /// `.xls` and `.xlsx` (in any case) select a workbook, everything else
    /// is written as CSV.
    pub fn from_path(path: &Path) -> Self {
        let extension = path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xls" | "xlsx") => Self::Xlsx,
            _                    => Self::Csv,
        }
    }
}

/// Bucket metrics across every bucket, with sizes in a single unit.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailTable {
    /// Unit the size column is expressed in.
    pub unit: SizeUnit,

    /// One entry per bucket, in registry order.
    pub rows: Vec<BucketDetails>,
}

impl DetailTable {
    /// Return a new `DetailTable` with every row reported in `unit`.
    pub fn new(rows: &[BucketDetails], unit: SizeUnit) -> Self {
        let rows = rows.iter()
            .map(|row| row.with_unit(unit))
            .collect();

        Self {
            unit,
            rows,
        }
    }

    /// Column names in display order.
    pub fn headers(&self) -> [String; 5] {
        [
            "name".to_string(),
            "creation_date".to_string(),
            "count".to_string(),
            size_header(self.unit),
            "last_modified".to_string(),
        ]
    }

    /// Every row as display strings, in the same order as `headers`.
    pub fn records(&self) -> Vec<[String; 5]> {
        self.rows.iter()
            .map(|row| {
                [
                    row.name.clone(),
                    display_timestamp(&row.creation_date),
                    row.count.to_string(),
                    row.display_size(),
                    display_timestamp(&row.last_modified),
                ]
            })
            .collect()
    }

    /// Render as a boxed ASCII table.
    pub fn render(&self) -> String {
        let mut table = Table::new();

        table
            .load_preset(ASCII_FULL)
            .set_header(self.headers().to_vec());

        for record in self.records() {
            table.add_row(record.to_vec());
        }

        table.to_string()
    }

    /// Write the table to `path`, in the format its extension selects.
    pub fn save(&self, path: &Path) -> Result<ExportFormat> {
        let format = ExportFormat::from_path(path);

        debug!("save: Writing {:?} to {}", format, path.display());

        match format {
            ExportFormat::Csv  => self.write_csv(path),
            ExportFormat::Xlsx => self.write_xlsx(path),
        }
        .map_err(|message| Error::Export {
            path: path.to_path_buf(),
            message,
        })?;

        info!("Saved {} bucket rows to {}", self.rows.len(), path.display());

        Ok(format)
    }

    fn write_csv(&self, path: &Path) -> std::result::Result<(), String> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| e.to_string())?;

        writer.write_record(self.headers())
            .map_err(|e| e.to_string())?;

        for record in self.records() {
            writer.write_record(&record)
                .map_err(|e| e.to_string())?;
        }

        writer.flush().map_err(|e| e.to_string())
    }

    // Count and size are written as numbers so they stay sortable.
    fn write_xlsx(&self, path: &Path) -> std::result::Result<(), String> {
        let mut workbook = Workbook::new();
        let worksheet    = workbook.add_worksheet();

        for (col, header) in (0_u16..).zip(self.headers()) {
            worksheet.write_string(0, col, header)
                .map_err(|e| e.to_string())?;
        }

        for (row, (details, record)) in (1_u32..).zip(self.rows.iter().zip(self.records())) {
            for (col, value) in (0_u16..).zip(record) {
                let written = match usize::from(col) {
                    COUNT_COLUMN => worksheet.write_number(row, col, details.count as f64),
                    SIZE_COLUMN  => worksheet.write_number(row, col, details.size()),
                    _            => worksheet.write_string(row, col, value),
                };

                written.map_err(|e| e.to_string())?;
            }
        }

        workbook.save(path).map_err(|e| e.to_string())
    }
}
