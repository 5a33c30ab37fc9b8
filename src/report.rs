use crate::error::AppError;
use crate::input::{CellValue, InputTable};
use crate::pricing::models::ResolvedRow;
use chrono::{DateTime, Local};
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Computed columns, appended after the original input columns in this order
pub const COMPUTED_HEADERS: [&str; 6] = [
    "Custo_Unitario_USD",
    "Preco_Final_USD",
    "SKU_Name",
    "Service_Name",
    "Azure_Region",
    "Currency",
];

/// A serialized estimate workbook plus its generated file name
pub struct Report {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Merge the original input columns with the computed columns into a
/// single workbook, serialized in memory. Original columns come first, in
/// their original order; unpriced rows leave their computed cells blank.
pub fn assemble(input: &InputTable, resolved: &[ResolvedRow]) -> Result<Report, AppError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let computed_start = input.headers.len() as u16;

    for (col, header) in input.headers.iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    for (offset, header) in COMPUTED_HEADERS.iter().enumerate() {
        sheet.write_string(0, computed_start + offset as u16, *header)?;
    }

    for (i, (cells, row)) in input.cells.iter().zip(resolved).enumerate() {
        let r = (i + 1) as u32;

        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    sheet.write_string(r, col, s)?;
                }
                CellValue::Number(n) => {
                    sheet.write_number(r, col, *n)?;
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(r, col, *b)?;
                }
            }
        }

        if let Some(unit_cost) = row.unit_cost {
            sheet.write_number(r, computed_start, unit_cost)?;
        }
        if let Some(final_cost) = row.final_cost {
            sheet.write_number(r, computed_start + 1, final_cost)?;
        }
        if let Some(sku_name) = &row.sku_name {
            sheet.write_string(r, computed_start + 2, sku_name)?;
        }
        if let Some(service_name) = &row.service_name {
            sheet.write_string(r, computed_start + 3, service_name)?;
        }
        if let Some(region) = &row.region {
            sheet.write_string(r, computed_start + 4, region)?;
        }
        if let Some(currency) = &row.currency {
            sheet.write_string(r, computed_start + 5, currency)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    let file_name = generated_file_name(Local::now());

    Ok(Report { file_name, bytes })
}

/// `Estimativa_Azure_<YYYY-MM-DD_HH-MM-SS>.xlsx`, second-level resolution
fn generated_file_name(now: DateTime<Local>) -> String {
    format!("Estimativa_Azure_{}.xlsx", now.format("%Y-%m-%d_%H-%M-%S"))
}

impl Report {
    /// Write the primary artifact into `dir`
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes).map_err(|e| {
            AppError::Report(format!("Failed to write {}: {}", path.display(), e))
        })?;
        info!("Estimate written to {}", path.display());
        Ok(path)
    }

    /// Write a second copy into `dir`, validating the directory first.
    /// Failure here is non-fatal; callers surface it as a warning and the
    /// primary artifact is unaffected.
    pub fn save_copy(&self, dir: &Path) -> Result<PathBuf, AppError> {
        if !dir.is_dir() {
            return Err(AppError::Persistence(format!(
                "save directory does not exist: {}",
                dir.display()
            )));
        }

        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes).map_err(|e| {
            AppError::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }
}
