use crate::error::AppError;
use crate::pricing::models::InputRow;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::info;

pub const METER_ID_COLUMN: &str = "MeterId";
pub const QUANTITY_COLUMN: &str = "Quantity";

/// Original cell payload, carried through to the output untouched
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Self::Empty,
            Data::String(s) => Self::Text(s.clone()),
            Data::Float(f) => Self::Number(*f),
            Data::Int(i) => Self::Number(*i as f64),
            Data::Bool(b) => Self::Bool(*b),
            other => Self::Text(other.to_string()),
        }
    }
}

/// The parsed input workbook: the original grid (headers plus one cell row
/// per data row, padded to header width) and the typed rows the resolver
/// consumes. `cells` and `rows` are index-aligned.
#[derive(Debug, Clone)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub cells: Vec<Vec<CellValue>>,
    pub rows: Vec<InputRow>,
}

/// Read the first sheet of an input workbook.
///
/// The header row must contain `MeterId` and `Quantity` columns; any other
/// columns pass through untouched. Quantities must be non-negative numbers.
/// All validation happens here, before any lookup is attempted.
pub fn read_input(path: &Path) -> Result<InputTable, AppError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::InputFile(format!("{}: workbook has no sheets", path.display())))??;

    let mut row_iter = range.rows();

    let header_row = row_iter
        .next()
        .ok_or_else(|| AppError::Validation("input sheet is empty".to_string()))?;
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string().trim().to_string()).collect();

    let meter_col = headers.iter().position(|h| h == METER_ID_COLUMN);
    let quantity_col = headers.iter().position(|h| h == QUANTITY_COLUMN);

    let missing: Vec<&str> = [
        (METER_ID_COLUMN, meter_col),
        (QUANTITY_COLUMN, quantity_col),
    ]
    .iter()
    .filter(|(_, found)| found.is_none())
    .map(|(name, _)| *name)
    .collect();

    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "input sheet is missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let meter_col = meter_col.unwrap_or_default();
    let quantity_col = quantity_col.unwrap_or_default();

    let mut cells = Vec::new();
    let mut rows = Vec::new();

    for (i, row) in row_iter.enumerate() {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }

        // sheet row number, header included, for error messages
        let row_number = i + 2;

        let meter_id = row
            .get(meter_col)
            .map(|c| c.to_string().trim().to_string())
            .unwrap_or_default();

        let quantity = parse_quantity(row.get(quantity_col)).map_err(|value| {
            AppError::Validation(format!(
                "row {}: quantity '{}' is not a non-negative number",
                row_number, value
            ))
        })?;

        cells.push(
            (0..headers.len())
                .map(|col| row.get(col).map(CellValue::from).unwrap_or(CellValue::Empty))
                .collect(),
        );
        rows.push(InputRow { meter_id, quantity });
    }

    info!("Read {} input rows from {}", rows.len(), path.display());

    Ok(InputTable {
        headers,
        cells,
        rows,
    })
}

/// Coerce a quantity cell to a non-negative f64; Err carries the offending
/// value as displayed
fn parse_quantity(cell: Option<&Data>) -> Result<f64, String> {
    let quantity = match cell {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        Some(Data::String(s)) => s.trim().parse::<f64>().map_err(|_| s.clone())?,
        Some(other) => return Err(other.to_string()),
        None => return Err(String::new()),
    };

    if quantity.is_finite() && quantity >= 0.0 {
        Ok(quantity)
    } else {
        Err(quantity.to_string())
    }
}
