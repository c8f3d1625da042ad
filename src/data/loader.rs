use std::path::Path;

use ndarray::Array2;

use super::dataset::Dataset;
use crate::config::DataConfig;
use crate::error::{IkError, Result};

/// Read a headerless, comma-separated numeric table.
///
/// Every row must have as many columns as the first one and every field must
/// parse as a number; errors name the file and the 1-based line.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IkError::data(display.clone(), None, e.to_string()))?;

    let mut values = Vec::new();
    let mut width = None;
    let mut rows = 0;

    for record in reader.records() {
        let record = record.map_err(|e| IkError::from(e).with_path(display.clone()))?;
        let line = record.position().map_or(rows + 1, |pos| pos.line() as usize);

        match width {
            None => width = Some(record.len()),
            Some(w) if w != record.len() => {
                return Err(IkError::data(
                    display,
                    Some(line),
                    format!("expected {} columns, found {}", w, record.len()),
                ));
            }
            Some(_) => {}
        }

        for (column, field) in record.iter().enumerate() {
            let value: f32 = field.parse().map_err(|_| {
                IkError::data(
                    display.clone(),
                    Some(line),
                    format!("column {} is not a number: {:?}", column + 1, field),
                )
            })?;
            values.push(value);
        }
        rows += 1;
    }

    let width = match width {
        Some(w) if w > 0 => w,
        _ => return Err(IkError::data(display, None, "table is empty")),
    };

    Array2::from_shape_vec((rows, width), values).map_err(|e| IkError::data(display, None, e.to_string()))
}

/// Load the position and joint-angle tables named by `config` and pair them up.
pub fn load_dataset(config: &DataConfig) -> Result<Dataset> {
    let positions_path = config.positions_path();
    let angles_path = config.angles_path();

    let positions = load_table(&positions_path)?;
    let angles = load_table(&angles_path)?;

    if positions.nrows() != angles.nrows() {
        return Err(IkError::data(
            angles_path.display().to_string(),
            None,
            format!(
                "{} rows, but {} has {}; samples would be misaligned",
                angles.nrows(),
                positions_path.display(),
                positions.nrows()
            ),
        ));
    }

    tracing::info!(
        samples = positions.nrows(),
        position_columns = positions.ncols(),
        angle_columns = angles.ncols(),
        positions = %positions_path.display(),
        angles = %angles_path.display(),
        "training tables loaded"
    );

    Dataset::new(positions, angles)
}
