use std::io::Write;
use std::path::Path;

use crate::error::ExportError;
use crate::models::Expense;

pub(crate) const HEADER: [&str; 5] = ["id", "date", "description", "category", "amount"];

/// Write `records` as CSV, header first, in the order given.
/// Amounts always carry two decimals so the file re-imports losslessly.
pub(crate) fn write_csv<W: Write>(writer: W, records: &[Expense]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for record in records {
        wtr.write_record([
            record.id.to_string(),
            record.date_str(),
            record.description.clone(),
            record.category.clone(),
            format!("{:.2}", record.amount),
        ])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Create (or truncate) `path` and export `records` into it.
/// Returns the number of data rows written.
pub(crate) fn export_to_path(path: &Path, records: &[Expense]) -> Result<usize, ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = std::fs::File::create(path).map_err(io_error)?;
    write_csv(file, records)?;
    tracing::info!(path = %path.display(), rows = records.len(), "exported expenses");
    Ok(records.len())
}

#[cfg(test)]
mod tests;
