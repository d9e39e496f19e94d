//! JSON export of collected data

use crate::output::OutputResult;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes `value` as pretty JSON to `output_path`, or to stdout when `None`
///
/// # Arguments
///
/// * `value` - Any serializable result (wallets or discovered options)
/// * `output_path` - Destination file
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the JSON document
/// * `Err(OutputError)` - Failed to serialize or write
pub fn write_json<T: Serialize>(value: &T, output_path: Option<&Path>) -> OutputResult<()> {
    match output_path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_to(value, &mut writer)?;
            tracing::info!("Wrote output to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            write_to(value, &mut stdout.lock())?;
        }
    }
    Ok(())
}

/// Serializes `value` as pretty JSON followed by a newline
pub fn write_to<T: Serialize, W: Write>(value: &T, writer: &mut W) -> OutputResult<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
