//! JSON output helpers.

use std::io::Write;

use serde::Serialize;

use crate::CliError;

#[derive(Debug, Serialize)]
struct ErrorReport {
    status: &'static str,
    message: String,
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

/// Write the status label and message of a failed command.
pub(crate) fn write_error_report(writer: &mut dyn Write, err: &CliError) -> Result<(), CliError> {
    write_json(
        writer,
        &ErrorReport {
            status: err.status_label(),
            message: err.to_string(),
        },
    )
}
