// ScanTrail - core/export.rs
//
// JSON-lines export of closed attempt records.
// Core layer: writes to any Write trait object; the path is only used for
// error context.

use crate::core::model::AttemptRecord;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Write one compact JSON object per record, each followed by `\n`.
///
/// Non-ASCII text is emitted as UTF-8 rather than `\u` escapes.
/// Returns the number of records written.
pub fn export_jsonl<W: Write>(
    records: &[AttemptRecord],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    for record in records {
        serde_json::to_writer(&mut writer, record).map_err(|e| ExportError::Json {
            path: export_path.to_path_buf(),
            source: e,
        })?;
        writer.write_all(b"\n").map_err(|e| ExportError::Io {
            path: export_path.to_path_buf(),
            operation: "write",
            source: e,
        })?;
    }

    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        operation: "flush",
        source: e,
    })?;

    Ok(records.len())
}
