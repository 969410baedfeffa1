// ScanTrail - platform/fs.rs
//
// Filesystem helpers for the input log and the two output files.

use crate::util::error::{ExportError, InputError};
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::OnceLock;

/// Line terminators recognised in exported logs: CRLF, LF, lone CR, the
/// ASCII vertical tab, form feed and separator controls, NEL, and the
/// Unicode line and paragraph separators.
fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\r\n|[\n\r\x0b\x0c\x1c\x1d\x1e\x{85}\x{2028}\x{2029}]")
            .expect("fs: invalid line break regex")
    })
}

/// Split text into lines on every recognised terminator.
///
/// A terminator at the very end does not produce a trailing empty line, and
/// empty input yields no lines.
pub fn split_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = line_break_re()
        .split(content)
        .map(str::to_owned)
        .collect();
    if lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines
}

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read the scanner log into memory as an ordered list of lines.
///
/// A missing file is reported as `InputError::NotFound`; this is the only
/// fatal input condition.
pub fn read_log_lines(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = read_file_lossy(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(split_lines(&content))
}

/// Create the parent directory of `path` if it has one and it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ExportError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| ExportError::Io {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })
        }
        _ => Ok(()),
    }
}

/// Create (or truncate) an output file, creating parent directories first.
pub fn create_output_file(path: &Path) -> Result<BufWriter<File>, ExportError> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        operation: "create",
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Write a UTF-8 text file, creating parent directories first.
pub fn write_text(path: &Path, content: &str) -> Result<(), ExportError> {
    ensure_parent_dir(path)?;
    fs::write(path, content).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        operation: "write",
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_log_lines_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_log_lines(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, InputError::NotFound { .. }));
    }

    #[test]
    fn test_read_log_lines_lossy_and_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(&path, b"first\r\nsec\xffond\nthird").unwrap();
        let lines = read_log_lines(&path).unwrap();
        assert_eq!(lines, vec!["first", "sec\u{FFFD}ond", "third"]);
    }

    #[test]
    fn test_split_lines_cr_only_and_unicode_separators() {
        assert_eq!(
            split_lines("a\rb\r\nc\u{2028}d\u{2029}e\u{85}f\x0bg\x0ch\x1ci"),
            vec!["a", "b", "c", "d", "e", "f", "g", "h", "i"]
        );
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), vec![""]);
    }

    #[test]
    fn test_read_log_lines_cr_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(
            &path,
            "1 | scanner_start | playlist=- | attempt=2\r\
             2 | scanner_finish | playlist=- | attempt=2, results=3\r\
             3 | scanner_error | playlist=- | attempt=1, boom\u{2028} timeout\r",
        )
        .unwrap();
        let lines = read_log_lines(&path).unwrap();
        assert_eq!(
            lines,
            vec![
                "1 | scanner_start | playlist=- | attempt=2",
                "2 | scanner_finish | playlist=- | attempt=2, results=3",
                "3 | scanner_error | playlist=- | attempt=1, boom",
                " timeout",
            ]
        );
    }

    #[test]
    fn test_write_text_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.md");
        write_text(&path, "привет\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "привет\n");
    }

    #[test]
    fn test_create_output_file_creates_parents() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.jsonl");
        let mut writer = create_output_file(&path).unwrap();
        writer.write_all(b"{}\n").unwrap();
        drop(writer);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }
}
