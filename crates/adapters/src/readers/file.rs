//! Local filesystem reader.

use super::{ReaderError, decode_document};
use notifyconf_ports::{ConfigContent, ConfigReaderPort, IncludeMode, SourceLocation};
use notifyconf_shared::Result;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

const SCHEMAS: &[&str] = &["file"];

/// Reads `file://` documents.
///
/// Files may only be included from other `file://` documents unless
/// insecure includes are enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConfigReader;

impl FileConfigReader {
    /// Create the reader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ConfigReaderPort for FileConfigReader {
    fn schemas(&self) -> &[&str] {
        SCHEMAS
    }

    fn include_mode(&self) -> IncludeMode {
        IncludeMode::Strict
    }

    fn read(&self, location: &SourceLocation) -> Result<ConfigContent> {
        let path = PathBuf::from(location.path());
        let bytes = read_capped(&path)?;
        let encoding = location.parsed.params.get("encoding");
        let text = decode_document(bytes, encoding, &path.display().to_string())?;
        Ok(ConfigContent::text(text))
    }

    fn base_dir(&self, location: &SourceLocation) -> Option<PathBuf> {
        Path::new(&location.path())
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

fn read_capped(path: &Path) -> std::result::Result<Vec<u8>, ReaderError> {
    let display = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => ReaderError::NotFound {
            location: display.clone(),
        },
        _ => io_error(&display, &error),
    })?;

    // One byte past the cap is enough to tell an oversized file apart.
    let limit = u64::try_from(super::MAX_BUFFER_SIZE).unwrap_or(u64::MAX);
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|error| io_error(&display, &error))?;
    Ok(bytes)
}

fn io_error(location: &str, error: &std::io::Error) -> ReaderError {
    ReaderError::Io {
        location: location.to_owned(),
        message: error.to_string(),
        retriable: matches!(
            error.kind(),
            ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifyconf_domain::{ParseOptions, parse_url};
    use std::io::Write;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn location(url: &str) -> std::result::Result<SourceLocation, Box<dyn std::error::Error>> {
        Ok(SourceLocation::new(url, parse_url(url, &ParseOptions::lenient())?))
    }

    #[test]
    fn reads_absolute_paths() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("notify.cfg");
        std::fs::File::create(&path)?.write_all(b"json://localhost\n")?;

        let location = location(&format!("file://{}", path.display()))?;
        let content = FileConfigReader::new().read(&location)?;
        assert_eq!(content.text, "json://localhost\n");
        assert_eq!(content.format_hint, None);
        assert_eq!(FileConfigReader.base_dir(&location), Some(dir.path().to_path_buf()));
        Ok(())
    }

    #[test]
    fn missing_files_report_not_found() -> TestResult {
        let dir = tempfile::tempdir()?;
        let location = location(&format!("file://{}/absent.yml", dir.path().display()))?;
        let error = FileConfigReader::new()
            .read(&location)
            .err()
            .ok_or("expected an error")?;
        assert!(error.code.is("core", "not_found"));
        Ok(())
    }

    #[test]
    fn oversized_files_are_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("big.cfg");
        std::fs::write(&path, vec![b'#'; super::super::MAX_BUFFER_SIZE + 10])?;

        let location = location(&format!("file://{}", path.display()))?;
        let error = FileConfigReader::new()
            .read(&location)
            .err()
            .ok_or("expected an error")?;
        assert!(error.code.is("config", "fetch_failed"));
        Ok(())
    }

    #[test]
    fn files_are_strict_includes() {
        let reader = FileConfigReader::new();
        assert_eq!(reader.schemas(), ["file"]);
        assert_eq!(reader.include_mode(), IncludeMode::Strict);
    }
}
