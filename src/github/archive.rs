use std::io::{Cursor, Read};

use zip::result::ZipError;
use zip::ZipArchive;

use super::error::LogFetchError;

/// Name of the log entry inside a run's archive: first job, deploy step.
/// Assumes the single-job workflow layout; multi-job runs may not expose
/// their log under this name, which surfaces as an archive-format failure.
pub const DEPLOY_LOG_ENTRY: &str = "0_deploy.txt";

/// Extract the tail of the deploy-step log from a run's zip archive.
///
/// The archive is decompressed entirely in memory; no temporary files are
/// created, so concurrent invocations cannot collide.
pub fn extract_deploy_tail(bytes: &[u8], tail: usize) -> Result<String, LogFetchError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| LogFetchError::archive_format(&format!("not a readable zip archive: {e}")))?;

    let mut entry = match archive.by_name(DEPLOY_LOG_ENTRY) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(LogFetchError::archive_format(&format!(
                "archive has no {DEPLOY_LOG_ENTRY} entry"
            )));
        }
        Err(e) => {
            return Err(LogFetchError::archive_format(&format!(
                "failed to open {DEPLOY_LOG_ENTRY}: {e}"
            )));
        }
    };

    let mut content = String::new();
    entry.read_to_string(&mut content).map_err(|e| {
        LogFetchError::archive_format(&format!("{DEPLOY_LOG_ENTRY} is not readable text: {e}"))
    })?;

    Ok(tail_lines(&content, tail))
}

/// Last `n` lines of `text`, joined with newlines; all lines when fewer.
fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
pub(crate) fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut buf = Vec::new();
    {
        let mut writer = ZipWriter::new(Cursor::new(&mut buf));
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    buf
}
