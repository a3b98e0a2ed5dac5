//! Report persistence

use anyhow::Context;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use feedcheck_detector::ValidationReport;

/// Write the report as pretty JSON, creating parent directories
pub fn write_report(report: &ValidationReport, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }

    let file = fs::File::create(path)
        .with_context(|| format!("creating report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).context("serializing report")?;
    writer.flush().context("flushing report")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedcheck_core::{ValidationOutcome, ValidationStatus};

    #[test]
    fn test_writes_readable_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("opbnb.json");

        let now = chrono::Utc::now();
        let report = ValidationReport::new(
            5.0,
            vec![
                ValidationOutcome::compared("ETH / USD", ValidationStatus::Ok, 100.0, 101.0, 0.99),
                ValidationOutcome::not_found("NEW / USD"),
            ],
            now,
            now,
        );

        write_report(&report, &path).unwrap();

        let written: ValidationReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.summary, report.summary);
        assert_eq!(written.outcomes.len(), 2);
    }
}
