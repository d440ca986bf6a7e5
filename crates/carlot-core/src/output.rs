//! Per-file check reports and their JSON / JSONL serialization.
//!
//! A report folds the three ways a file can finish (accepted, rejected, or
//! failed with an error) into one serializable record.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::error::GateError;
use crate::types::{SharpnessResult, ValidationOutcome};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// How a checked file finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Accepted,
    Rejected,
    Error,
}

/// Result of checking one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub file: String,

    pub status: ReportStatus,

    /// Rejection reason or error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Set for errors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,

    /// Full gate outcome (absent in sharpness-only mode and on errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ValidationOutcome>,

    /// Sharpness-only result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpness: Option<SharpnessResult>,
}

impl CheckReport {
    pub fn from_outcome(file: impl Into<String>, outcome: ValidationOutcome) -> Self {
        let rejection = outcome.rejection();
        Self {
            file: file.into(),
            status: if rejection.is_none() {
                ReportStatus::Accepted
            } else {
                ReportStatus::Rejected
            },
            reason: rejection.map(|r| r.to_string()),
            retryable: None,
            outcome: Some(outcome),
            sharpness: None,
        }
    }

    /// Report for a run that stopped after the local sharpness stage.
    pub fn from_sharpness(file: impl Into<String>, sharpness: SharpnessResult) -> Self {
        Self {
            file: file.into(),
            status: if sharpness.passed {
                ReportStatus::Accepted
            } else {
                ReportStatus::Rejected
            },
            reason: sharpness.failure.map(|f| f.to_string()),
            retryable: None,
            outcome: None,
            sharpness: Some(sharpness),
        }
    }

    pub fn from_error(file: impl Into<String>, error: &GateError) -> Self {
        Self {
            retryable: Some(error.is_retryable()),
            ..Self::failed(file, error.to_string())
        }
    }

    /// Error report for a failure outside the gate, e.g. an unreadable file.
    pub fn failed(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: ReportStatus::Error,
            reason: Some(message.into()),
            retryable: None,
            outcome: None,
            sharpness: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == ReportStatus::Accepted
    }
}

/// A writer that serializes reports to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write one item on its own line.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a batch: a JSON array, or one line per item for JSONL.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, items)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, items).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += items.len();
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationResult, Rejection, SharpnessFailure};

    fn sharpness(passed: bool) -> SharpnessResult {
        SharpnessResult {
            passed,
            variance: if passed { 900.0 } else { 12.0 },
            mean: 20.0,
            pixels_evaluated: 1000,
            width: 640,
            height: 480,
            analyzed_width: 640,
            analyzed_height: 480,
            failure: (!passed).then_some(SharpnessFailure::LowVariance),
        }
    }

    fn not_vehicle() -> ValidationOutcome {
        ValidationOutcome::classified(
            sharpness(true),
            ClassificationResult {
                passed: false,
                label: None,
                confidence: None,
                concepts_seen: 5,
            },
        )
    }

    #[test]
    fn test_report_from_rejection() {
        let report = CheckReport::from_outcome("side.jpg", not_vehicle());
        assert_eq!(report.status, ReportStatus::Rejected);
        assert_eq!(
            report.reason.as_deref(),
            Some(Rejection::NoVehicleDetected.to_string().as_str())
        );
        assert!(!report.is_accepted());
    }

    #[test]
    fn test_report_from_sharpness_only() {
        let report = CheckReport::from_sharpness("blur.jpg", sharpness(false));
        assert_eq!(report.status, ReportStatus::Rejected);
        assert_eq!(report.reason.as_deref(), Some("too blurry"));

        let report = CheckReport::from_sharpness("sharp.jpg", sharpness(true));
        assert!(report.is_accepted());
        assert_eq!(report.reason, None);
    }

    #[test]
    fn test_report_from_error_carries_retryability() {
        let err = GateError::Timeout {
            stage: "classify".to_string(),
            timeout_ms: 100,
        };
        let report = CheckReport::from_error("front.jpg", &err);
        assert_eq!(report.status, ReportStatus::Error);
        assert_eq!(report.retryable, Some(true));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(!json.contains("outcome"));
    }

    #[test]
    fn test_write_jsonl_one_report_per_line() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);

        writer
            .write_all(&[
                CheckReport::from_outcome("a.jpg", not_vehicle()),
                CheckReport::from_sharpness("b.jpg", sharpness(true)),
            ])
            .unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        let first: CheckReport = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.file, "a.jpg");
    }

    #[test]
    fn test_write_all_json_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);

        writer
            .write_all(&[CheckReport::from_sharpness("a.jpg", sharpness(true))])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('['));
        assert!(output.trim().ends_with(']'));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("xml"), None);
    }
}
