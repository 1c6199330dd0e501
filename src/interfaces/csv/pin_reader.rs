use crate::domain::{sanitize, validation};
use crate::error::{GateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;

/// One PIN/Serial row of an inventory file.
///
/// Accepts both the `pin,serial[,exam_type]` import layout and the
/// `PIN,Serial Number` layout produced by order exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRecord {
    #[serde(alias = "PIN")]
    pub pin: String,
    #[serde(alias = "Serial Number", alias = "Serial")]
    pub serial: String,
    #[serde(default, alias = "Exam Type")]
    pub exam_type: Option<String>,
}

impl PinRecord {
    fn normalize(mut self) -> Result<Self> {
        self.pin = sanitize::sanitize_pin_serial(&self.pin);
        self.serial = sanitize::sanitize_pin_serial(&self.serial);
        self.exam_type = self
            .exam_type
            .map(|e| sanitize::safe_text(&e).to_uppercase())
            .filter(|e| !e.is_empty());

        let problem = validation::required(&self.pin)
            .map(|m| format!("pin: {m}"))
            .or_else(|| validation::pin(&self.pin).map(str::to_string))
            .or_else(|| validation::required(&self.serial).map(|m| format!("serial: {m}")))
            .or_else(|| validation::serial(&self.serial).map(str::to_string));
        match problem {
            Some(message) => Err(GateError::ValidationError(message)),
            None => Ok(self),
        }
    }
}

/// A row that could not be accepted, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PinReport {
    pub valid: Vec<PinRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Reads PIN inventory rows from a CSV source.
///
/// Fields are trimmed and records may omit trailing columns. Every row is
/// sanitized and validated before it is yielded.
pub struct PinReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PinReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields `(line, record)` pairs.
    pub fn records(self) -> impl Iterator<Item = (u64, Result<PinRecord>)> {
        self.reader
            .into_deserialize::<PinRecord>()
            .enumerate()
            .map(|(i, row)| {
                // Line 1 is the header.
                let line = i as u64 + 2;
                (line, row.map_err(GateError::from).and_then(PinRecord::normalize))
            })
    }

    /// Reads the whole source, splitting rows into accepted and rejected.
    /// A serial seen earlier in the file is rejected as a duplicate.
    pub fn report(self) -> PinReport {
        let mut report = PinReport::default();
        let mut serials = HashSet::new();
        for (line, row) in self.records() {
            match row {
                Ok(record) if !serials.insert(record.serial.clone()) => {
                    report.rejected.push(RejectedRow {
                        line,
                        message: format!("Duplicate serial {}", record.serial),
                    });
                }
                Ok(record) => report.valid.push(record),
                Err(e) => report.rejected.push(RejectedRow {
                    line,
                    message: e.to_string(),
                }),
            }
        }
        if !report.rejected.is_empty() {
            tracing::warn!(rejected = report.rejected.len(), "inventory rows rejected");
        }
        report
    }
}
