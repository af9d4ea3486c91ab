use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Column names of the analysis table, in `Record` field order.
pub const COLUMNS: [&str; 4] = [
    "id_transacao",
    "nome_servico",
    "status_http",
    "tempo_resposta_ms",
];

/// One transaction read from the CSV file. Fields are positional: the header
/// line of the file is never looked at, so `Record` deserializes by index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Record {
    pub transaction_id: String,
    pub service_name: String,
    pub http_status: i64,
    pub response_time_ms: f64,
}

impl Record {
    /// A transaction counts as a success when the decimal form of its status
    /// starts with `2`. This is a textual prefix test, so `2000` passes and
    /// `-200` doesn't.
    pub fn is_success(&self) -> bool {
        self.http_status.to_string().starts_with('2')
    }
}

/// Why a CSV row didn't make it into the record list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SkipReason {
    MissingFields {
        found: usize,
    },
    InvalidField {
        column: &'static str,
        value: String,
        detail: String,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingFields { found } => {
                write!(f, "expected {} fields, found {found}", COLUMNS.len())
            }
            SkipReason::InvalidField {
                column,
                value,
                detail,
            } => write!(f, "invalid value {value:?} for {column}: {detail}"),
        }
    }
}

/// A rejected row: where it was, what it contained and why it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SkippedRow {
    pub line: u64,
    pub fields: Vec<String>,
    pub reason: SkipReason,
}

/// Everything the loader produced, both rows kept and rows skipped, in file order.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct LoadReport {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedRow>,
}

/// Fatal pipeline errors. Anything in here stops the run; row-level problems
/// end up in `LoadReport::skipped` instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("input file '{}' not found", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot open input file '{}'", .path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("cannot create output directory '{}'", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("expected {expected} records, read {found}")]
    UnexpectedRecordCount { expected: usize, found: usize },
}

#[cfg(test)]
pub(crate) fn record(id: &str, service: &str, status: i64, time: f64) -> Record {
    Record {
        transaction_id: id.to_string(),
        service_name: service.to_string(),
        http_status: status,
        response_time_ms: time,
    }
}
