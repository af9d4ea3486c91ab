use crate::data::{Error, LoadReport, Record, SkipReason, SkippedRow, COLUMNS};
use log::{error, warn};
use std::path::Path;

/// Opens `path` and loads it with `read_records`. A file that can't be opened
/// is fatal; there is no empty fallback.
pub(crate) fn load_records(path: &Path) -> Result<LoadReport, Error> {
    let file = std::fs::File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            error!("ERRO CRÍTICO: Arquivo '{}' não encontrado.", path.display());
            Error::InputNotFound {
                path: path.to_path_buf(),
                source,
            }
        } else {
            error!(
                "ERRO CRÍTICO: Não foi possível abrir '{}'. Detalhe: {source}",
                path.display()
            );
            Error::InputOpen {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    read_records(file).map_err(|e| {
        error!(
            "ERRO CRÍTICO: Falha ao ler '{}'. Detalhe: {e}",
            path.display()
        );
        e
    })
}

/// CSV importer for `Record`s. The first line is a header and is dropped
/// without looking at it. Rows that are too short or whose status/response
/// time don't parse are skipped and reported in `LoadReport::skipped`.
///
/// Blank lines are dropped by the csv reader itself: they produce neither a
/// record nor a `SkippedRow`. Text fields are kept verbatim, surrounding
/// whitespace included; only the numeric fields are trimmed before parsing.
pub(crate) fn read_records<R: std::io::Read>(reader: R) -> Result<LoadReport, Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let mut report = LoadReport::default();
    for result in rdr.records() {
        let row = result?;
        match parse_row(&row) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                let skipped = SkippedRow {
                    line: row.position().map_or(0, |p| p.line()),
                    fields: row.iter().map(str::to_string).collect(),
                    reason,
                };
                warn!(
                    "ATENÇÃO: Linha corrompida ignorada (linha {}). Detalhe: {} | Linha: {:?}",
                    skipped.line, skipped.reason, skipped.fields
                );
                report.skipped.push(skipped);
            }
        }
    }
    Ok(report)
}

fn parse_row(row: &csv::StringRecord) -> Result<Record, SkipReason> {
    if row.len() < COLUMNS.len() {
        return Err(SkipReason::MissingFields { found: row.len() });
    }
    // Trailing fields beyond the schema are ignored.
    let head: csv::StringRecord = row
        .iter()
        .take(COLUMNS.len())
        .enumerate()
        .map(|(i, field)| if i >= 2 { field.trim() } else { field })
        .collect();
    head.deserialize(None)
        .map_err(|e| coercion_failure(&head, &e))
}

fn coercion_failure(row: &csv::StringRecord, e: &csv::Error) -> SkipReason {
    match e.kind() {
        csv::ErrorKind::Deserialize { err, .. } => {
            let index = err.field().map_or(COLUMNS.len() - 1, |f| f as usize);
            SkipReason::InvalidField {
                column: COLUMNS.get(index).copied().unwrap_or("?"),
                value: row.get(index).unwrap_or_default().to_string(),
                detail: err.kind().to_string(),
            }
        }
        _ => SkipReason::InvalidField {
            column: "?",
            value: String::new(),
            detail: e.to_string(),
        },
    }
}
