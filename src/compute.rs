use crate::data::{Record, COLUMNS};
use log::{debug, info};

/// All loaded records, in file order. Built once from the loader output and
/// never modified afterwards.
#[derive(Debug, Default)]
pub(crate) struct RecordTable {
    rows: Vec<Record>,
}

impl RecordTable {
    pub fn new(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    /// Rows with a successful status. The view only stores indices into
    /// `self`, so every row it yields is a row of this table.
    pub fn successes(&self) -> SuccessTable<'_> {
        SuccessTable {
            table: self,
            indices: self
                .rows
                .iter()
                .enumerate()
                .filter(|(_, r)| r.is_success())
                .map(|(i, _)| i)
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SuccessTable<'a> {
    table: &'a RecordTable,
    indices: Vec<usize>,
}

impl<'a> SuccessTable<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Positions of the selected rows in the parent table.
    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.rows[i])
    }

    /// Response times of the selected rows, NaN values left out.
    pub fn response_times(&self) -> Vec<f64> {
        self.rows()
            .map(|r| r.response_time_ms)
            .filter(|t| !t.is_nan())
            .collect()
    }
}

/// Key figures of a run. The response time statistics only cover successful
/// transactions with a non-NaN response time and are `None` when they are
/// undefined (no such values, or a single one for the standard deviation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MetricsSummary {
    pub total_transacoes: usize,
    pub total_sucesso: usize,
    pub tempo_resposta_medio_ms: Option<f64>,
    pub tempo_resposta_mediana_ms: Option<f64>,
    pub tempo_resposta_std_ms: Option<f64>,
}

impl MetricsSummary {
    pub fn compute(table: &RecordTable, successes: &SuccessTable<'_>) -> Self {
        let times = successes.response_times();
        Self {
            total_transacoes: table.len(),
            total_sucesso: successes.len(),
            tempo_resposta_medio_ms: mean(&times),
            tempo_resposta_mediana_ms: median(&times),
            tempo_resposta_std_ms: sample_std(&times),
        }
    }

    /// Metrics as `(name, value)` in reporting order; undefined values are NaN.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("total_transacoes", self.total_transacoes as f64),
            ("total_sucesso", self.total_sucesso as f64),
            (
                "tempo_resposta_medio_ms",
                self.tempo_resposta_medio_ms.unwrap_or(f64::NAN),
            ),
            (
                "tempo_resposta_mediana_ms",
                self.tempo_resposta_mediana_ms.unwrap_or(f64::NAN),
            ),
            (
                "tempo_resposta_std_ms",
                self.tempo_resposta_std_ms.unwrap_or(f64::NAN),
            ),
        ]
    }

    /// Console lines: `Title Cased Key: value` with two decimals.
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|(key, value)| format!("{}: {}", title_case(key), format_value(*value)))
            .collect()
    }
}

/// Builds the table, filters successes and logs the summary.
pub(crate) fn analyze(records: Vec<Record>) -> (RecordTable, MetricsSummary) {
    let table = RecordTable::new(records);
    debug!("{} rows, columns {:?}", table.len(), table.columns());
    let metrics = MetricsSummary::compute(&table, &table.successes());
    info!("--- Métricas Estatísticas Chave ---");
    for line in metrics.lines() {
        info!("{line}");
    }
    (table, metrics)
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// `tempo_resposta_ms` becomes `Tempo Resposta Ms`: underscores turn into
/// spaces, a letter following a non-letter is upper-cased and every other
/// letter lower-cased.
pub(crate) fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut word_start = true;
    for c in key.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Standard deviation with the N-1 denominator.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::{analyze, mean, median, sample_std, title_case, MetricsSummary, RecordTable};
    use crate::data::record;

    fn table() -> RecordTable {
        RecordTable::new(vec![
            record("tx1", "auth", 200, 100.0),
            record("tx2", "auth", 404, 900.0),
            record("tx3", "payments", 201, 200.0),
            record("tx4", "payments", 500, 50.0),
            record("tx5", "auth", 204, 300.0),
            record("tx6", "search", 200, 400.0),
        ])
    }

    #[test]
    fn columns_follow_record_order() {
        assert_eq!(
            table().columns(),
            ["id_transacao", "nome_servico", "status_http", "tempo_resposta_ms"]
        );
    }

    #[test]
    fn successes_are_a_subset_of_the_table() {
        let table = table();
        let successes = table.successes();
        assert_eq!(successes.indices(), [0, 2, 4, 5]);
        assert!(successes.len() <= table.len());
        for (index, row) in successes.indices().iter().zip(successes.rows()) {
            assert!(std::ptr::eq(row, &table.rows()[*index]));
            assert!(row.is_success());
        }
    }

    #[test]
    fn metrics_over_successes() {
        let table = table();
        let metrics = MetricsSummary::compute(&table, &table.successes());
        assert_eq!(metrics.total_transacoes, 6);
        assert_eq!(metrics.total_sucesso, 4);
        assert_eq!(metrics.tempo_resposta_medio_ms, Some(250.0));
        assert_eq!(metrics.tempo_resposta_mediana_ms, Some(250.0));
        let std = metrics.tempo_resposta_std_ms.unwrap();
        assert!((std - 129.099_444_873_580_56).abs() < 1e-9);
    }

    #[test]
    fn mean_lies_within_range() {
        let table = table();
        let times = table.successes().response_times();
        let mean = mean(&times).unwrap();
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(min <= mean && mean <= max);
    }

    #[test]
    fn no_successes_leaves_statistics_undefined() {
        let table = RecordTable::new(vec![
            record("tx1", "auth", 404, 10.0),
            record("tx2", "auth", 500, 20.0),
        ]);
        let metrics = MetricsSummary::compute(&table, &table.successes());
        assert_eq!(metrics.total_transacoes, 2);
        assert_eq!(metrics.total_sucesso, 0);
        assert_eq!(metrics.tempo_resposta_medio_ms, None);
        assert_eq!(metrics.tempo_resposta_mediana_ms, None);
        assert_eq!(metrics.tempo_resposta_std_ms, None);
        assert_eq!(
            metrics.lines(),
            [
                "Total Transacoes: 2.00",
                "Total Sucesso: 0.00",
                "Tempo Resposta Medio Ms: nan",
                "Tempo Resposta Mediana Ms: nan",
                "Tempo Resposta Std Ms: nan",
            ]
        );
    }

    #[test]
    fn nan_response_times_are_left_out() {
        let table = RecordTable::new(vec![
            record("tx1", "auth", 200, 10.0),
            record("tx2", "auth", 200, f64::NAN),
            record("tx3", "auth", 200, 30.0),
        ]);
        let metrics = MetricsSummary::compute(&table, &table.successes());
        assert_eq!(metrics.total_transacoes, 3);
        assert_eq!(metrics.total_sucesso, 3);
        assert_eq!(
            metrics.lines(),
            [
                "Total Transacoes: 3.00",
                "Total Sucesso: 3.00",
                "Tempo Resposta Medio Ms: 20.00",
                "Tempo Resposta Mediana Ms: 20.00",
                "Tempo Resposta Std Ms: 14.14",
            ]
        );

        let table = RecordTable::new(vec![record("tx1", "auth", 200, f64::NAN)]);
        let metrics = MetricsSummary::compute(&table, &table.successes());
        assert_eq!(metrics.total_sucesso, 1);
        assert_eq!(metrics.tempo_resposta_medio_ms, None);
        assert_eq!(metrics.tempo_resposta_mediana_ms, None);
    }

    #[test]
    fn small_samples() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(sample_std(&[5.0]), None);
        assert_eq!(sample_std(&[1.0, 3.0]), Some(2f64.sqrt()));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn metric_lines() {
        let (_, metrics) = analyze(vec![
            record("tx1", "auth", 200, 10.0),
            record("tx2", "auth", 200, 20.0),
            record("tx3", "auth", 503, 99.0),
        ]);
        assert_eq!(
            metrics.lines(),
            [
                "Total Transacoes: 3.00",
                "Total Sucesso: 2.00",
                "Tempo Resposta Medio Ms: 15.00",
                "Tempo Resposta Mediana Ms: 15.00",
                "Tempo Resposta Std Ms: 7.07",
            ]
        );
    }

    #[test]
    fn title_case_keys() {
        assert_eq!(title_case("tempo_resposta_medio_ms"), "Tempo Resposta Medio Ms");
        assert_eq!(title_case("total_SUCESSO"), "Total Sucesso");
        assert_eq!(title_case("p95_latency"), "P95 Latency");
    }
}
