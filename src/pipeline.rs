use crate::{
    compute::{analyze, MetricsSummary},
    config::Config,
    data::{Error, LoadReport},
    plot::{render_chart, RenderOutcome},
    read::load_records,
    write::ensure_output_dir,
};
use log::{error, info};

/// What a completed run produced.
#[derive(Debug)]
pub(crate) struct RunReport {
    pub load: LoadReport,
    pub metrics: MetricsSummary,
    pub chart: RenderOutcome,
}

/// Load, check the record count, make the output directory, compute the
/// metrics and draw the chart, in that order. Any `Err` stops the run where
/// it happened.
pub(crate) fn run(config: &Config) -> Result<RunReport, Error> {
    info!("Iniciando análise a partir de '{}'...", config.input.display());

    let mut load = load_records(&config.input)?;
    let found = load.records.len();
    if let Some(expected) = config.expected_records {
        if found != expected {
            error!(
                "ERRO CRÍTICO: O número de registros lidos não é o esperado ({expected}), lidos {found}."
            );
            return Err(Error::UnexpectedRecordCount { expected, found });
        }
    }
    info!("Sucesso: {found} registros lidos.");

    ensure_output_dir(&config.output_dir)?;

    let (table, metrics) = analyze(std::mem::take(&mut load.records));
    let successes = table.successes();
    let chart = render_chart(
        &successes,
        &config.output_dir,
        &config.chart_file,
        config.display,
    );
    load.records = table.into_rows();

    Ok(RunReport {
        load,
        metrics,
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::{
        config::{Config, DisplayMode},
        data::Error,
    };
    use std::path::Path;

    fn config(dir: &Path, expected_records: Option<usize>) -> Config {
        Config {
            input: dir.join("app_performance.csv"),
            output_dir: dir.join("imagens_analise"),
            chart_file: "distribuicao_servicos.png".to_string(),
            expected_records,
            display: DisplayMode::Headless,
        }
    }

    /// 10 data rows; rows 3 and 7 have unusable response times, the others
    /// are either 200 or 404.
    fn ten_rows() -> String {
        let rows = [
            "tx01,auth,200,120.0",
            "tx02,auth,404,80.0",
            "tx03,payments,200,timeout",
            "tx04,payments,200,200.0",
            "tx05,search,404,50.0",
            "tx06,auth,200,100.0",
            "tx07,search,200,",
            "tx08,auth,200,140.0",
            "tx09,payments,404,70.0",
            "tx10,auth,200,160.0",
        ];
        let mut csv = String::from("transaction_id,service_name,status_http,tempo_resposta_ms\n");
        for row in rows {
            csv.push_str(row);
            csv.push('\n');
        }
        csv
    }

    #[test]
    fn full_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Some(8));
        std::fs::write(&config.input, ten_rows()).unwrap();

        let report = run(&config).unwrap();

        assert_eq!(report.load.records.len(), 8);
        assert_eq!(report.load.skipped.len(), 2);
        assert_eq!(report.load.skipped[0].line, 4);
        assert_eq!(report.load.skipped[1].line, 8);
        assert_eq!(report.metrics.total_transacoes, 8);
        assert_eq!(report.metrics.total_sucesso, 5);
        assert_eq!(report.metrics.tempo_resposta_medio_ms, Some(144.0));
        assert_eq!(report.metrics.tempo_resposta_mediana_ms, Some(140.0));

        assert!(report.chart.saved);
        assert_eq!(report.chart.path, config.chart_path());
        assert!(std::fs::metadata(config.chart_path()).unwrap().len() > 0);
        let services: Vec<_> = report
            .chart
            .counts
            .iter()
            .map(|c| (c.service.as_str(), c.count))
            .collect();
        assert_eq!(services, [("auth", 4), ("payments", 1)]);
    }

    #[test]
    fn second_run_reuses_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), None);
        std::fs::write(&config.input, ten_rows()).unwrap();
        run(&config).unwrap();
        run(&config).unwrap();
        assert!(config.output_dir.is_dir());
    }

    #[test]
    fn missing_input_stops_before_anything_else() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), None);

        match run(&config) {
            Err(Error::InputNotFound { path, .. }) => assert_eq!(path, config.input),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn wrong_record_count_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Some(10));
        std::fs::write(&config.input, ten_rows()).unwrap();

        match run(&config) {
            Err(Error::UnexpectedRecordCount { expected, found }) => {
                assert_eq!((expected, found), (10, 8))
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn unusable_output_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), None);
        std::fs::write(&config.input, ten_rows()).unwrap();
        std::fs::write(&config.output_dir, b"").unwrap();

        assert!(matches!(run(&config), Err(Error::CreateDir { .. })));
    }
}
