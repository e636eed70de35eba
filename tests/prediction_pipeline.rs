use approx::assert_relative_eq;
use energy_predictor::core::accuracy::AccuracySummary;
use energy_predictor::core::prediction::{PredictionEngine, ThermalInputs};
use energy_predictor::errors::{InvalidInputError, PredictorError, UndefinedEvaluationError};
use energy_predictor::{run_prediction, PredictorConfig};
use pretty_assertions::assert_eq;
use rstest::*;
use tempfile::{tempdir, TempDir};

#[fixture]
fn data_dir() -> TempDir {
    tempdir().unwrap()
}

#[fixture]
fn config(data_dir: TempDir) -> (TempDir, PredictorConfig) {
    let config = PredictorConfig::default().with_data_directory(data_dir.path());
    (data_dir, config)
}

#[rstest]
fn should_predict_evaluate_and_log(config: (TempDir, PredictorConfig)) {
    let (_dir, config) = config;
    let engine = PredictionEngine::from_config(&config);
    let store = config.prediction_store();
    let report_log = config.report_log();
    let inputs = ThermalInputs::new(0., 20., 100., 10., 24.).unwrap();

    let outcome = run_prediction(&engine, &store, &report_log, &inputs, Some(24.)).unwrap();

    assert_relative_eq!(outcome.result.predicted_kwh, 28.8, max_relative = 1e-12);
    let evaluation = outcome.evaluation.clone().unwrap().unwrap();
    assert_relative_eq!(evaluation.error_kwh, 4.8, max_relative = 1e-9);
    assert_relative_eq!(evaluation.percentage_error, 20., max_relative = 1e-9);
    assert_relative_eq!(evaluation.accuracy, 80., max_relative = 1e-9);

    let records = store.read_all().unwrap().collect::<Vec<_>>();
    assert_eq!(records, vec![outcome.record.clone()]);
    assert_eq!(records[0].temp_diff_c, 20.);
    assert_eq!(records[0].actual_kwh, Some(24.));

    let entries = report_log.read_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].ends_with(
        "] Prediction: 28.80 kWh for 24.0h, U-value=0.150, thermal_load=300W, efficiency=75%"
    ));
}

#[rstest]
fn should_write_nothing_for_invalid_inputs(config: (TempDir, PredictorConfig)) {
    let (_dir, config) = config;
    assert_eq!(
        ThermalInputs::new(0., 20., 100., 11., 24.).unwrap_err(),
        InvalidInputError::InsulationRatingOutOfRange { rating: 11. }
    );

    assert_eq!(config.prediction_store().read_all().unwrap().count(), 0);
    assert!(config.report_log().read_entries().unwrap().is_empty());
}

#[rstest]
fn should_record_zero_actual_without_evaluation(config: (TempDir, PredictorConfig)) {
    let (_dir, config) = config;
    let store = config.prediction_store();
    let inputs = ThermalInputs::new(18., 20., 60., 7., 1.).unwrap();

    let outcome = run_prediction(
        &PredictionEngine::from_config(&config),
        &store,
        &config.report_log(),
        &inputs,
        Some(0.),
    )
    .unwrap();

    assert_eq!(outcome.evaluation, Err(UndefinedEvaluationError::ZeroActual));
    let records = store.read_all().unwrap().collect::<Vec<_>>();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].actual_kwh, Some(0.));
}

#[rstest]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
#[case(f64::NEG_INFINITY)]
fn should_keep_non_finite_actual_out_of_dataset(
    config: (TempDir, PredictorConfig),
    #[case] actual_kwh: f64,
) {
    let (_dir, config) = config;
    let store = config.prediction_store();
    let inputs = ThermalInputs::new(0., 20., 100., 10., 24.).unwrap();

    let outcome = run_prediction(
        &PredictionEngine::from_config(&config),
        &store,
        &config.report_log(),
        &inputs,
        Some(actual_kwh),
    )
    .unwrap();

    assert_eq!(
        outcome.evaluation,
        Err(UndefinedEvaluationError::NonFiniteActual)
    );
    assert_eq!(outcome.record.actual_kwh, None);
    let records = store.read_all().unwrap().collect::<Vec<_>>();
    assert_eq!(records, vec![outcome.record]);
    assert_eq!(records[0].actual_kwh, None);
}

#[rstest]
fn should_append_whole_record_after_truncated_row(config: (TempDir, PredictorConfig)) {
    let (_dir, config) = config;
    let store = config.prediction_store();
    std::fs::write(
        store.path(),
        "timestamp,outdoor_temp,indoor_temp,temp_diff,area,insulation_rating,predicted_kwh,actual_kwh\n\
         2024-01-15 09:30:05,0,20",
    )
    .unwrap();
    let inputs = ThermalInputs::new(0., 20., 100., 10., 24.).unwrap();

    let outcome = run_prediction(
        &PredictionEngine::from_config(&config),
        &store,
        &config.report_log(),
        &inputs,
        None,
    )
    .unwrap();

    let mut records = store.read_all().unwrap();
    assert_eq!(records.by_ref().collect::<Vec<_>>(), vec![outcome.record]);
    assert_eq!(records.skipped_rows(), 1);
}

#[rstest]
fn should_summarise_accuracy_across_runs(config: (TempDir, PredictorConfig)) {
    let (_dir, config) = config;
    let engine = PredictionEngine::from_config(&config);
    let store = config.prediction_store();
    let report_log = config.report_log();
    let inputs = ThermalInputs::new(0., 20., 100., 10., 24.).unwrap();

    run_prediction(&engine, &store, &report_log, &inputs, None).unwrap();
    run_prediction(&engine, &store, &report_log, &inputs, Some(28.8)).unwrap();
    run_prediction(&engine, &store, &report_log, &inputs, Some(36.)).unwrap();

    let summary = AccuracySummary::from_records(store.read_all().unwrap()).unwrap();

    assert_eq!(summary.labelled_count(), 2);
    assert_relative_eq!(summary.mean_absolute_error_kwh, 3.6, max_relative = 1e-9);
    assert_relative_eq!(summary.mean_accuracy.unwrap(), 90., max_relative = 1e-9);
    assert_eq!(report_log.read_entries().unwrap().len(), 3);
}

#[rstest]
fn should_fail_when_data_directory_is_missing() {
    let dir = tempdir().unwrap();
    let config = PredictorConfig::default().with_data_directory(dir.path().join("missing"));
    let inputs = ThermalInputs::new(0., 20., 100., 10., 24.).unwrap();

    let result = run_prediction(
        &PredictionEngine::from_config(&config),
        &config.prediction_store(),
        &config.report_log(),
        &inputs,
        None,
    );

    assert!(matches!(result, Err(PredictorError::Storage(_))));
}
