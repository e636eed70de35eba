mod compare_floats;
pub mod config;
pub mod core;
pub mod errors;
pub mod prediction_store;
pub mod report_log;
mod statistics;

use crate::core::accuracy::{evaluate, EvaluationResult};
use crate::core::prediction::{DerivedFeatures, PredictionEngine, PredictionResult, ThermalInputs};
use crate::errors::{PredictorError, UndefinedEvaluationError};
use crate::prediction_store::{PredictionRecord, PredictionStore};
use crate::report_log::{prediction_line, ReportLog};
use chrono::{Local, SubsecRound};
use tracing::warn;

pub use crate::config::PredictorConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct PredictionOutcome {
    pub features: DerivedFeatures,
    pub result: PredictionResult,
    /// `Ok(None)` when no actual usage was supplied, `Err` when one was supplied but the
    /// prediction could not be evaluated against it.
    pub evaluation: Result<Option<EvaluationResult>, UndefinedEvaluationError>,
    pub record: PredictionRecord,
}

/// Predict energy usage for the given inputs, evaluate it against the actual usage where known,
/// and log it to both the training dataset and the report log.
///
/// Invalid inputs are reported before anything is written. An actual usage that cannot be
/// evaluated against (such as zero) is still recorded, with the evaluation left out.
///
/// The dataset record is appended before the report line. If the report log cannot be written
/// the error is returned, but the record stays in the dataset.
pub fn run_prediction(
    engine: &PredictionEngine,
    store: &PredictionStore,
    report_log: &ReportLog,
    inputs: &ThermalInputs,
    actual_kwh: Option<f64>,
) -> Result<PredictionOutcome, PredictorError> {
    let (features, result) = engine.predict(inputs)?;

    let evaluation = evaluate(result.predicted_kwh, actual_kwh);
    if let Err(e) = &evaluation {
        warn!("Prediction could not be evaluated: {e}");
    }

    // NaN and infinite actual values never reach the dataset
    let actual_kwh = actual_kwh.filter(|actual| actual.is_finite());

    let timestamp = Local::now().naive_local().trunc_subsecs(0);
    let record = PredictionRecord::new(timestamp, inputs, &features, &result, actual_kwh);
    store.append(&record)?;
    report_log.append(
        timestamp,
        &prediction_line(&features, &result, inputs.duration_hours()),
    )?;

    Ok(PredictionOutcome {
        features,
        result,
        evaluation,
        record,
    })
}
