use crate::compare_floats::max_of_2;
use crate::core::units::PERCENT;
use crate::errors::UndefinedEvaluationError;
use crate::prediction_store::PredictionRecord;
use crate::statistics::{mean, percentile};
use tracing::debug;

/// This module compares predictions against actual metered usage once that becomes known.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluationResult {
    pub error_kwh: f64,
    pub percentage_error: f64,
    /// 100 minus the percentage error, floored at 0
    pub accuracy: f64,
}

/// Evaluate a prediction against the actual usage, where that is known.
///
/// Returns `Ok(None)` when no actual value was supplied. A percentage error cannot be formed
/// against an actual usage of zero (or one that is negative or not a number), in which case the
/// evaluation is unavailable and an error describes why.
///
/// Arguments:
/// * `predicted_kwh` - predicted energy usage, in kWh
/// * `actual_kwh` - measured energy usage over the same period, in kWh
pub fn evaluate(
    predicted_kwh: f64,
    actual_kwh: Option<f64>,
) -> Result<Option<EvaluationResult>, UndefinedEvaluationError> {
    let Some(actual_kwh) = actual_kwh else {
        return Ok(None);
    };

    if !predicted_kwh.is_finite() {
        return Err(UndefinedEvaluationError::NonFinitePrediction);
    }
    if !actual_kwh.is_finite() {
        return Err(UndefinedEvaluationError::NonFiniteActual);
    }
    if actual_kwh == 0. {
        return Err(UndefinedEvaluationError::ZeroActual);
    }
    if actual_kwh < 0. {
        return Err(UndefinedEvaluationError::NegativeActual { actual: actual_kwh });
    }

    let error_kwh = (predicted_kwh - actual_kwh).abs();
    let percentage_error = error_kwh / actual_kwh * PERCENT;
    let accuracy = max_of_2(0., PERCENT - percentage_error);

    Ok(Some(EvaluationResult {
        error_kwh,
        percentage_error,
        accuracy,
    }))
}

/// Model performance over all records that carry an actual usage value.
#[derive(Clone, Debug, PartialEq)]
pub struct AccuracySummary {
    /// absolute error of each labelled record, in dataset order, in kWh
    pub absolute_errors_kwh: Vec<f64>,
    pub mean_absolute_error_kwh: f64,
    pub median_absolute_error_kwh: f64,
    /// mean accuracy over the records whose evaluation is defined
    pub mean_accuracy: Option<f64>,
    /// labelled records whose percentage error is undefined (e.g. actual usage of zero)
    pub undefined_count: usize,
}

impl AccuracySummary {
    /// Summarise the labelled records among `records`, or return None if there are none.
    pub fn from_records(records: impl IntoIterator<Item = PredictionRecord>) -> Option<Self> {
        let mut absolute_errors_kwh = vec![];
        let mut accuracies = vec![];
        let mut undefined_count = 0;

        for record in records {
            let Some(actual_kwh) = record.actual_kwh else {
                continue;
            };
            if !(record.predicted_kwh.is_finite() && actual_kwh.is_finite()) {
                continue;
            }
            absolute_errors_kwh.push((record.predicted_kwh - actual_kwh).abs());

            match evaluate(record.predicted_kwh, Some(actual_kwh)) {
                Ok(Some(evaluation)) => accuracies.push(evaluation.accuracy),
                Ok(None) => {}
                Err(e) => {
                    debug!("Excluding record from {} from accuracy: {e}", record.timestamp);
                    undefined_count += 1;
                }
            }
        }

        if absolute_errors_kwh.is_empty() {
            return None;
        }

        Some(Self {
            mean_absolute_error_kwh: mean(&absolute_errors_kwh),
            median_absolute_error_kwh: percentile(&absolute_errors_kwh, 50),
            mean_accuracy: (!accuracies.is_empty()).then(|| mean(&accuracies)),
            undefined_count,
            absolute_errors_kwh,
        })
    }

    pub fn labelled_count(&self) -> usize {
        self.absolute_errors_kwh.len()
    }
}
