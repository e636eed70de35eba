use crate::core::prediction::{DerivedFeatures, PredictionResult};
use crate::core::units::PERCENT;
use crate::prediction_store::TIMESTAMP_FORMAT;
use anyhow::Context;
use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A human-readable, append-only text log with one timestamped line per prediction.
#[derive(Clone, Debug)]
pub struct ReportLog {
    path: PathBuf,
}

impl ReportLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, timestamp: NaiveDateTime, text: &str) -> anyhow::Result<()> {
        let line = format!("[{}] {text}\n", timestamp.format(TIMESTAMP_FORMAT));
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .with_context(|| format!("Could not append to report log {}", self.path.display()))
    }

    /// All entries written so far, oldest first. Empty if nothing has been logged yet.
    pub fn read_entries(&self) -> anyhow::Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.lines().map(str::to_owned).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e)
                .with_context(|| format!("Could not read report log {}", self.path.display())),
        }
    }
}

pub fn prediction_line(
    features: &DerivedFeatures,
    result: &PredictionResult,
    duration_hours: f64,
) -> String {
    format!(
        "Prediction: {:.2} kWh for {:.1}h, U-value={:.3}, thermal_load={:.0}W, efficiency={:.0}%",
        result.predicted_kwh,
        duration_hours,
        features.u_value,
        result.thermal_load_w,
        result.system_efficiency * PERCENT,
    )
}
