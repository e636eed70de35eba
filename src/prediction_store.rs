use crate::core::prediction::{DerivedFeatures, PredictionResult, ThermalInputs};
use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// This module provides the append-only dataset of predictions, kept as a CSV file so that it can
/// be used as training data for a learned model later on.

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DATASET_HEADER: [&str; 8] = [
    "timestamp",
    "outdoor_temp",
    "indoor_temp",
    "temp_diff",
    "area",
    "insulation_rating",
    "predicted_kwh",
    "actual_kwh",
];

/// One persisted prediction. Records are never rewritten once appended; a correction is a new
/// record.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PredictionRecord {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "outdoor_temp")]
    pub outdoor_temp_c: f64,
    #[serde(rename = "indoor_temp")]
    pub indoor_temp_c: f64,
    #[serde(rename = "temp_diff")]
    pub temp_diff_c: f64,
    #[serde(rename = "area")]
    pub area_m2: f64,
    pub insulation_rating: f64,
    pub predicted_kwh: f64,
    #[serde(deserialize_with = "deserialize_actual_kwh")]
    pub actual_kwh: Option<f64>,
}

impl PredictionRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        inputs: &ThermalInputs,
        features: &DerivedFeatures,
        result: &PredictionResult,
        actual_kwh: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            outdoor_temp_c: inputs.outdoor_temp_c(),
            indoor_temp_c: inputs.indoor_temp_c(),
            temp_diff_c: features.temp_diff_c,
            area_m2: inputs.area_m2(),
            insulation_rating: inputs.insulation_rating().value(),
            predicted_kwh: result.predicted_kwh,
            actual_kwh,
        }
    }
}

mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        timestamp: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}

// An empty cell means no actual usage was given. Older datasets spell this "None".
fn deserialize_actual_kwh<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    let value = String::deserialize(deserializer)?;
    match value.trim() {
        "" | "None" => Ok(None),
        number => number.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Clone, Debug)]
pub struct PredictionStore {
    path: PathBuf,
}

impl PredictionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record to the dataset, creating the file with its header row if it does not yet
    /// exist (or is empty).
    ///
    /// The record (and the header, on first use) is serialized up front and reaches the file in
    /// a single write. If the file ends part way through a row, that row is terminated first so
    /// the new record starts on its own line.
    pub fn append(&self, record: &PredictionRecord) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Could not open dataset {}", self.path.display()))?;
        let needs_header = file.metadata()?.len() == 0;

        let mut buffer = Vec::with_capacity(256);
        if !needs_header && !ends_with_newline(&mut file)? {
            warn!(
                "Dataset {} ends with an incomplete row, starting a new line",
                self.path.display()
            );
            buffer.push(b'\n');
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(buffer);
        if needs_header {
            writer.write_record(DATASET_HEADER)?;
        }
        writer.serialize(record)?;
        let line = writer.into_inner().map_err(|e| e.into_error())?;

        file.write_all(&line)
            .with_context(|| format!("Could not append to dataset {}", self.path.display()))?;

        if needs_header {
            info!("Created prediction dataset at {}", self.path.display());
        }

        Ok(())
    }

    /// Lazily read back every record in the order it was appended.
    ///
    /// A dataset that does not exist yet reads as empty. Each call starts again from the
    /// beginning of the file.
    pub fn read_all(&self) -> anyhow::Result<PredictionRecords> {
        let file = match File::open(&self.path) {
            Ok(file) => Some(file),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Could not open dataset {}", self.path.display())
                })
            }
        };
        if let Some(file) = &file {
            if !file.metadata()?.is_file() {
                bail!("Dataset {} is not a regular file", self.path.display());
            }
        }

        Ok(PredictionRecords {
            records: file.map(|file| {
                ReaderBuilder::new()
                    .flexible(true)
                    .from_reader(file)
                    .into_deserialize()
            }),
            skipped_rows: 0,
        })
    }
}

fn ends_with_newline(file: &mut File) -> anyhow::Result<bool> {
    let mut last_byte = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last_byte)?;

    Ok(last_byte[0] == b'\n')
}

/// Iterator over the records of a dataset. Rows that cannot be read as a record are skipped
/// (and counted) rather than ending the iteration.
pub struct PredictionRecords {
    records: Option<csv::DeserializeRecordsIntoIter<File, PredictionRecord>>,
    skipped_rows: usize,
}

impl PredictionRecords {
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

impl Iterator for PredictionRecords {
    type Item = PredictionRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let records = self.records.as_mut()?;
        loop {
            match records.next()? {
                Ok(record) => return Some(record),
                Err(e) => {
                    self.skipped_rows += 1;
                    warn!("Skipping malformed row in prediction dataset: {e}");
                }
            }
        }
    }
}
