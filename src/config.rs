use crate::core::prediction::{DEFAULT_BASE_LOAD_KW_PER_M2, DEFAULT_UNIT_RATE};
use crate::prediction_store::PredictionStore;
use crate::report_log::ReportLog;
use anyhow::anyhow;
use serde::Deserialize;
use serde_valid::Validate;
use std::io::Read;
use std::path::PathBuf;

pub const DEFAULT_TRAINING_DATA_FILE: &str = "prediction_training_data.csv";
pub const DEFAULT_REPORT_FILE: &str = "prediction_report.txt";

/// Settings injected into the engine and the stores. Any field left out of a configuration file
/// takes its default.
#[derive(Clone, Debug, Deserialize, PartialEq, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct PredictorConfig {
    pub data_directory: PathBuf,
    pub training_data_file: String,
    pub report_file: String,
    /// price of electricity, in currency units per kWh
    #[validate(minimum = 0.)]
    pub unit_rate: f64,
    /// non-thermal electrical demand per unit floor area, in kW/m2
    #[validate(minimum = 0.)]
    pub base_load_kw_per_m2: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("."),
            training_data_file: DEFAULT_TRAINING_DATA_FILE.to_string(),
            report_file: DEFAULT_REPORT_FILE.to_string(),
            unit_rate: DEFAULT_UNIT_RATE,
            base_load_kw_per_m2: DEFAULT_BASE_LOAD_KW_PER_M2,
        }
    }
}

impl PredictorConfig {
    pub fn from_json(json: impl Read) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_reader(json)?;
        config
            .validate()
            .map_err(|e| anyhow!("Invalid predictor configuration: {e}"))?;
        Ok(config)
    }

    pub fn with_data_directory(self, data_directory: impl Into<PathBuf>) -> Self {
        Self {
            data_directory: data_directory.into(),
            ..self
        }
    }

    pub fn training_data_path(&self) -> PathBuf {
        self.data_directory.join(&self.training_data_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.data_directory.join(&self.report_file)
    }

    pub fn prediction_store(&self) -> PredictionStore {
        PredictionStore::new(self.training_data_path())
    }

    pub fn report_log(&self) -> ReportLog {
        ReportLog::new(self.report_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::path::Path;

    #[rstest]
    fn should_default_every_field_from_empty_object() {
        assert_eq!(
            PredictorConfig::from_json("{}".as_bytes()).unwrap(),
            PredictorConfig::default()
        );
    }

    #[rstest]
    fn should_read_overrides() {
        let config = PredictorConfig::from_json(
            r#"{"data_directory": "/var/lib/predictor", "unit_rate": 0.31}"#.as_bytes(),
        )
        .unwrap();

        assert_eq!(config.unit_rate, 0.31);
        assert_eq!(config.base_load_kw_per_m2, 0.008);
        assert_eq!(
            config.training_data_path(),
            Path::new("/var/lib/predictor/prediction_training_data.csv")
        );
        assert_eq!(
            config.report_path(),
            Path::new("/var/lib/predictor/prediction_report.txt")
        );
    }

    #[rstest]
    #[case(r#"{"unit_rate": -0.1}"#)]
    #[case(r#"{"base_load_kw_per_m2": -1}"#)]
    #[case(r#"{"currency": "EUR"}"#)]
    #[case(r#"{"unit_rate": "cheap"}"#)]
    fn should_reject_invalid_config(#[case] json: &str) {
        assert!(PredictorConfig::from_json(json.as_bytes()).is_err());
    }

    #[rstest]
    fn should_override_data_directory() {
        let config = PredictorConfig::default().with_data_directory("/tmp/predictions");

        assert_eq!(
            config.prediction_store().path(),
            Path::new("/tmp/predictions/prediction_training_data.csv")
        );
        assert_eq!(
            config.report_log().path(),
            Path::new("/tmp/predictions/prediction_report.txt")
        );
    }
}
