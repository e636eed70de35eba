use crate::config::PredictorConfig;
use crate::core::building_physics::{
    heating_load_watts, rating_to_u_value, system_efficiency, InsulationRating, OperatingMode,
};
use crate::core::units::watts_to_kilowatts;
use crate::errors::InvalidInputError;
use tracing::debug;

/// This module provides the prediction engine, which turns the raw description of a building and
/// its conditions into an estimate of electrical energy use and its cost.

// Lighting, equipment and ventilation baseline of 8 W/m2
pub const DEFAULT_BASE_LOAD_KW_PER_M2: f64 = 0.008;
pub const DEFAULT_UNIT_RATE: f64 = 0.25; // currency units per kWh

/// Raw inputs for a single prediction. Can only be constructed from values within their domains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalInputs {
    outdoor_temp_c: f64,
    indoor_temp_c: f64,
    area_m2: f64,
    insulation_rating: InsulationRating,
    duration_hours: f64,
}

impl ThermalInputs {
    /// Arguments:
    /// * `outdoor_temp_c` - outdoor air temperature, in deg C
    /// * `indoor_temp_c` - desired indoor temperature, in deg C
    /// * `area_m2` - building floor area, in m2
    /// * `insulation_rating` - insulation quality, 1 (poor) to 10 (excellent)
    /// * `duration_hours` - length of the period being predicted, in hours
    pub fn new(
        outdoor_temp_c: f64,
        indoor_temp_c: f64,
        area_m2: f64,
        insulation_rating: f64,
        duration_hours: f64,
    ) -> Result<Self, InvalidInputError> {
        for (field, value) in [
            ("outdoor temperature", outdoor_temp_c),
            ("indoor temperature", indoor_temp_c),
            ("floor area", area_m2),
            ("time period", duration_hours),
        ] {
            if !value.is_finite() {
                return Err(InvalidInputError::NonFinite { field });
            }
        }
        if area_m2 <= 0. {
            return Err(InvalidInputError::NonPositiveArea { area: area_m2 });
        }
        let insulation_rating = InsulationRating::new(insulation_rating)?;
        if duration_hours <= 0. {
            return Err(InvalidInputError::NonPositiveDuration {
                hours: duration_hours,
            });
        }

        Ok(Self {
            outdoor_temp_c,
            indoor_temp_c,
            area_m2,
            insulation_rating,
            duration_hours,
        })
    }

    pub fn outdoor_temp_c(&self) -> f64 {
        self.outdoor_temp_c
    }

    pub fn indoor_temp_c(&self) -> f64 {
        self.indoor_temp_c
    }

    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    pub fn insulation_rating(&self) -> InsulationRating {
        self.insulation_rating
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_hours
    }
}

/// Variables derived from the raw inputs before the physics model is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedFeatures {
    pub temp_diff_c: f64,
    pub mode: OperatingMode,
    pub u_value: f64, // in W/(m2.K)
}

impl DerivedFeatures {
    pub fn heating_mode(&self) -> bool {
        self.mode.is_heating()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PredictionResult {
    pub thermal_load_w: f64,
    pub system_efficiency: f64,
    pub electrical_power_kw: f64,
    pub base_load_kw: f64,
    pub total_power_kw: f64,
    pub predicted_kwh: f64,
    pub estimated_cost: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct PredictionEngine {
    unit_rate: f64,
    base_load_kw_per_m2: f64,
}

impl PredictionEngine {
    /// Arguments:
    /// * `unit_rate` - price of electricity, in currency units per kWh
    /// * `base_load_kw_per_m2` - non-thermal electrical demand per unit floor area, in kW/m2
    pub fn new(unit_rate: f64, base_load_kw_per_m2: f64) -> Self {
        Self {
            unit_rate,
            base_load_kw_per_m2,
        }
    }

    pub fn from_config(config: &PredictorConfig) -> Self {
        Self::new(config.unit_rate, config.base_load_kw_per_m2)
    }

    pub fn unit_rate(&self) -> f64 {
        self.unit_rate
    }

    /// Derive features from the inputs and estimate energy use over the input time period.
    pub fn predict(
        &self,
        inputs: &ThermalInputs,
    ) -> Result<(DerivedFeatures, PredictionResult), InvalidInputError> {
        let temp_diff_c = inputs.indoor_temp_c - inputs.outdoor_temp_c;
        let mode = OperatingMode::from_temp_diff(temp_diff_c);
        let u_value = rating_to_u_value(inputs.insulation_rating.value())?;

        let thermal_load_w = heating_load_watts(inputs.area_m2, u_value, temp_diff_c);
        let system_efficiency = system_efficiency(temp_diff_c, mode);
        let electrical_power_kw = watts_to_kilowatts(thermal_load_w) / system_efficiency;
        let base_load_kw = inputs.area_m2 * self.base_load_kw_per_m2;
        let total_power_kw = electrical_power_kw + base_load_kw;
        let predicted_kwh = total_power_kw * inputs.duration_hours;
        let estimated_cost = predicted_kwh * self.unit_rate;

        debug!(
            temp_diff_c,
            %mode,
            u_value,
            thermal_load_w,
            system_efficiency,
            predicted_kwh,
            "Predicted energy usage"
        );

        Ok((
            DerivedFeatures {
                temp_diff_c,
                mode,
                u_value,
            },
            PredictionResult {
                thermal_load_w,
                system_efficiency,
                electrical_power_kw,
                base_load_kw,
                total_power_kw,
                predicted_kwh,
                estimated_cost,
            },
        ))
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_RATE, DEFAULT_BASE_LOAD_KW_PER_M2)
    }
}
