use crate::errors::InvalidInputError;
use std::fmt::Display;
use std::str::FromStr;

/// This module provides the steady-state building physics used by the predictor: envelope
/// U-values derived from an insulation rating, fabric heat flow and HVAC system efficiency.

pub const MIN_INSULATION_RATING: f64 = 1.;
pub const MAX_INSULATION_RATING: f64 = 10.;

// Linear fit from a poor envelope (rating 1, ~2.0 W/m2.K, old single-glazed stock)
// down to passive house standard (rating 10, 0.15 W/m2.K)
const U_VALUE_INTERCEPT: f64 = 2.15; // in W/(m2.K)
const U_VALUE_PER_RATING_POINT: f64 = 0.2; // in W/(m2.K)

// Efficiency bands as (|temp diff| strictly above, efficiency), most severe first
const HEATING_EFFICIENCY_BANDS: [(f64, f64); 2] = [(20., 0.65), (10., 0.75)];
const HEATING_EFFICIENCY_MILD: f64 = 0.85;
const COOLING_EFFICIENCY_BANDS: [(f64, f64); 2] = [(15., 0.70), (8., 0.80)];
const COOLING_EFFICIENCY_MILD: f64 = 0.90;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatingMode {
    Heating,
    Cooling,
}

impl OperatingMode {
    /// Heating only when indoors is strictly warmer than outdoors, so a zero difference counts
    /// as cooling.
    pub fn from_temp_diff(temp_diff: f64) -> Self {
        if temp_diff > 0. {
            Self::Heating
        } else {
            Self::Cooling
        }
    }

    pub fn is_heating(&self) -> bool {
        matches!(self, Self::Heating)
    }
}

impl Display for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatingMode::Heating => write!(f, "Heating"),
            OperatingMode::Cooling => write!(f, "Cooling"),
        }
    }
}

/// An insulation quality rating on the 1 (poor) to 10 (excellent) scale.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct InsulationRating(f64);

impl InsulationRating {
    pub fn new(rating: f64) -> Result<Self, InvalidInputError> {
        if !(MIN_INSULATION_RATING..=MAX_INSULATION_RATING).contains(&rating) {
            return Err(InvalidInputError::InsulationRatingOutOfRange { rating });
        }

        Ok(Self(rating))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn u_value(&self) -> f64 {
        U_VALUE_INTERCEPT - self.0 * U_VALUE_PER_RATING_POINT
    }
}

impl Display for InsulationRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for InsulationRating {
    type Error = InvalidInputError;

    fn try_from(rating: f64) -> Result<Self, Self::Error> {
        Self::new(rating)
    }
}

impl FromStr for InsulationRating {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rating = s.trim().parse::<f64>()?;
        Ok(Self::new(rating)?)
    }
}

/// Convert a 1-10 insulation rating to an envelope U-value, in W/(m2.K)
///
/// Arguments:
/// * `rating` - insulation quality, 1 (poor) to 10 (excellent) inclusive
pub fn rating_to_u_value(rating: f64) -> Result<f64, InvalidInputError> {
    Ok(InsulationRating::new(rating)?.u_value())
}

/// Calculate the heat flow through the building envelope, in W (Q = U x A x |dT|)
///
/// The sign of the temperature difference only selects heating or cooling elsewhere; the load
/// magnitude is the same either way.
///
/// Arguments:
/// * `area` - envelope area, in m2
/// * `u_value` - heat transfer coefficient, in W/(m2.K)
/// * `temp_diff` - indoor minus outdoor temperature, in K (or deg C)
pub fn heating_load_watts(area: f64, u_value: f64, temp_diff: f64) -> f64 {
    u_value * area * temp_diff.abs()
}

/// Fraction of electrical input delivered as useful heating or cooling.
///
/// Efficiency falls in steps as |dT| grows. Band thresholds are exclusive: a difference exactly
/// on a threshold belongs to the milder band.
pub fn system_efficiency(temp_diff: f64, mode: OperatingMode) -> f64 {
    let (bands, mild) = match mode {
        OperatingMode::Heating => (&HEATING_EFFICIENCY_BANDS, HEATING_EFFICIENCY_MILD),
        OperatingMode::Cooling => (&COOLING_EFFICIENCY_BANDS, COOLING_EFFICIENCY_MILD),
    };
    let magnitude = temp_diff.abs();

    bands
        .iter()
        .find(|(threshold, _)| magnitude > *threshold)
        .map_or(mild, |(_, efficiency)| *efficiency)
}
