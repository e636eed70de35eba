pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const PERCENT: f64 = 100.;

pub fn celsius_to_fahrenheit(temp_c: f64) -> f64 {
    temp_c * 9. / 5. + 32.
}

/// Temperature differences scale by 9/5 but do not take the 32 degree offset.
pub fn celsius_delta_to_fahrenheit(delta_c: f64) -> f64 {
    delta_c * 9. / 5.
}

pub fn watts_to_kilowatts(watts: f64) -> f64 {
    watts / WATTS_PER_KILOWATT as f64
}
