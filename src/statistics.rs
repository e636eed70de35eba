/// A simple statistics module with some utility functions such as calculation of means and percentiles.
use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Arithmetic mean, or NaN for an empty slice.
pub fn mean(numbers: &[f64]) -> f64 {
    numbers.iter().mean()
}

pub fn percentile(numbers: &[f64], percentile: usize) -> f64 {
    let numbers = numbers.to_vec();
    let mut data = Data::new(numbers);

    data.percentile(percentile)
}
