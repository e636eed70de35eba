pub mod accuracy;
pub mod building_physics;
pub mod prediction;
pub mod units;
