pub mod additive;
pub mod error;
mod linalg;
pub mod point_forecaster;
