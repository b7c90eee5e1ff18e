pub mod forecast_point;
pub mod into_utc_trait;
pub mod time_series;
pub mod tracked_variable;
pub mod weather_report;
