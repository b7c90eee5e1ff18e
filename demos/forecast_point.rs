use parade_forecast::{ForecastConfig, ForecastError, ForecastRequest, Forecaster};
use serde_json::to_string_pretty;
use std::env;

// Needs EARTHDATA_USERNAME and EARTHDATA_PASSWORD set.
// Usage: forecast_point [LAT] [LON] [YYYY-MM-DDTHH:MM]
#[tokio::main]
async fn main() -> Result<(), ForecastError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let latitude = args.first().and_then(|s| s.parse().ok()).or(Some(-23.55));
    let longitude = args.get(1).and_then(|s| s.parse().ok()).or(Some(-46.63));
    let datetime = args.get(2).map(String::as_str).or(Some("2025-12-24T20:15"));

    let request = ForecastRequest::from_parts(latitude, longitude, datetime)?;
    let forecaster = Forecaster::from_env(ForecastConfig::default())?;

    match forecaster.forecast_request(&request).await {
        Ok(report) => {
            let json = to_string_pretty(&report).unwrap();
            println!("{}", json);
        }
        Err(e) if e.is_auth_failure() => eprintln!("Earthdata login failed: {}", e),
        Err(e) => return Err(e),
    }
    Ok(())
}
