use serde::{Deserialize, Serialize};

/// The derived report returned for one (location, timestamp) query.
///
/// Every field is rounded to two decimals. Serialized field names follow the
/// public JSON contract of the forecast endpoint.
///
/// `rain_chance` is a heuristic linear score of humidity, pressure deficit and
/// wind speed. It is not a calibrated probability and can exceed 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(rename = "Temperatura_C")]
    pub temperature_c: f64,
    #[serde(rename = "Temperatura_F")]
    pub temperature_f: f64,
    /// Relative humidity, percent.
    #[serde(rename = "Umidade_Relativa")]
    pub relative_humidity: f64,
    #[serde(rename = "Chance_Chuva")]
    pub rain_chance: f64,
    /// Rain, mm per hour.
    #[serde(rename = "Precipitacao_chuva")]
    pub rain_per_hour: f64,
    /// Snow, mm water equivalent per hour.
    #[serde(rename = "Precipitacao_neve")]
    pub snow_per_hour: f64,
    /// Wind speed, m/s.
    #[serde(rename = "Velocidade_Vento")]
    pub wind_speed: f64,
    /// Surface pressure, hPa.
    #[serde(rename = "Pressao_Atmosferica")]
    pub pressure_hpa: f64,
    #[serde(rename = "Temperatura_K")]
    pub temperature_k: f64,
}
