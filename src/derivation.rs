//! Turns the six forecast values into the human-facing [`WeatherReport`].
//!
//! Everything here is pure arithmetic: no I/O and no failure path.

use crate::types::forecast_point::ForecastValues;
use crate::types::weather_report::WeatherReport;
use crate::utils::round2;
use bon::Builder;

const KELVIN_OFFSET: f64 = 273.15;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Weights of the rain-chance score and its reference pressure.
///
/// The score is `humidity_weight * RH + pressure_weight * (reference_pressure_hpa - P_hPa)
/// + wind_weight * wind`. Defaults are the values the public report has always used.
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct DerivationConstants {
    #[builder(default = 0.5)]
    pub humidity_weight: f64,
    #[builder(default = 0.1)]
    pub pressure_weight: f64,
    #[builder(default = 0.05)]
    pub wind_weight: f64,
    #[builder(default = 1013.0)]
    pub reference_pressure_hpa: f64,
}

impl Default for DerivationConstants {
    fn default() -> Self {
        Self::builder().build()
    }
}

pub fn celsius_from_kelvin(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn fahrenheit_from_celsius(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn celsius_from_fahrenheit(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) / 1.8
}

/// Relative humidity in percent from specific humidity (kg/kg), temperature (°C)
/// and pressure in Pa.
///
/// Saturation vapour pressure uses the Bolton approximation, converted to Pa.
pub fn relative_humidity(specific_humidity: f64, temperature_c: f64, pressure_pa: f64) -> f64 {
    let saturation = 6.112 * ((17.67 * temperature_c) / (temperature_c + 243.5)).exp() * 100.0;
    let vapour = (specific_humidity * pressure_pa) / (0.622 + specific_humidity);
    (vapour / saturation) * 100.0
}

/// Heuristic rain-chance score. Not a calibrated probability.
pub fn rain_chance(
    relative_humidity: f64,
    pressure_hpa: f64,
    wind_speed: f64,
    constants: &DerivationConstants,
) -> f64 {
    constants.humidity_weight * relative_humidity
        + constants.pressure_weight * (constants.reference_pressure_hpa - pressure_hpa)
        + constants.wind_weight * wind_speed
}

/// Derives the report from a complete set of forecast values.
pub fn derive(values: &ForecastValues, constants: &DerivationConstants) -> WeatherReport {
    let celsius = celsius_from_kelvin(values.temperature_k);
    // hPa is the unit reported and fed to the rain score; humidity takes it back in Pa.
    let pressure_hpa = values.pressure_pa / 100.0;
    let humidity = relative_humidity(values.specific_humidity, celsius, pressure_hpa * 100.0);
    let chance = rain_chance(humidity, pressure_hpa, values.wind_speed, constants);

    WeatherReport {
        temperature_c: round2(celsius),
        temperature_f: round2(fahrenheit_from_celsius(celsius)),
        relative_humidity: round2(humidity),
        rain_chance: round2(chance),
        rain_per_hour: round2(values.rain_rate * SECONDS_PER_HOUR),
        snow_per_hour: round2(values.snow_rate * SECONDS_PER_HOUR),
        wind_speed: round2(values.wind_speed),
        pressure_hpa: round2(pressure_hpa),
        temperature_k: round2(values.temperature_k),
    }
}

/// [`derive`] from the six raw values with the default constants.
pub fn derive_weather(
    temperature_k: f64,
    specific_humidity: f64,
    rain_rate: f64,
    snow_rate: f64,
    wind_speed: f64,
    pressure_pa: f64,
) -> WeatherReport {
    let values = ForecastValues {
        temperature_k,
        specific_humidity,
        rain_rate,
        snow_rate,
        wind_speed,
        pressure_pa,
    };
    derive(&values, &DerivationConstants::default())
}
