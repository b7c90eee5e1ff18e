//! Per-variable forecast results and the keyed set handed to the derivation step.

use crate::types::tracked_variable::TrackedVariable;
use bon::Builder;
use chrono::{DateTime, Utc};
use std::fmt;

/// Pipeline stage at which a variable became unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// The shared token could not be obtained.
    Auth,
    /// The provider query for this variable failed.
    Transport,
    /// The provider response could not be parsed.
    Parse,
    /// Too little data, or the model gave no usable estimate.
    Forecast,
    /// No result was produced at all.
    Missing,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::Auth => "auth",
            FailureStage::Transport => "transport",
            FailureStage::Parse => "parse",
            FailureStage::Forecast => "forecast",
            FailureStage::Missing => "missing",
        };
        f.write_str(name)
    }
}

/// The outcome of forecasting one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Estimate {
    Value(f64),
    /// The variable could not be forecast.
    Unavailable { stage: FailureStage, reason: String },
}

/// A single predicted value for one variable at the target timestamp, or "unavailable".
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub variable: TrackedVariable,
    pub target: DateTime<Utc>,
    pub estimate: Estimate,
}

impl ForecastPoint {
    pub fn value(variable: TrackedVariable, target: DateTime<Utc>, value: f64) -> Self {
        Self {
            variable,
            target,
            estimate: Estimate::Value(value),
        }
    }

    pub fn unavailable(
        variable: TrackedVariable,
        target: DateTime<Utc>,
        stage: FailureStage,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            variable,
            target,
            estimate: Estimate::Unavailable {
                stage,
                reason: reason.into(),
            },
        }
    }

    /// The estimate, if it is a finite number.
    pub fn estimate_value(&self) -> Option<f64> {
        match self.estimate {
            Estimate::Value(v) if v.is_finite() => Some(v),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.estimate_value().is_some()
    }
}

/// A variable that failed the all-or-nothing gate, with the reason why.
#[derive(Debug, Clone, PartialEq)]
pub struct UnavailableVariable {
    pub variable: TrackedVariable,
    pub stage: FailureStage,
    pub reason: String,
}

impl fmt::Display for UnavailableVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.variable, self.stage, self.reason)
    }
}

/// Forecast values for all six tracked variables, keyed by variable.
///
/// Only constructible with every variable present, so the derivation step never
/// sees a partial set.
///
/// # Examples
///
/// ```
/// use parade_forecast::{ForecastValues, TrackedVariable};
///
/// let values = ForecastValues::builder()
///     .temperature_k(300.0)
///     .specific_humidity(0.01)
///     .rain_rate(0.0002)
///     .snow_rate(0.0)
///     .wind_speed(3.0)
///     .pressure_pa(101_300.0)
///     .build();
/// assert_eq!(values.get(TrackedVariable::WindSpeed), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct ForecastValues {
    /// Air temperature in Kelvin.
    pub temperature_k: f64,
    /// Specific humidity in kg/kg.
    pub specific_humidity: f64,
    /// Rain rate in kg m-2 s-1.
    pub rain_rate: f64,
    /// Snow rate in kg m-2 s-1.
    pub snow_rate: f64,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    /// Surface pressure in Pa.
    pub pressure_pa: f64,
}

impl ForecastValues {
    pub fn get(&self, variable: TrackedVariable) -> f64 {
        match variable {
            TrackedVariable::Temperature => self.temperature_k,
            TrackedVariable::Humidity => self.specific_humidity,
            TrackedVariable::RainRate => self.rain_rate,
            TrackedVariable::SnowRate => self.snow_rate,
            TrackedVariable::WindSpeed => self.wind_speed,
            TrackedVariable::Pressure => self.pressure_pa,
        }
    }

    /// Collects forecast points into a keyed set.
    ///
    /// Every tracked variable must have exactly one available point. Otherwise the
    /// missing or unavailable variables are returned, in fixed variable order.
    pub fn from_points(points: &[ForecastPoint]) -> Result<Self, Vec<UnavailableVariable>> {
        let mut slots: [Option<f64>; 6] = [None; 6];
        let mut unavailable = Vec::new();

        for point in points {
            match &point.estimate {
                Estimate::Value(v) if v.is_finite() => {
                    let slot = &mut slots[point.variable.index()];
                    if slot.is_some() {
                        unavailable.push(UnavailableVariable {
                            variable: point.variable,
                            stage: FailureStage::Forecast,
                            reason: "more than one forecast point".to_string(),
                        });
                    }
                    *slot = Some(*v);
                }
                Estimate::Value(v) => unavailable.push(UnavailableVariable {
                    variable: point.variable,
                    stage: FailureStage::Forecast,
                    reason: format!("non-finite estimate {}", v),
                }),
                Estimate::Unavailable { stage, reason } => unavailable.push(UnavailableVariable {
                    variable: point.variable,
                    stage: *stage,
                    reason: reason.clone(),
                }),
            }
        }

        for variable in TrackedVariable::ALL {
            let reported = unavailable.iter().any(|u| u.variable == variable);
            if slots[variable.index()].is_none() && !reported {
                unavailable.push(UnavailableVariable {
                    variable,
                    stage: FailureStage::Missing,
                    reason: "no forecast produced".to_string(),
                });
            }
        }

        if !unavailable.is_empty() {
            unavailable.sort_by_key(|u| u.variable);
            return Err(unavailable);
        }

        let value = |variable: TrackedVariable| slots[variable.index()].unwrap_or(f64::NAN);
        Ok(Self {
            temperature_k: value(TrackedVariable::Temperature),
            specific_humidity: value(TrackedVariable::Humidity),
            rain_rate: value(TrackedVariable::RainRate),
            snow_rate: value(TrackedVariable::SnowRate),
            wind_speed: value(TrackedVariable::WindSpeed),
            pressure_pa: value(TrackedVariable::Pressure),
        })
    }
}
