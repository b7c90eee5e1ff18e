//! Defines the atmospheric variables tracked per forecast request and their
//! GLDAS provider codes.

use std::fmt;

/// One of the six atmospheric quantities forecast for every request.
///
/// Each variable maps to a fixed GLDAS (`GLDAS_NOAH025_3H_2_1`) parameter suffix
/// and a fixed position in [`TrackedVariable::ALL`]. The tag travels with every
/// intermediate value (raw response, series, forecast point) so results never
/// depend on array position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackedVariable {
    /// Near-surface air temperature, Kelvin.
    Temperature,
    /// Specific humidity, kg/kg.
    Humidity,
    /// Total precipitation rate, kg m-2 s-1.
    RainRate,
    /// Snow precipitation rate, kg m-2 s-1.
    SnowRate,
    /// Wind speed, m/s.
    WindSpeed,
    /// Surface pressure, Pa.
    Pressure,
}

impl TrackedVariable {
    /// All tracked variables in their fixed order.
    pub const ALL: [TrackedVariable; 6] = [
        TrackedVariable::Temperature,
        TrackedVariable::Humidity,
        TrackedVariable::RainRate,
        TrackedVariable::SnowRate,
        TrackedVariable::WindSpeed,
        TrackedVariable::Pressure,
    ];

    /// Provider-specific suffix appended to the dataset prefix.
    pub fn code_suffix(&self) -> &'static str {
        match self {
            TrackedVariable::Temperature => "_Tair_f_inst",
            TrackedVariable::Humidity => "_Qair_f_inst",
            TrackedVariable::RainRate => "_Rainf_tavg",
            TrackedVariable::SnowRate => "_Snowf_tavg",
            TrackedVariable::WindSpeed => "_Wind_f_inst",
            TrackedVariable::Pressure => "_Psurf_f_inst",
        }
    }

    /// Full provider code, e.g. `GLDAS_NOAH025_3H_2_1_Tair_f_inst`.
    pub fn provider_code(&self, dataset_prefix: &str) -> String {
        format!("{}{}", dataset_prefix, self.code_suffix())
    }

    /// Position of this variable in [`TrackedVariable::ALL`].
    pub fn index(&self) -> usize {
        match self {
            TrackedVariable::Temperature => 0,
            TrackedVariable::Humidity => 1,
            TrackedVariable::RainRate => 2,
            TrackedVariable::SnowRate => 3,
            TrackedVariable::WindSpeed => 4,
            TrackedVariable::Pressure => 5,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TrackedVariable::Temperature => "temperature",
            TrackedVariable::Humidity => "humidity",
            TrackedVariable::RainRate => "rain_rate",
            TrackedVariable::SnowRate => "snow_rate",
            TrackedVariable::WindSpeed => "wind_speed",
            TrackedVariable::Pressure => "pressure",
        }
    }
}

/// Formats a `TrackedVariable` using its short snake_case name.
///
/// # Examples
///
/// ```
/// use parade_forecast::TrackedVariable;
///
/// assert_eq!(TrackedVariable::RainRate.to_string(), "rain_rate");
/// ```
impl fmt::Display for TrackedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
