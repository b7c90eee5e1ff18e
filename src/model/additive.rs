//! Additive trend + seasonality model: `y(t) = g(t) + s(t)`.
//!
//! `g` is a piecewise-linear trend with hinge terms at evenly spaced changepoints
//! over the first part of the history. `s` is a sum of Fourier series for the
//! yearly, weekly and daily cycles, each enabled only when the history is long
//! and dense enough to identify it. Coefficients are fitted by ridge-regularised
//! least squares on scaled data, which keeps the fit deterministic.

use crate::model::error::InsufficientDataError;
use crate::model::linalg::NormalEquations;
use bon::Builder;
use chrono::{DateTime, Utc};
use log::debug;
use std::f64::consts::PI;

const SECONDS_PER_DAY: f64 = 86_400.0;
/// Keeps otherwise unconstrained coefficients (e.g. a constant column) solvable.
const JITTER: f64 = 1e-9;

/// Tuning of the additive model.
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct ModelConfig {
    /// Maximum number of trend changepoints.
    #[builder(default = 25)]
    pub n_changepoints: usize,
    /// Share of the history, from its start, in which changepoints are placed.
    #[builder(default = 0.8)]
    pub changepoint_range: f64,
    /// Ridge penalty per observation on changepoint slope adjustments.
    #[builder(default = 0.01)]
    pub changepoint_penalty: f64,
    /// Ridge penalty per observation on Fourier coefficients.
    #[builder(default = 1e-4)]
    pub seasonality_penalty: f64,
    #[builder(default = 10)]
    pub yearly_order: usize,
    #[builder(default = 3)]
    pub weekly_order: usize,
    #[builder(default = 4)]
    pub daily_order: usize,
    /// Reproducibility seed. The least-squares fit is deterministic, so this is only
    /// recorded alongside each fit.
    #[builder(default = 0)]
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Seasonality {
    period_days: f64,
    order: usize,
}

impl Seasonality {
    const YEARLY_DAYS: f64 = 365.25;
    const WEEKLY_DAYS: f64 = 7.0;
    const DAILY_DAYS: f64 = 1.0;
}

/// One row of model output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub timestamp: DateTime<Utc>,
    pub yhat: f64,
    pub trend: f64,
    pub seasonal: f64,
}

/// A fitted additive model.
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    start_seconds: f64,
    span_seconds: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    coefficients: Vec<f64>,
}

impl AdditiveModel {
    /// Fits the model to `(timestamp, value)` observations in any order.
    pub fn fit(
        observations: &[(DateTime<Utc>, f64)],
        config: &ModelConfig,
    ) -> Result<Self, InsufficientDataError> {
        if observations.len() < 2 {
            return Err(InsufficientDataError::TooFewPoints {
                found: observations.len(),
            });
        }

        let mut seconds: Vec<(f64, f64)> = observations
            .iter()
            .map(|(ts, y)| (ts.timestamp() as f64, *y))
            .collect();
        seconds.sort_by(|a, b| a.0.total_cmp(&b.0));

        let start_seconds = seconds[0].0;
        let end_seconds = seconds[seconds.len() - 1].0;
        let span_seconds = if end_seconds > start_seconds {
            end_seconds - start_seconds
        } else {
            1.0
        };
        let y_scale = seconds
            .iter()
            .map(|(_, y)| y.abs())
            .fold(0.0_f64, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let mut model = Self {
            start_seconds,
            span_seconds,
            y_scale,
            changepoints: Vec::new(),
            seasonalities: Vec::new(),
            coefficients: Vec::new(),
        };
        model.changepoints = model.place_changepoints(&seconds, config);
        model.seasonalities = Self::detect_seasonalities(&seconds, config);

        let size = model.feature_count();
        let trend_size = 2 + model.changepoints.len();
        let mut equations = NormalEquations::new(size);
        let mut features = vec![0.0; size];
        for (t, y) in &seconds {
            model.fill_features(*t, &mut features);
            equations.add_row(&features, y / y_scale);
        }

        let n = seconds.len() as f64;
        for index in 0..size {
            let penalty = if index < 2 {
                JITTER
            } else if index < trend_size {
                config.changepoint_penalty * n
            } else {
                config.seasonality_penalty * n
            };
            equations.add_penalty(index, penalty.max(JITTER));
        }

        model.coefficients = equations
            .solve()
            .ok_or(InsufficientDataError::SingularSystem)?;
        debug!(
            "Fitted additive model on {} points: {} changepoints, {} seasonalities, seed {}",
            seconds.len(),
            model.changepoints.len(),
            model.seasonalities.len(),
            config.seed
        );
        Ok(model)
    }

    /// Predicts at each requested timestamp, one output row per input.
    pub fn predict(&self, timestamps: &[DateTime<Utc>]) -> Vec<Prediction> {
        let mut features = vec![0.0; self.feature_count()];
        let trend_size = 2 + self.changepoints.len();
        timestamps
            .iter()
            .map(|timestamp| {
                self.fill_features(timestamp.timestamp() as f64, &mut features);
                let (trend, seasonal) = features.iter().zip(&self.coefficients).enumerate().fold(
                    (0.0, 0.0),
                    |(trend, seasonal), (index, (x, beta))| {
                        if index < trend_size {
                            (trend + x * beta, seasonal)
                        } else {
                            (trend, seasonal + x * beta)
                        }
                    },
                );
                Prediction {
                    timestamp: *timestamp,
                    yhat: (trend + seasonal) * self.y_scale,
                    trend: trend * self.y_scale,
                    seasonal: seasonal * self.y_scale,
                }
            })
            .collect()
    }

    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }

    /// Periods, in days, of the seasonal components included in the fit.
    pub fn seasonal_periods(&self) -> Vec<f64> {
        self.seasonalities.iter().map(|s| s.period_days).collect()
    }

    fn feature_count(&self) -> usize {
        2 + self.changepoints.len() + self.seasonalities.iter().map(|s| 2 * s.order).sum::<usize>()
    }

    fn scaled_time(&self, seconds: f64) -> f64 {
        (seconds - self.start_seconds) / self.span_seconds
    }

    fn place_changepoints(&self, sorted: &[(f64, f64)], config: &ModelConfig) -> Vec<f64> {
        let range = config.changepoint_range.clamp(0.0, 1.0);
        let history = ((sorted.len() as f64) * range).floor() as usize;
        let count = config.n_changepoints.min(history.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }
        let mut changepoints: Vec<f64> = (1..=count)
            .map(|i| {
                let index = (i as f64 * (history - 1) as f64 / count as f64).round() as usize;
                self.scaled_time(sorted[index].0)
            })
            .filter(|t| *t > 0.0)
            .collect();
        changepoints.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON);
        changepoints
    }

    fn detect_seasonalities(sorted: &[(f64, f64)], config: &ModelConfig) -> Vec<Seasonality> {
        let span_days = (sorted[sorted.len() - 1].0 - sorted[0].0) / SECONDS_PER_DAY;
        let min_spacing_days = sorted
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) / SECONDS_PER_DAY)
            .filter(|d| *d > 0.0)
            .fold(f64::INFINITY, f64::min);

        let candidates = [
            (Seasonality::YEARLY_DAYS, config.yearly_order, f64::INFINITY),
            (Seasonality::WEEKLY_DAYS, config.weekly_order, Seasonality::WEEKLY_DAYS),
            (Seasonality::DAILY_DAYS, config.daily_order, Seasonality::DAILY_DAYS),
        ];
        candidates
            .iter()
            .filter(|(period, order, max_spacing)| {
                *order > 0 && span_days >= 2.0 * period && min_spacing_days < *max_spacing
            })
            .map(|(period_days, order, _)| Seasonality {
                period_days: *period_days,
                order: *order,
            })
            .collect()
    }

    fn fill_features(&self, seconds: f64, features: &mut [f64]) {
        let t = self.scaled_time(seconds);
        features[0] = 1.0;
        features[1] = t;
        let mut index = 2;
        for changepoint in &self.changepoints {
            features[index] = (t - changepoint).max(0.0);
            index += 1;
        }
        let days = seconds / SECONDS_PER_DAY;
        for seasonality in &self.seasonalities {
            for k in 1..=seasonality.order {
                let angle = 2.0 * PI * k as f64 * days / seasonality.period_days;
                features[index] = angle.sin();
                features[index + 1] = angle.cos();
                index += 2;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn three_hourly(days: i64, f: impl Fn(f64) -> f64) -> Vec<(DateTime<Utc>, f64)> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..days * 8)
            .map(|i| {
                let ts = start + Duration::hours(3 * i);
                let day = i as f64 / 8.0;
                (ts, f(day))
            })
            .collect()
    }

    #[test]
    fn test_two_points_fit_a_line() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = t0 + Duration::hours(3);
        let model =
            AdditiveModel::fit(&[(t0, 300.0), (t1, 301.0)], &ModelConfig::default()).unwrap();
        assert_eq!(model.changepoint_count(), 0);
        assert!(model.seasonal_periods().is_empty());

        let t2 = t1 + Duration::hours(3);
        let prediction = model.predict(&[t2])[0];
        assert_eq!(prediction.timestamp, t2);
        assert!((prediction.yhat - 302.0).abs() < 0.01, "{}", prediction.yhat);
    }

    #[test]
    fn test_too_few_points() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = AdditiveModel::fit(&[(t0, 1.0)], &ModelConfig::default()).unwrap_err();
        assert_eq!(err, InsufficientDataError::TooFewPoints { found: 1 });
    }

    #[test]
    fn test_linear_trend_is_extrapolated() {
        let data = three_hourly(20, |day| 280.0 + 0.5 * day);
        let config = ModelConfig::builder().n_changepoints(0).build();
        let model = AdditiveModel::fit(&data, &config).unwrap();

        let target = data[data.len() - 1].0 + Duration::days(2) + Duration::hours(3);
        let expected = 280.0 + 0.5 * (20.0 + 2.0);
        let prediction = model.predict(&[target])[0];
        assert!((prediction.yhat - expected).abs() < 0.2, "{}", prediction.yhat);
    }

    #[test]
    fn test_daily_cycle_is_captured() {
        let data = three_hourly(30, |day| 290.0 + 5.0 * (2.0 * PI * day).sin());
        let model = AdditiveModel::fit(&data, &ModelConfig::default()).unwrap();
        assert!(model.seasonal_periods().contains(&1.0));
        assert!(model.seasonal_periods().contains(&7.0));
        assert!(!model.seasonal_periods().contains(&365.25));

        // 06:00 is the daily peak of sin(2π·day).
        let peak = Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap();
        let trough = Utc.with_ymd_and_hms(2024, 2, 1, 18, 0, 0).unwrap();
        let predictions = model.predict(&[peak, trough]);
        assert!((predictions[0].yhat - 295.0).abs() < 0.5, "{}", predictions[0].yhat);
        assert!((predictions[1].yhat - 285.0).abs() < 0.5, "{}", predictions[1].yhat);
        assert!(
            (predictions[0].trend + predictions[0].seasonal - predictions[0].yhat).abs() < 1e-9
        );
    }

    #[test]
    fn test_fit_is_deterministic() {
        let data = three_hourly(10, |day| 0.01 + 0.001 * (day * 1.3).cos());
        let config = ModelConfig::default();
        let target = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let a = AdditiveModel::fit(&data, &config).unwrap().predict(&[target]);
        let b = AdditiveModel::fit(&data, &config).unwrap().predict(&[target]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_zero_series() {
        let data = three_hourly(5, |_| 0.0);
        let model = AdditiveModel::fit(&data, &ModelConfig::default()).unwrap();
        let target = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert!(model.predict(&[target])[0].yhat.abs() < 1e-9);
    }
}
