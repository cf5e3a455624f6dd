//! Classical seasonal decomposition of a daily metric series.
//!
//! observed = trend + seasonal + residual (additive), or
//! observed = trend * seasonal * residual (multiplicative).
//!
//! The trend is a centered moving average whose boundary values are linearly
//! extrapolated from the nearest estimated stretch, so all four components
//! span the full input length. A series too short for the requested period is
//! not an error: the period shrinks to half the series length and the result
//! is an approximation.

use log::warn;

use crate::util::{mean, sample_variance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionModel {
    Additive,
    Multiplicative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "Increasing"),
            TrendDirection::Decreasing => write!(f, "Decreasing"),
        }
    }
}

/// Four aligned component series of identical length, plus the period that
/// was actually used.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub resid: Vec<f64>,
    pub period: usize,
    pub model: DecompositionModel,
}

/// Decompose `series` under the given model and period.
///
/// NaNs are repaired by forward-fill then back-fill before the decomposition
/// runs, so no missing value reaches the moving average.
pub fn decompose(series: &[f64], model: DecompositionModel, period: usize) -> Decomposition {
    let n = series.len();
    let mut period = period.max(1);
    if n < 2 * period {
        let shrunk = (n / 2).max(1);
        warn!(
            "series has {} points, fewer than {} needed for period {}; shrinking period to {}",
            n,
            2 * period,
            period,
            shrunk
        );
        period = shrunk;
    }

    let observed = fill_missing(series);
    let mut trend = moving_average(&observed, period);
    extrapolate_trend(&mut trend, period);

    let detrended: Vec<f64> = observed
        .iter()
        .zip(&trend)
        .map(|(y, t)| match model {
            DecompositionModel::Additive => y - t,
            DecompositionModel::Multiplicative => y / t,
        })
        .collect();

    // Average the detrended values at each position in the cycle, then
    // center so the seasonal component carries no level of its own.
    let mut period_means: Vec<f64> = (0..period)
        .map(|offset| {
            let vals: Vec<f64> = detrended
                .iter()
                .skip(offset)
                .step_by(period)
                .copied()
                .filter(|v| v.is_finite())
                .collect();
            mean(&vals)
        })
        .collect();
    let level = mean(&period_means);
    for m in &mut period_means {
        match model {
            DecompositionModel::Additive => *m -= level,
            DecompositionModel::Multiplicative => *m /= level,
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|i| period_means[i % period]).collect();
    let resid: Vec<f64> = observed
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((y, t), s)| match model {
            DecompositionModel::Additive => y - t - s,
            DecompositionModel::Multiplicative => y / (t * s),
        })
        .collect();

    Decomposition {
        observed,
        trend,
        seasonal,
        resid,
        period,
        model,
    }
}

/// Share of non-trend variance explained by the seasonal component:
/// 1 - var(resid) / var(seasonal + resid). Near 1 means strong weekly
/// structure, near 0 means noise. A constant seasonal+resid makes the
/// denominator zero and the result non-finite; that is left unguarded and
/// must be treated as "undefined" by consumers.
pub fn seasonal_strength(d: &Decomposition) -> f64 {
    let resid: Vec<f64> = d.resid.iter().copied().filter(|v| v.is_finite()).collect();
    let combined: Vec<f64> = d
        .seasonal
        .iter()
        .zip(&d.resid)
        .map(|(s, r)| s + r)
        .filter(|v| v.is_finite())
        .collect();
    1.0 - sample_variance(&resid) / sample_variance(&combined)
}

/// Compare the first and last estimated trend values. Only a strict increase
/// counts as increasing; a tie reads as decreasing.
pub fn trend_direction(d: &Decomposition) -> TrendDirection {
    let mut finite = d.trend.iter().copied().filter(|v| v.is_finite());
    let first = finite.next();
    let last = finite.last().or(first);
    match (first, last) {
        (Some(a), Some(b)) if b > a => TrendDirection::Increasing,
        _ => TrendDirection::Decreasing,
    }
}

/// Forward-fill, then back-fill whatever leads the first valid value.
fn fill_missing(series: &[f64]) -> Vec<f64> {
    let mut out = series.to_vec();
    let mut last_valid: Option<f64> = None;
    for v in &mut out {
        if v.is_nan() {
            if let Some(fill) = last_valid {
                *v = fill;
            }
        } else {
            last_valid = Some(*v);
        }
    }
    if let Some(first_valid) = out.iter().copied().find(|v| !v.is_nan()) {
        for v in &mut out {
            if v.is_nan() {
                *v = first_valid;
            } else {
                break;
            }
        }
    }
    out
}

/// Centered moving average of the given window. Even windows use the
/// conventional weighted window of `period + 1` points with half weight at
/// the ends. Positions whose window runs off the series are NaN until
/// extrapolation fills them.
fn moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![f64::NAN; n];

    for i in 0..n {
        if i < half || i + half >= n {
            continue;
        }
        if period % 2 == 1 {
            let window = &values[i - half..=i + half];
            trend[i] = window.iter().sum::<f64>() / period as f64;
        } else {
            let window = &values[i - half..=i + half];
            let mut sum = (window[0] + window[period]) * 0.5;
            sum += window[1..period].iter().sum::<f64>();
            trend[i] = sum / period as f64;
        }
    }
    trend
}

/// Replace the NaN edges of the trend with a straight line fitted to the
/// nearest `period` estimated points, mirroring the "extrapolate from the
/// frequency" behavior of classical decomposition tooling.
fn extrapolate_trend(trend: &mut [f64], period: usize) {
    let n = trend.len();
    let Some(front) = trend.iter().position(|v| v.is_finite()) else {
        return;
    };
    let back = trend.iter().rposition(|v| v.is_finite()).unwrap_or(front);

    if front > 0 {
        let count = period.min(back - front + 1);
        let (slope, intercept) = line_fit(front, &trend[front..front + count]);
        for (i, v) in trend.iter_mut().enumerate().take(front) {
            *v = slope * i as f64 + intercept;
        }
    }
    if back + 1 < n {
        let count = period.min(back - front + 1);
        let start = back + 1 - count;
        let (slope, intercept) = line_fit(start, &trend[start..=back]);
        for (i, v) in trend.iter_mut().enumerate().skip(back + 1) {
            *v = slope * i as f64 + intercept;
        }
    }
}

/// Least-squares line through `(x0 + k, values[k])`; a single point yields a
/// flat line.
fn line_fit(x0: usize, values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.len() < 2 {
        return (0.0, values.first().copied().unwrap_or(f64::NAN));
    }
    let xs: Vec<f64> = (0..values.len()).map(|k| (x0 + k) as f64).collect();
    let x_mean = mean(&xs);
    let y_mean = mean(values);
    let mut num = 0.0;
    let mut den = 0.0;
    for (x, y) in xs.iter().zip(values) {
        num += (x - x_mean) * (y - y_mean);
        den += (x - x_mean) * (x - x_mean);
    }
    let slope = if den == 0.0 { 0.0 } else { num / den };
    (slope, y_mean - slope * x_mean)
}
