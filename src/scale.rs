//! Choropleth color scales.
//!
//! A scale maps a count onto a two-color ramp through a power curve. The
//! ramp is chosen by metric, the exponent by metric and map level.

use crate::aggregate::DateSlice;
use crate::resolve::resolve;
use crate::types::MetricFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ScaleError {
    #[error("invalid color {0:?}: expected #rrggbb")]
    InvalidColor(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Fill for regions with no metric to show.
pub const NEUTRAL_GRAY: Rgb = Rgb::new(0xee, 0xee, 0xee);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel sum; lower is darker.
    pub fn brightness(self) -> u16 {
        u16::from(self.r) + u16::from(self.g) + u16::from(self.b)
    }

    /// Linear interpolation in RGB space, `t` in `[0, 1]`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| {
            let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ScaleError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Two endpoint colors: `low` for the bottom of the domain, `high` for
/// the top. Every channel of `high` is at or below `low`'s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorRamp {
    pub low: Rgb,
    pub high: Rgb,
}

impl ColorRamp {
    pub const fn for_metric(metric: MetricFilter) -> Self {
        match metric {
            MetricFilter::Confirmed => Self {
                low: Rgb::new(0xfe, 0xe5, 0xd9),
                high: Rgb::new(0xa5, 0x0f, 0x15),
            },
            MetricFilter::Discharged => Self {
                low: Rgb::new(0xed, 0xf8, 0xe9),
                high: Rgb::new(0x00, 0x6d, 0x2c),
            },
            MetricFilter::Deceased => Self {
                low: Rgb::new(0xf0, 0xf0, 0xf0),
                high: Rgb::new(0x25, 0x25, 0x25),
            },
            MetricFilter::Suspected => Self {
                low: Rgb::new(0xfe, 0xed, 0xde),
                high: Rgb::new(0xa6, 0x36, 0x03),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleLevel {
    /// Provinces colored on the national map.
    #[default]
    Nation,
    /// Cities colored inside one province.
    Province,
}

impl ScaleLevel {
    /// Exponent of the power curve. Province counts are small, so their
    /// curves rise faster near zero.
    pub const fn default_exponent(self, metric: MetricFilter) -> f64 {
        match (self, metric) {
            (Self::Nation, MetricFilter::Confirmed) => 0.3,
            (Self::Nation, _) => 0.5,
            (Self::Province, MetricFilter::Confirmed) => 0.2,
            (Self::Province, _) => 0.35,
        }
    }
}

/// Tunables for [`build_scale_with`].
///
/// An exponent override is level-wide: when set, it replaces the default
/// exponent of every metric at that level, flattening the per-metric
/// difference (confirmed vs. the rest). Levels without an override keep
/// their per-metric defaults. Non-finite or non-positive overrides are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleOptions {
    /// Exponent for all metrics on the national map.
    pub nation_exponent: Option<f64>,
    /// Exponent for all metrics on province city maps.
    pub province_exponent: Option<f64>,
    /// Domain used when there are no observed values.
    pub fallback_domain: [f64; 2],
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            nation_exponent: None,
            province_exponent: None,
            fallback_domain: [0.0, 1.0],
        }
    }
}

impl ScaleOptions {
    fn exponent(&self, level: ScaleLevel, metric: MetricFilter) -> f64 {
        let configured = match level {
            ScaleLevel::Nation => self.nation_exponent,
            ScaleLevel::Province => self.province_exponent,
        };
        configured
            .filter(|e| e.is_finite() && *e > 0.0)
            .unwrap_or_else(|| level.default_exponent(metric))
    }
}

/// A value-to-color function over a fixed domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorScale {
    /// `None` when no metric is selected; every value is then gray.
    ramp: Option<ColorRamp>,
    domain: [f64; 2],
    exponent: f64,
}

impl ColorScale {
    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Position of `value` on the ramp, clamped to `[0, 1]`.
    pub fn position(&self, value: f64) -> f64 {
        let curve = |v: f64| v.max(0.0).powf(self.exponent);
        let [lo, hi] = self.domain;
        let span = curve(hi) - curve(lo);
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((curve(value) - curve(lo)) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Rgb {
        match self.ramp {
            Some(ramp) => ramp.low.lerp(ramp.high, self.position(value)),
            None => NEUTRAL_GRAY,
        }
    }
}

fn observed_domain(level: ScaleLevel, values: &[f64], fallback: [f64; 2]) -> [f64; 2] {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        return fallback;
    }
    let lo = match level {
        ScaleLevel::Nation => min,
        ScaleLevel::Province => 0.0_f64.min(min),
    };
    if max > lo {
        [lo, max]
    } else {
        [lo, lo + 1.0]
    }
}

/// Build a scale with default options.
pub fn build_scale(metric: Option<MetricFilter>, level: ScaleLevel, values: &[f64]) -> ColorScale {
    build_scale_with(&ScaleOptions::default(), metric, level, values)
}

/// Build a scale whose domain covers `values`.
///
/// Nation scales span the observed `[min, max]`; province scales are
/// anchored at zero. With no values the fallback domain is used.
pub fn build_scale_with(
    options: &ScaleOptions,
    metric: Option<MetricFilter>,
    level: ScaleLevel,
    values: &[f64],
) -> ColorScale {
    let domain = observed_domain(level, values, options.fallback_domain);
    match metric {
        Some(metric) => ColorScale {
            ramp: Some(ColorRamp::for_metric(metric)),
            domain,
            exponent: options.exponent(level, metric),
        },
        None => ColorScale {
            ramp: None,
            domain,
            exponent: 1.0,
        },
    }
}

/// Scale for one metric over every region in a slice.
pub fn scale_for_slice(
    options: &ScaleOptions,
    slice: &DateSlice,
    metric: MetricFilter,
    level: ScaleLevel,
) -> ColorScale {
    let values: Vec<f64> = slice.values().map(|o| o.metric(metric) as f64).collect();
    build_scale_with(options, Some(metric), level, &values)
}

/// Fill color for a map feature, matched to the slice by name.
pub fn fill_for_region(
    slice: &DateSlice,
    scale: &ColorScale,
    metric: MetricFilter,
    feature_name: &str,
) -> Rgb {
    let count = resolve(slice, Some(feature_name), metric).count().unwrap_or(0);
    scale.color(count as f64)
}
