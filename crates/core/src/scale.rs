use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{ChartError, Result};

/// Upper bound on requested tick counts; larger requests are clamped.
pub const MAX_TICK_COUNT: usize = 100;

/// A band scale divides a continuous range into uniform bands, one per domain value.
///
/// Commonly used for bar charts with categorical dimensions. Duplicate domain
/// values keep their first position.
#[derive(Debug, Clone)]
pub struct BandScale<D: Debug + Clone + Hash + Eq> {
    domain: Vec<D>,
    index: HashMap<D, usize>,
    range: (f32, f32),
    padding_inner: f32,
    padding_outer: f32,
    align: f32,
    round: bool,
}

impl<D: Debug + Clone + Hash + Eq> BandScale<D> {
    /// Creates a new band scale with the given domain.
    ///
    /// # Defaults
    /// - range: (0.0, 1.0)
    /// - padding_inner: 0.0
    /// - padding_outer: 0.0
    /// - align: 0.5
    /// - round: false
    pub fn try_new(domain: Vec<D>) -> Result<Self> {
        let mut index = HashMap::with_capacity(domain.len());
        let mut unique = Vec::with_capacity(domain.len());
        for value in domain {
            if !index.contains_key(&value) {
                index.insert(value.clone(), unique.len());
                unique.push(value);
            }
        }
        if unique.is_empty() {
            return Err(ChartError::EmptyDomain);
        }
        Ok(Self {
            domain: unique,
            index,
            range: (0.0, 1.0),
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
            round: false,
        })
    }

    /// Sets the output range. The range may be reversed for inverted scales.
    pub fn range(mut self, range: (f32, f32)) -> Self {
        self.range = range;
        self
    }

    /// Ratio of each step reserved for blank space between bands, clamped to `[0, 1]`.
    pub fn padding_inner(mut self, padding: f32) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self
    }

    /// Steps of blank space before the first and after the last band.
    pub fn padding_outer(mut self, padding: f32) -> Self {
        self.padding_outer = padding.max(0.0);
        self
    }

    pub fn padding(self, padding: f32) -> Self {
        self.padding_inner(padding).padding_outer(padding)
    }

    /// How leftover space is distributed: 0.0 packs bands at the start, 1.0 at the end.
    pub fn align(mut self, align: f32) -> Self {
        self.align = align.clamp(0.0, 1.0);
        self
    }

    pub fn round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    pub fn domain(&self) -> &[D] {
        &self.domain
    }

    fn extent(&self) -> (f32, f32, bool) {
        let reverse = self.range.1 < self.range.0;
        if reverse {
            (self.range.1, self.range.0, true)
        } else {
            (self.range.0, self.range.1, false)
        }
    }

    /// Distance between the starts of adjacent bands.
    pub fn step(&self) -> f32 {
        let (start, stop, _) = self.extent();
        let n = self.domain.len();
        let step = (stop - start) / bandspace(n, self.padding_inner, self.padding_outer).max(1.0);
        if self.round {
            step.floor()
        } else {
            step
        }
    }

    pub fn bandwidth(&self) -> f32 {
        let bandwidth = self.step() * (1.0 - self.padding_inner);
        if self.round {
            bandwidth.round()
        } else {
            bandwidth
        }
    }

    /// Start of the band for `value`, or `None` when it is not in the domain.
    pub fn scale(&self, value: &D) -> Option<f32> {
        let i = *self.index.get(value)?;
        let (start, stop, reverse) = self.extent();
        let n = self.domain.len();
        let step = self.step();
        let first = start + (stop - start - step * (n as f32 - self.padding_inner)) * self.align;
        let first = if self.round { first.round() } else { first };
        let slot = if reverse { n - 1 - i } else { i };
        Some(first + step * slot as f32)
    }

    /// Middle of the band for `value`.
    pub fn center(&self, value: &D) -> Option<f32> {
        self.scale(value).map(|x| x + self.bandwidth() / 2.0)
    }
}

fn bandspace(n: usize, padding_inner: f32, padding_outer: f32) -> f32 {
    n as f32 - padding_inner + padding_outer * 2.0
}

/// Linear scale that maps a continuous numeric domain to a continuous numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f32, f32),
    range: (f32, f32),
    clamp: bool,
}

impl LinearScale {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    /// When true, values outside the domain map to the nearest end of the range.
    pub fn clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn domain(&self) -> (f32, f32) {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn scale(&self, value: f32) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        let mut t = (value - d0) / (d1 - d0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + t * (r1 - r0)
    }

    pub fn invert(&self, pixel: f32) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return (d0 + d1) / 2.0;
        }
        let mut t = (pixel - r0) / (r1 - r0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        d0 + t * (d1 - d0)
    }

    /// Approximately `count` human-friendly tick values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f32> {
        ticks(self.domain.0, self.domain.1, count.min(MAX_TICK_COUNT) as f32)
    }
}

/// Generates approximately `count` ticks within `[start, stop]`, spaced at 1, 2 or 5 times a power of ten.
pub fn ticks(start: f32, stop: f32, count: f32) -> Vec<f32> {
    if count <= 0.0 || count.is_nan() || !start.is_finite() || !stop.is_finite() {
        return vec![];
    }
    let count = count.min(MAX_TICK_COUNT as f32);
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_spec(stop, start, count)
    } else {
        tick_spec(start, stop, count)
    };
    if i2 < i1 {
        return vec![];
    }

    let n = (i2 - i1 + 1.0) as usize;
    let value = |i: f32| if inc < 0.0 { i / -inc } else { i * inc };
    let mut out: Vec<f32> = (0..n).map(|k| value(i1 + k as f32)).collect();
    if reverse {
        out.reverse();
    }
    out
}

fn step_factor(error: f32) -> f32 {
    if error >= 50f32.sqrt() {
        10.0
    } else if error >= 10f32.sqrt() {
        5.0
    } else if error >= 2f32.sqrt() {
        2.0
    } else {
        1.0
    }
}

fn tick_spec(start: f32, stop: f32, count: f32) -> (f32, f32, f32) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f32.powf(power);
    let factor = step_factor(error);

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        inc = 10f32.powf(-power) / factor;
        i1 = (start * inc).round();
        i2 = (stop * inc).round();
        if i1 / inc < start {
            i1 += 1.0;
        }
        if i2 / inc > stop {
            i2 -= 1.0;
        }
        return if i2 < i1 && (0.5..2.0).contains(&count) {
            tick_spec(start, stop, count * 2.0)
        } else {
            (i1, i2, -inc)
        };
    }

    inc = 10f32.powf(power) * factor;
    i1 = (start / inc).round();
    i2 = (stop / inc).round();
    if i1 * inc < start {
        i1 += 1.0;
    }
    if i2 * inc > stop {
        i2 -= 1.0;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn band_positions_are_evenly_stepped() {
        let scale = BandScale::try_new(vec!["a", "b", "c"])
            .unwrap()
            .range((0.0, 120.0));
        assert_eq!(scale.step(), 40.0);
        assert_eq!(scale.bandwidth(), 40.0);
        assert_eq!(scale.scale(&"a"), Some(0.0));
        assert_eq!(scale.scale(&"b"), Some(40.0));
        assert_eq!(scale.scale(&"c"), Some(80.0));
        assert_eq!(scale.scale(&"z"), None);
    }

    #[test]
    fn band_padding_matches_reference_values() {
        let scale = BandScale::try_new(vec![0usize, 1, 2, 3])
            .unwrap()
            .range((0.0, 100.0))
            .padding(0.2);
        // step = 100 / (4 - 0.2 + 0.4)
        assert!(approx_eq!(f32, scale.step(), 100.0 / 4.2, epsilon = 1e-4));
        assert!(approx_eq!(f32, scale.bandwidth(), scale.step() * 0.8, epsilon = 1e-4));
        let first = scale.scale(&0).unwrap();
        assert!(approx_eq!(f32, first, 0.2 * scale.step(), epsilon = 1e-3));
        let gap = scale.scale(&1).unwrap() - first;
        assert!(approx_eq!(f32, gap, scale.step(), epsilon = 1e-4));
    }

    #[test]
    fn reversed_band_range_flips_order() {
        let scale = BandScale::try_new(vec!["a", "b"]).unwrap().range((100.0, 0.0));
        assert_eq!(scale.scale(&"a"), Some(50.0));
        assert_eq!(scale.scale(&"b"), Some(0.0));
    }

    #[test]
    fn band_rejects_empty_domain_and_dedupes() {
        assert!(matches!(
            BandScale::<String>::try_new(vec![]),
            Err(ChartError::EmptyDomain)
        ));
        let scale = BandScale::try_new(vec!["a", "a", "b"]).unwrap();
        assert_eq!(scale.domain(), &["a", "b"]);
    }

    #[test]
    fn linear_scales_and_inverts() {
        let scale = LinearScale::new((0.0, 50.0), (200.0, 0.0));
        assert_eq!(scale.scale(0.0), 200.0);
        assert_eq!(scale.scale(50.0), 0.0);
        assert_eq!(scale.scale(25.0), 100.0);
        assert_eq!(scale.invert(100.0), 25.0);
        assert_eq!(scale.scale(-10.0), 240.0);
        assert_eq!(scale.clamp(true).scale(-10.0), 200.0);
    }

    #[test]
    fn degenerate_linear_domain_maps_to_midpoint() {
        let scale = LinearScale::new((3.0, 3.0), (0.0, 10.0));
        assert_eq!(scale.scale(3.0), 5.0);
    }

    #[test]
    fn huge_tick_counts_are_clamped() {
        let scale = LinearScale::new((0.0, 1.2), (0.0, 100.0));
        let many = scale.ticks(10_000_000);
        assert!(many.len() <= 2 * MAX_TICK_COUNT + 1, "{}", many.len());
        assert_eq!(many, scale.ticks(MAX_TICK_COUNT));
        assert!(ticks(0.0, 1.0, 1e12).len() <= 2 * MAX_TICK_COUNT + 1);
    }

    #[test]
    fn ticks_use_nice_steps() {
        assert_eq!(ticks(0.0, 10.0, 5.0), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks(0.0, 36.0, 5.0), vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(ticks(10.0, 0.0, 5.0), vec![10.0, 8.0, 6.0, 4.0, 2.0, 0.0]);
        let small = ticks(0.0, 1.0, 4.0);
        assert_eq!(small.len(), 6);
        assert!(approx_eq!(f32, small[1], 0.2, epsilon = 1e-6));
        assert!(ticks(0.0, 1.0, 0.0).is_empty());
        assert_eq!(ticks(2.0, 2.0, 5.0), vec![2.0]);
    }
}
