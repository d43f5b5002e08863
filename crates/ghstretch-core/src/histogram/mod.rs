//! Histogram analysis.
//!
//! Builds fixed-resolution per-channel histograms (including the derived
//! Lightness/Saturation/Luminance channels) with cumulative counts, and
//! answers the interpolated clip-level and normalized-count queries that
//! drive auto-stretch parameters.


use std::collections::HashMap;

use crate::buffer::SampleBuffer;
use crate::color::{rgb_to_hsl, rgb_to_hsv, weighted_luminance};
use crate::config::HISTOGRAM_RESOLUTION;
use crate::transform::StfCurve;

/// A channel of interest for histogram queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistogramChannel {
    /// A real buffer channel (0 = R or K, 1 = G, 2 = B)
    Direct(u8),
    /// HSL lightness
    Lightness,
    /// HSV saturation
    Saturation,
    /// Coefficient-weighted luminance
    Luminance,
}

/// How per-channel query results are folded into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipAggregator {
    Min,
    Max,
}

/// First/last populated level of a histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramEnds {
    pub low: f64,
    pub high: f64,
    pub non_empty_bins: usize,
}

/// Fixed-resolution histogram of one channel with cumulative counts.
#[derive(Debug, Clone)]
pub struct ChannelHistogram {
    bins: Vec<u32>,
    cumulative: Vec<u64>,
    total: u64,
}

impl ChannelHistogram {
    /// Build from an iterator of normalized values. Values are clamped
    /// into [0, 1] before binning.
    pub fn from_values<I: IntoIterator<Item = f32>>(values: I) -> Self {
        let mut bins = vec![0u32; HISTOGRAM_RESOLUTION];
        let scale = (HISTOGRAM_RESOLUTION - 1) as f32;
        let mut total = 0u64;
        for value in values {
            let bucket =
                ((value.clamp(0.0, 1.0) * scale) as usize).min(HISTOGRAM_RESOLUTION - 1);
            bins[bucket] += 1;
            total += 1;
        }
        let mut cumulative = Vec::with_capacity(bins.len());
        let mut acc = 0u64;
        for &count in &bins {
            acc += u64::from(count);
            cumulative.push(acc);
        }
        Self {
            bins,
            cumulative,
            total,
        }
    }

    pub fn bins(&self) -> &[u32] {
        &self.bins
    }

    /// Inclusive cumulative counts, `cumulative[k]` = samples in bins 0..=k.
    pub fn cumulative(&self) -> &[u64] {
        &self.cumulative
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Cumulative fraction of samples at or below `level`, linearly
    /// interpolated within the containing bin.
    pub fn normalized_count(&self, level: f64) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let level = level.clamp(0.0, 1.0);
        let pos = level * self.bins.len() as f64;
        let k = (pos as usize).min(self.bins.len() - 1);
        let frac = pos - k as f64;
        let below = if k > 0 { self.cumulative[k - 1] } else { 0 };
        let count = below as f64 + f64::from(self.bins[k]) * frac;
        count / self.total as f64
    }

    /// Smallest normalized level whose cumulative count from the low end
    /// reaches `count`, interpolated within the containing bin.
    pub fn clip_level_from_low_count(&self, count: f64) -> f64 {
        if count <= 0.0 {
            return 0.0;
        }
        let mut acc = 0.0f64;
        for (k, &bin) in self.bins.iter().enumerate() {
            let bin = f64::from(bin);
            if acc + bin >= count {
                let frac = if bin > 0.0 { (count - acc) / bin } else { 0.0 };
                return (k as f64 + frac) / self.bins.len() as f64;
            }
            acc += bin;
        }
        1.0
    }

    /// Largest normalized level whose cumulative count from the high end
    /// reaches `count`, interpolated within the containing bin.
    pub fn clip_level_from_high_count(&self, count: f64) -> f64 {
        if count <= 0.0 {
            return 1.0;
        }
        let mut acc = 0.0f64;
        for (k, &bin) in self.bins.iter().enumerate().rev() {
            let bin = f64::from(bin);
            if acc + bin >= count {
                let frac = if bin > 0.0 { (count - acc) / bin } else { 0.0 };
                return (k as f64 + 1.0 - frac) / self.bins.len() as f64;
            }
            acc += bin;
        }
        0.0
    }

    /// Interpolated median level.
    pub fn median(&self) -> f64 {
        self.clip_level_from_low_count(self.total as f64 / 2.0)
    }

    /// First and last populated levels.
    pub fn ends(&self) -> HistogramEnds {
        let n = self.bins.len();
        let low = self
            .bins
            .iter()
            .position(|&c| c > 0)
            .map_or(0.0, |k| k as f64 / (n - 1) as f64);
        let high = self
            .bins
            .iter()
            .rposition(|&c| c > 0)
            .map_or(1.0, |k| k as f64 / (n - 1) as f64);
        let non_empty_bins = self.bins.iter().filter(|&&c| c > 0).count();
        HistogramEnds {
            low,
            high,
            non_empty_bins,
        }
    }
}

/// Per-channel histogram queries over one sample buffer, with histograms
/// built lazily and cached per channel.
pub struct HistogramAnalyzer<'a> {
    buffer: &'a SampleBuffer,
    lum_coefficients: [f64; 3],
    cache: HashMap<HistogramChannel, ChannelHistogram>,
}

impl<'a> HistogramAnalyzer<'a> {
    pub fn new(buffer: &'a SampleBuffer, lum_coefficients: [f64; 3]) -> Self {
        Self {
            buffer,
            lum_coefficients,
            cache: HashMap::new(),
        }
    }

    /// Values of one (possibly derived) channel.
    fn channel_values(&self, channel: HistogramChannel) -> Result<Vec<f32>, String> {
        let buf = self.buffer;
        match channel {
            HistogramChannel::Direct(c) => {
                if c >= buf.channels() {
                    return Err(format!(
                        "Histogram channel {} not available, image has {}",
                        c,
                        buf.channels()
                    ));
                }
                Ok(buf
                    .data()
                    .iter()
                    .skip(c as usize)
                    .step_by(buf.channels() as usize)
                    .copied()
                    .collect())
            }
            _ => {
                if buf.channels() != 3 {
                    return Err(format!(
                        "Derived histogram channel {:?} requires an RGB image",
                        channel
                    ));
                }
                Ok(buf
                    .data()
                    .chunks_exact(3)
                    .map(|p| match channel {
                        HistogramChannel::Lightness => rgb_to_hsl(p[0], p[1], p[2]).l,
                        HistogramChannel::Saturation => rgb_to_hsv(p[0], p[1], p[2]).s,
                        _ => weighted_luminance(p[0], p[1], p[2], &self.lum_coefficients) as f32,
                    })
                    .collect())
            }
        }
    }

    /// Histogram (bins + cumulative) for one channel.
    pub fn histogram_for(
        &mut self,
        channel: HistogramChannel,
    ) -> Result<&ChannelHistogram, String> {
        if !self.cache.contains_key(&channel) {
            let hist = ChannelHistogram::from_values(self.channel_values(channel)?);
            self.cache.insert(channel, hist);
        }
        Ok(&self.cache[&channel])
    }

    /// Interpolated cumulative fraction at `level`, aggregated across a
    /// channel set.
    pub fn normalized_count(
        &mut self,
        level: f64,
        channels: &[HistogramChannel],
        aggregator: ClipAggregator,
    ) -> Result<f64, String> {
        self.aggregate(channels, aggregator, |h| h.normalized_count(level))
    }

    /// Inverse lookup from the low end, aggregated by minimum.
    pub fn clip_level_from_low_count(
        &mut self,
        count: f64,
        channels: &[HistogramChannel],
    ) -> Result<f64, String> {
        self.aggregate(channels, ClipAggregator::Min, |h| {
            h.clip_level_from_low_count(count)
        })
    }

    /// Inverse lookup from the high end, aggregated by maximum.
    pub fn clip_level_from_high_count(
        &mut self,
        count: f64,
        channels: &[HistogramChannel],
    ) -> Result<f64, String> {
        self.aggregate(channels, ClipAggregator::Max, |h| {
            h.clip_level_from_high_count(count)
        })
    }

    fn aggregate<F: Fn(&ChannelHistogram) -> f64>(
        &mut self,
        channels: &[HistogramChannel],
        aggregator: ClipAggregator,
        query: F,
    ) -> Result<f64, String> {
        if channels.is_empty() {
            return Err("Histogram query over an empty channel set".to_string());
        }
        let mut out: Option<f64> = None;
        for &ch in channels {
            let v = query(self.histogram_for(ch)?);
            out = Some(match (out, aggregator) {
                (None, _) => v,
                (Some(acc), ClipAggregator::Min) => acc.min(v),
                (Some(acc), ClipAggregator::Max) => acc.max(v),
            });
        }
        Ok(out.unwrap_or(0.0))
    }

    /// Median and median absolute deviation of one channel, both via
    /// interpolated histogram lookups.
    pub fn median_and_mad(&mut self, channel: HistogramChannel) -> Result<(f64, f64), String> {
        let median = self.histogram_for(channel)?.median();
        let values = self.channel_values(channel)?;
        let deviations =
            ChannelHistogram::from_values(values.iter().map(|&v| (f64::from(v) - median).abs() as f32));
        Ok((median, deviations.median()))
    }

    /// Derive STF auto-stretch curves from target statistics: one curve
    /// per color channel, or a single channel-averaged curve in linked
    /// mode.
    pub fn derive_stf_curves(&mut self, linked: bool) -> Result<Vec<StfCurve>, String> {
        let channels = self.buffer.channels();
        let mut stats = Vec::with_capacity(channels as usize);
        for c in 0..channels {
            stats.push(self.median_and_mad(HistogramChannel::Direct(c))?);
        }
        if linked || channels == 1 {
            Ok(vec![StfCurve::linked(&stats)])
        } else {
            Ok(stats
                .iter()
                .map(|&(median, mad)| StfCurve::from_stats(median, mad))
                .collect())
        }
    }
}
