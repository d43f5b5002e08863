//! Channel compositing.
//!
//! Decides which channel(s) of a sample buffer the point transform is
//! applied to and how: independent channels, HSL lightness, HSV
//! saturation, or coefficient-weighted luminance with an overflow
//! policy. Also combines two buffers for the Image Blend kind, including
//! the closed-form masked inverse.

#[cfg(test)]
mod tests;

use rayon::prelude::*;

use crate::buffer::SampleBuffer;
use crate::color::{hsl_to_rgb, hsv_to_rgb, rgb_to_hsl, rgb_to_hsv, weighted_luminance};
use crate::config::PARALLEL_THRESHOLD;
use crate::mask::MaskView;
use crate::models::{ChannelMode, OverflowPolicy, StretchParameters};
use crate::transform::TransformEngine;

const CHUNK_SIZE: usize = 256 * 3;

/// Apply the engine's point transform to the channels selected by the
/// active channel mode, in place.
pub fn apply_point_transform(
    working: &mut SampleBuffer,
    engine: &TransformEngine,
) -> Result<(), String> {
    let channels = working.channels();
    let mode = engine.params().channel_mode;

    if mode.is_derived() && channels != 3 {
        return Err(format!(
            "Channel mode {:?} requires an RGB image, got {} channel(s)",
            mode, channels
        ));
    }

    // Direct single-channel modes touch exactly one channel
    if let Some(c) = mode.direct_channel() {
        if c >= channels {
            return Err(format!(
                "Channel mode {:?} needs channel {} but the image has {}",
                mode, c, channels
            ));
        }
        let c = c as usize;
        let ch = channels as usize;
        for_each_pixel(working.data_mut(), ch, |pixel| {
            pixel[c] = engine.evaluate(f64::from(pixel[c]), c) as f32;
        });
        return Ok(());
    }

    match mode {
        ChannelMode::Rgb => {
            let ch = channels as usize;
            for_each_pixel(working.data_mut(), ch, |pixel| {
                for (c, v) in pixel.iter_mut().enumerate() {
                    *v = engine.evaluate(f64::from(*v), c) as f32;
                }
            });
        }
        // Handled above
        ChannelMode::Red | ChannelMode::Green | ChannelMode::Blue => {}
        ChannelMode::Lightness => {
            for_each_pixel(working.data_mut(), 3, |pixel| {
                let mut hsl = rgb_to_hsl(pixel[0], pixel[1], pixel[2]);
                hsl.l = engine.evaluate(f64::from(hsl.l), 0).clamp(0.0, 1.0) as f32;
                let (r, g, b) = hsl_to_rgb(hsl);
                pixel[0] = r;
                pixel[1] = g;
                pixel[2] = b;
            });
        }
        ChannelMode::Saturation => {
            for_each_pixel(working.data_mut(), 3, |pixel| {
                let mut hsv = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
                hsv.s = engine.evaluate(f64::from(hsv.s), 1).clamp(0.0, 1.0) as f32;
                let (r, g, b) = hsv_to_rgb(hsv);
                pixel[0] = r;
                pixel[1] = g;
                pixel[2] = b;
            });
        }
        ChannelMode::Luminance => {
            let coeffs = engine.params().normalized_lum_coefficients();
            let policy = engine.params().overflow_policy;
            for_each_pixel(working.data_mut(), 3, |pixel| {
                scale_pixel_luminance(pixel, engine, &coeffs, policy);
            });
        }
    }
    Ok(())
}

/// Luminance mode for one pixel: stretch the weighted luminance and
/// scale R, G, B by the luminance ratio, then resolve overflow.
#[inline]
fn scale_pixel_luminance(
    pixel: &mut [f32],
    engine: &TransformEngine,
    coeffs: &[f64; 3],
    policy: OverflowPolicy,
) {
    let lum = weighted_luminance(pixel[0], pixel[1], pixel[2], coeffs);
    if lum <= 0.0 {
        // Zero luminance forces 0 on all three channels
        pixel[0] = 0.0;
        pixel[1] = 0.0;
        pixel[2] = 0.0;
        return;
    }
    let stretched = engine.evaluate(lum, 0).max(0.0);
    let ratio = (stretched / lum) as f32;
    let mut r = (pixel[0] * ratio).max(0.0);
    let mut g = (pixel[1] * ratio).max(0.0);
    let mut b = (pixel[2] * ratio).max(0.0);

    let max = r.max(g).max(b);
    if max > 1.0 {
        match policy {
            OverflowPolicy::Rescale => {
                r /= max;
                g /= max;
                b /= max;
            }
            OverflowPolicy::Clip => {
                r = r.min(1.0);
                g = g.min(1.0);
                b = b.min(1.0);
            }
        }
    }
    pixel[0] = r;
    pixel[1] = g;
    pixel[2] = b;
}

/// Combine the current buffer with a second source for the Image Blend
/// kind: `out = (1 - p·w)·A + p·w·B`, or the closed-form inverse
/// `out = (A - p·w·B) / (1 - p·w)` when inverting (w = 1 without a
/// mask). A zero inverse denominator maps to the defined 0 output.
pub fn blend_buffers(
    current: &mut SampleBuffer,
    source: &SampleBuffer,
    params: &StretchParameters,
    mask: Option<&MaskView<'_>>,
) -> Result<(), String> {
    if current.width() != source.width()
        || current.height() != source.height()
        || current.channels() != source.channels()
    {
        return Err(format!(
            "Blend source {}x{}x{} does not match target {}x{}x{}",
            source.width(),
            source.height(),
            source.channels(),
            current.width(),
            current.height(),
            current.channels()
        ));
    }
    if let Some(m) = mask {
        if m.width() != current.width() || m.height() != current.height() {
            return Err(format!(
                "Blend mask size {}x{} does not match target {}x{}",
                m.width(),
                m.height(),
                current.width(),
                current.height()
            ));
        }
    }

    let p = params.combine_fraction();
    let invert = params.invert;
    let channels = current.channels();
    // Direct single-channel modes blend only their channel; RGB/K and
    // the virtual channel modes blend every real channel.
    let only_channel = params.channel_mode.direct_channel();
    if let Some(c) = only_channel {
        if c >= channels {
            return Err(format!(
                "Channel mode {:?} needs channel {} but the image has {}",
                params.channel_mode, c, channels
            ));
        }
    }

    for y in 0..current.height() {
        for x in 0..current.width() {
            for c in 0..channels {
                if only_channel.is_some_and(|oc| oc != c) {
                    continue;
                }
                let w = mask.map_or(1.0, |m| f64::from(m.weight(x, y, c)));
                let pw = p * w;
                let a = f64::from(current.sample(x, y, c));
                let b = f64::from(source.sample(x, y, c));
                let out = if invert {
                    let denom = 1.0 - pw;
                    if denom.abs() < 1e-12 {
                        0.0
                    } else {
                        (a - pw * b) / denom
                    }
                } else {
                    (1.0 - pw) * a + pw * b
                };
                current.set_sample(x, y, c, if out.is_finite() { out as f32 } else { 0.0 });
            }
        }
    }
    Ok(())
}

/// Run a per-pixel closure over interleaved data, in parallel above the
/// sample-count threshold.
fn for_each_pixel<F>(data: &mut [f32], stride: usize, op: F)
where
    F: Fn(&mut [f32]) + Sync + Send,
{
    if data.len() >= PARALLEL_THRESHOLD {
        data.par_chunks_mut(CHUNK_SIZE).for_each(|chunk| {
            for pixel in chunk.chunks_exact_mut(stride) {
                op(pixel);
            }
        });
    } else {
        for pixel in data.chunks_exact_mut(stride) {
            op(pixel);
        }
    }
}
