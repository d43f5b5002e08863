//! Tests for channel compositing

use super::*;
use crate::buffer::SampleBuffer;
use crate::color::rgb_to_hsl;
use crate::mask::MaskView;
use crate::models::{ChannelMode, OverflowPolicy, StretchKind, StretchParameters};
use crate::transform::TransformEngine;

fn linear_params(mode: ChannelMode) -> StretchParameters {
    StretchParameters {
        kind: StretchKind::Linear,
        bp: 0.1,
        wp: 0.9,
        channel_mode: mode,
        ..StretchParameters::default()
    }
}

fn rgb_buffer(pixels: &[[f32; 3]]) -> SampleBuffer {
    let data: Vec<f32> = pixels.iter().flatten().copied().collect();
    SampleBuffer::from_data(pixels.len() as u32, 1, 3, data).unwrap()
}

// ========================================================================
// Channel selection
// ========================================================================

#[test]
fn test_rgb_mode_transforms_every_channel() {
    let engine = TransformEngine::new(&linear_params(ChannelMode::Rgb)).unwrap();
    let mut buf = rgb_buffer(&[[0.1, 0.5, 0.9]]);
    apply_point_transform(&mut buf, &engine).unwrap();
    let d = buf.data();
    assert!(d[0].abs() < 1e-6, "0.1 -> {}", d[0]);
    assert!((d[1] - 0.5).abs() < 1e-6, "0.5 -> {}", d[1]);
    assert!((d[2] - 1.0).abs() < 1e-6, "0.9 -> {}", d[2]);
}

#[test]
fn test_single_channel_mode_leaves_others_untouched() {
    let engine = TransformEngine::new(&linear_params(ChannelMode::Green)).unwrap();
    let mut buf = rgb_buffer(&[[0.5, 0.5, 0.5]]);
    apply_point_transform(&mut buf, &engine).unwrap();
    let d = buf.data();
    assert_eq!(d[0], 0.5);
    assert!((d[1] - 0.5).abs() < 1e-6); // transformed, midpoint is fixed
    assert_eq!(d[2], 0.5);

    let engine = TransformEngine::new(&linear_params(ChannelMode::Red)).unwrap();
    let mut buf = rgb_buffer(&[[0.9, 0.3, 0.3]]);
    apply_point_transform(&mut buf, &engine).unwrap();
    let d = buf.data();
    assert!((d[0] - 1.0).abs() < 1e-6);
    assert_eq!(d[1], 0.3);
    assert_eq!(d[2], 0.3);
}

#[test]
fn test_color_channel_mode_rejects_mono() {
    let engine = TransformEngine::new(&linear_params(ChannelMode::Blue)).unwrap();
    let mut buf = SampleBuffer::from_data(2, 1, 1, vec![0.2, 0.4]).unwrap();
    assert!(apply_point_transform(&mut buf, &engine).is_err());
}

#[test]
fn test_rgb_mode_on_mono_uses_single_channel() {
    let engine = TransformEngine::new(&linear_params(ChannelMode::Rgb)).unwrap();
    let mut buf = SampleBuffer::from_data(2, 1, 1, vec![0.1, 0.9]).unwrap();
    apply_point_transform(&mut buf, &engine).unwrap();
    assert!(buf.data()[0].abs() < 1e-6);
    assert!((buf.data()[1] - 1.0).abs() < 1e-6);
}

#[test]
fn test_derived_mode_rejects_mono() {
    let engine = TransformEngine::new(&linear_params(ChannelMode::Lightness)).unwrap();
    let mut buf = SampleBuffer::from_data(2, 1, 1, vec![0.2, 0.4]).unwrap();
    assert!(apply_point_transform(&mut buf, &engine).is_err());
}

// ========================================================================
// Derived channels
// ========================================================================

#[test]
fn test_lightness_mode_preserves_hue() {
    let params = StretchParameters {
        kind: StretchKind::GeneralisedHyperbolic,
        d: 3.0,
        b: 1.0,
        sp: 0.2,
        channel_mode: ChannelMode::Lightness,
        ..StretchParameters::default()
    };
    let engine = TransformEngine::new(&params).unwrap();
    let mut buf = rgb_buffer(&[[0.4, 0.2, 0.1]]);
    let before = rgb_to_hsl(0.4, 0.2, 0.1);
    apply_point_transform(&mut buf, &engine).unwrap();
    let d = buf.data();
    let after = rgb_to_hsl(d[0], d[1], d[2]);
    assert!(
        (after.h - before.h).abs() < 1.0,
        "hue changed: {} -> {}",
        before.h,
        after.h
    );
    assert!(after.l > before.l, "lightness should be stretched up");
}

#[test]
fn test_saturation_mode_changes_only_saturation() {
    let params = StretchParameters {
        kind: StretchKind::Linear,
        bp: 0.0,
        wp: 2.0, // halves the saturation
        channel_mode: ChannelMode::Saturation,
        ..StretchParameters::default()
    };
    let engine = TransformEngine::new(&params).unwrap();
    let mut buf = rgb_buffer(&[[0.8, 0.4, 0.4]]);
    let before = crate::color::rgb_to_hsv(0.8, 0.4, 0.4);
    apply_point_transform(&mut buf, &engine).unwrap();
    let d = buf.data();
    let after = crate::color::rgb_to_hsv(d[0], d[1], d[2]);
    assert!((after.s - before.s / 2.0).abs() < 1e-3, "s {}", after.s);
    assert!((after.v - before.v).abs() < 1e-3, "v changed: {}", after.v);
    assert!((after.h - before.h).abs() < 1.0, "h changed: {}", after.h);
}

#[test]
fn test_zero_luminance_forces_zero_output() {
    let params = StretchParameters {
        kind: StretchKind::GeneralisedHyperbolic,
        d: 5.0,
        channel_mode: ChannelMode::Luminance,
        ..StretchParameters::default()
    };
    let engine = TransformEngine::new(&params).unwrap();
    let mut buf = rgb_buffer(&[[0.0, 0.0, 0.0]]);
    apply_point_transform(&mut buf, &engine).unwrap();
    assert_eq!(buf.data(), &[0.0, 0.0, 0.0]);
}

#[test]
fn test_luminance_overflow_rescale_preserves_ratio() {
    // A strong stretch pushes this saturated pixel past 1.0
    let params = StretchParameters {
        kind: StretchKind::Linear,
        bp: 0.0,
        wp: 0.25, // 4x gain
        channel_mode: ChannelMode::Luminance,
        overflow_policy: OverflowPolicy::Rescale,
        ..StretchParameters::default()
    };
    let engine = TransformEngine::new(&params).unwrap();
    let mut buf = rgb_buffer(&[[0.8, 0.4, 0.2]]);
    apply_point_transform(&mut buf, &engine).unwrap();
    let d = buf.data();
    assert!(d.iter().all(|&v| v <= 1.0 + 1e-6), "overflow: {:?}", d);
    // Ratios of the scaled triple are preserved
    assert!((d[0] / d[1] - 2.0).abs() < 1e-4, "r/g {}", d[0] / d[1]);
    assert!((d[1] / d[2] - 2.0).abs() < 1e-4, "g/b {}", d[1] / d[2]);
}

#[test]
fn test_luminance_overflow_clip_clamps_channels() {
    let params = StretchParameters {
        kind: StretchKind::Linear,
        bp: 0.0,
        wp: 0.25,
        channel_mode: ChannelMode::Luminance,
        overflow_policy: OverflowPolicy::Clip,
        ..StretchParameters::default()
    };
    let engine = TransformEngine::new(&params).unwrap();
    let mut buf = rgb_buffer(&[[0.8, 0.4, 0.2]]);
    apply_point_transform(&mut buf, &engine).unwrap();
    let d = buf.data();
    assert!(d.iter().all(|&v| v <= 1.0), "overflow: {:?}", d);
    assert_eq!(d[0], 1.0);
    // Clip does not preserve the ratio
    assert!((d[0] / d[1] - 2.0).abs() > 1e-3);
}

// ========================================================================
// Blend
// ========================================================================

fn blend_params(percent: f64, invert: bool) -> StretchParameters {
    StretchParameters {
        kind: StretchKind::Blend,
        combine_target_id: Some("other".to_string()),
        combine_percent: percent,
        invert,
        ..StretchParameters::default()
    }
}

#[test]
fn test_blend_fifty_percent_scenario() {
    let mut a = rgb_buffer(&[[0.2, 0.4, 0.6]]);
    let b = rgb_buffer(&[[0.6, 0.8, 0.2]]);
    blend_buffers(&mut a, &b, &blend_params(50.0, false), None).unwrap();
    let d = a.data();
    assert!((d[0] - 0.4).abs() < 1e-6);
    assert!((d[1] - 0.6).abs() < 1e-6);
    assert!((d[2] - 0.4).abs() < 1e-6);
}

#[test]
fn test_blend_inverse_recovers_original() {
    let original = rgb_buffer(&[[0.2, 0.4, 0.6]]);
    let b = rgb_buffer(&[[0.7, 0.1, 0.5]]);
    let mut blended = original.clone();
    blend_buffers(&mut blended, &b, &blend_params(30.0, false), None).unwrap();
    blend_buffers(&mut blended, &b, &blend_params(30.0, true), None).unwrap();
    for (got, want) in blended.data().iter().zip(original.data()) {
        assert!((got - want).abs() < 1e-5, "{} != {}", got, want);
    }
}

#[test]
fn test_masked_blend_forward_formula() {
    let mut a = SampleBuffer::from_data(1, 1, 1, vec![0.2]).unwrap();
    let b = SampleBuffer::from_data(1, 1, 1, vec![1.0]).unwrap();
    let mask_buf = SampleBuffer::from_data(1, 1, 1, vec![0.5]).unwrap();
    let mask = MaskView::new(&mask_buf, false);
    blend_buffers(&mut a, &b, &blend_params(80.0, false), Some(&mask)).unwrap();
    // out = (1 - 0.8*0.5)*0.2 + 0.8*0.5*1.0 = 0.12 + 0.4
    assert!((a.data()[0] - 0.52).abs() < 1e-6, "got {}", a.data()[0]);
}

#[test]
fn test_masked_blend_inverse_round_trip() {
    let original = SampleBuffer::from_data(1, 1, 1, vec![0.3]).unwrap();
    let b = SampleBuffer::from_data(1, 1, 1, vec![0.9]).unwrap();
    let mask_buf = SampleBuffer::from_data(1, 1, 1, vec![0.6]).unwrap();

    for inverted_mask in [false, true] {
        let mask = MaskView::new(&mask_buf, inverted_mask);
        let mut buf = original.clone();
        blend_buffers(&mut buf, &b, &blend_params(40.0, false), Some(&mask)).unwrap();
        blend_buffers(&mut buf, &b, &blend_params(40.0, true), Some(&mask)).unwrap();
        assert!(
            (buf.data()[0] - 0.3).abs() < 1e-5,
            "mask inverted={}: {}",
            inverted_mask,
            buf.data()[0]
        );
    }
}

#[test]
fn test_blend_single_channel_mode_only_touches_that_channel() {
    let mut a = rgb_buffer(&[[0.2, 0.2, 0.2]]);
    let b = rgb_buffer(&[[1.0, 1.0, 1.0]]);
    let mut p = blend_params(100.0, false);
    p.channel_mode = ChannelMode::Red;
    blend_buffers(&mut a, &b, &p, None).unwrap();
    let d = a.data();
    assert!((d[0] - 1.0).abs() < 1e-6);
    assert_eq!(d[1], 0.2);
    assert_eq!(d[2], 0.2);
}

#[test]
fn test_blend_size_mismatch_rejected() {
    let mut a = rgb_buffer(&[[0.2, 0.2, 0.2]]);
    let b = rgb_buffer(&[[1.0, 1.0, 1.0], [0.0, 0.0, 0.0]]);
    assert!(blend_buffers(&mut a, &b, &blend_params(50.0, false), None).is_err());
}
