//! Tests for preview orchestration

use std::sync::{Arc, Mutex};

use super::*;
use crate::models::{ChannelMode, StretchKind};
use crate::readout::ReadoutSampler;

fn constant(width: u32, height: u32, channels: u8, value: f32) -> SampleBuffer {
    let len = width as usize * height as usize * channels as usize;
    SampleBuffer::from_data(width, height, channels, vec![value; len]).unwrap()
}

fn linear_params(bp: f64, wp: f64) -> StretchParameters {
    StretchParameters {
        kind: StretchKind::Linear,
        bp,
        wp,
        ..StretchParameters::default()
    }
}

fn ctx<'a>(target: &'a TargetImage) -> PreviewContext<'a> {
    PreviewContext {
        target,
        mask: None,
        blend_source: None,
        frame_width: target.buffer.width(),
        frame_height: target.buffer.height(),
    }
}

// ========================================================================
// Change detection and caching
// ========================================================================

#[test]
fn test_recompute_then_cached() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.5));
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let selection = target.buffer.bounds();

    let outcome = orch.recompute_preview(&params, &ctx(&target), selection).unwrap();
    assert_eq!(outcome, PreviewOutcome::Computed);
    let first = orch.preview().unwrap().clone();

    let outcome = orch.recompute_preview(&params, &ctx(&target), selection).unwrap();
    assert_eq!(outcome, PreviewOutcome::Cached);
    assert_eq!(orch.preview().unwrap().data(), first.data());
}

#[test]
fn test_parameter_change_triggers_recompute() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.5));
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let selection = target.buffer.bounds();
    orch.recompute_preview(&params, &ctx(&target), selection).unwrap();

    let changed = linear_params(0.2, 0.9);
    let outcome = orch.recompute_preview(&changed, &ctx(&target), selection).unwrap();
    assert_eq!(outcome, PreviewOutcome::Computed);
}

#[test]
fn test_sub_precision_change_is_cached() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.5));
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let selection = target.buffer.bounds();
    orch.recompute_preview(&params, &ctx(&target), selection).unwrap();

    // Below quantization precision, so structurally identical
    let nudged = linear_params(0.1, 0.9 + 1e-9);
    let outcome = orch.recompute_preview(&nudged, &ctx(&target), selection).unwrap();
    assert_eq!(outcome, PreviewOutcome::Cached);
}

#[test]
fn test_selection_change_triggers_recompute() {
    let target = TargetImage::new("t", constant(8, 8, 3, 0.5));
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let c = PreviewContext { frame_width: 8, frame_height: 8, ..ctx(&target) };

    orch.recompute_preview(&params, &c, target.buffer.bounds()).unwrap();
    let outcome = orch
        .recompute_preview(&params, &c, crate::geometry::Rect::new(2, 2, 6, 6))
        .unwrap();
    assert_eq!(outcome, PreviewOutcome::Computed);
    assert_eq!(orch.preview().unwrap().width(), 4);
}

#[test]
fn test_oversized_selection_clipped_to_target() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.5));
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();

    let outcome = orch
        .recompute_preview(&params, &ctx(&target), crate::geometry::Rect::new(0, 0, 10, 10))
        .unwrap();
    assert_eq!(outcome, PreviewOutcome::Computed);
    assert_eq!(orch.preview().unwrap().width(), 4);
    assert_eq!(orch.preview().unwrap().height(), 4);
    // The mapper sees the clipped rectangle, not the oversized request
    assert_eq!(orch.mapper().unwrap().selection(), target.buffer.bounds());
    assert_eq!(orch.mapper().unwrap().zoom(), 1.0);

    // The clipped rectangle is also the cache key
    let outcome = orch
        .recompute_preview(&params, &ctx(&target), target.buffer.bounds())
        .unwrap();
    assert_eq!(outcome, PreviewOutcome::Cached);
}

#[test]
fn test_invalidate_forces_recompute() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.5));
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let selection = target.buffer.bounds();
    orch.recompute_preview(&params, &ctx(&target), selection).unwrap();
    orch.invalidate();
    let outcome = orch.recompute_preview(&params, &ctx(&target), selection).unwrap();
    assert_eq!(outcome, PreviewOutcome::Computed);
}

#[test]
fn test_failed_pass_does_not_commit() {
    let target = TargetImage::new("t", constant(4, 4, 1, 0.5));
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();

    // A mono target rejects a color channel mode mid-pass
    let mut bad = linear_params(0.1, 0.9);
    bad.channel_mode = ChannelMode::Blue;
    assert!(orch
        .recompute_preview(&bad, &ctx(&target), target.buffer.bounds())
        .is_err());
    assert!(orch.last_signature().is_none());
    assert!(orch.preview().is_none());
}

// ========================================================================
// Masking
// ========================================================================

#[test]
fn test_opaque_mask_matches_unmasked_preview() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.5));
    let mask = Mask {
        id: "m".to_string(),
        buffer: constant(4, 4, 1, 1.0),
        inverted: false,
    };
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let c = PreviewContext { mask: Some(&mask), ..ctx(&target) };
    orch.recompute_preview(&params, &c, target.buffer.bounds()).unwrap();
    assert_eq!(
        orch.preview().unwrap().data(),
        orch.unmasked_preview().unwrap().data()
    );
}

#[test]
fn test_zero_mask_restores_original() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.3));
    let mask = Mask {
        id: "m".to_string(),
        buffer: constant(4, 4, 1, 0.0),
        inverted: false,
    };
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let c = PreviewContext { mask: Some(&mask), ..ctx(&target) };
    orch.recompute_preview(&params, &c, target.buffer.bounds()).unwrap();
    assert!(orch.preview().unwrap().data().iter().all(|&v| (v - 0.3).abs() < 1e-6));
    // Readout buffer still carries the transformed values, (0.3-0.1)/0.8
    assert!(orch
        .unmasked_preview()
        .unwrap()
        .data()
        .iter()
        .all(|&v| (v - 0.25).abs() < 1e-6));
}

#[test]
fn test_mismatched_mask_skipped() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.3));
    let mask = Mask {
        id: "m".to_string(),
        buffer: constant(3, 3, 1, 0.0),
        inverted: false,
    };
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let c = PreviewContext { mask: Some(&mask), ..ctx(&target) };
    // A wrongly sized mask is skipped; the pass still completes
    let outcome = orch
        .recompute_preview(&params, &c, target.buffer.bounds())
        .unwrap();
    assert_eq!(outcome, PreviewOutcome::Computed);
    assert_eq!(
        orch.preview().unwrap().data(),
        orch.unmasked_preview().unwrap().data()
    );
    assert!(orch.preview().unwrap().data().iter().all(|&v| (v - 0.25).abs() < 1e-6));
}

// ========================================================================
// Blend pass
// ========================================================================

fn blend_params(percent: f64) -> StretchParameters {
    StretchParameters {
        kind: StretchKind::Blend,
        combine_target_id: Some("other".to_string()),
        combine_percent: percent,
        ..StretchParameters::default()
    }
}

#[test]
fn test_blend_combines_named_source() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.2));
    let source = TargetImage::new("other", constant(4, 4, 3, 0.8));
    let params = blend_params(50.0);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let c = PreviewContext { blend_source: Some(&source), ..ctx(&target) };
    orch.recompute_preview(&params, &c, target.buffer.bounds()).unwrap();
    assert!(orch.preview().unwrap().data().iter().all(|&v| (v - 0.5).abs() < 1e-6));
}

#[test]
fn test_blend_missing_source_soft_fails() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.2));
    let params = blend_params(50.0);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let outcome = orch
        .recompute_preview(&params, &ctx(&target), target.buffer.bounds())
        .unwrap();
    // No source: the pass completes with the unblended selection
    assert_eq!(outcome, PreviewOutcome::Computed);
    assert!(orch.preview().unwrap().data().iter().all(|&v| (v - 0.2).abs() < 1e-6));
}

#[test]
fn test_blend_wrong_id_soft_fails() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.2));
    let source = TargetImage::new("unrelated", constant(4, 4, 3, 0.8));
    let params = blend_params(50.0);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let c = PreviewContext { blend_source: Some(&source), ..ctx(&target) };
    orch.recompute_preview(&params, &c, target.buffer.bounds()).unwrap();
    assert!(orch.preview().unwrap().data().iter().all(|&v| (v - 0.2).abs() < 1e-6));
}

#[test]
fn test_blend_mismatched_source_soft_fails() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.2));
    let source = TargetImage::new("other", constant(2, 2, 3, 0.8));
    let params = blend_params(50.0);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let c = PreviewContext { blend_source: Some(&source), ..ctx(&target) };
    let outcome = orch
        .recompute_preview(&params, &c, target.buffer.bounds())
        .unwrap();
    assert_eq!(outcome, PreviewOutcome::Computed);
    assert!(orch.preview().unwrap().data().iter().all(|&v| (v - 0.2).abs() < 1e-6));
}

// ========================================================================
// Finalization and readout
// ========================================================================

#[test]
fn test_preview_is_clamped() {
    // 4x gain pushes 0.9 past 1.0, and bp pulls 0.05 below 0.0
    let target = TargetImage::new(
        "t",
        SampleBuffer::from_data(2, 1, 1, vec![0.9, 0.05]).unwrap(),
    );
    let params = linear_params(0.1, 0.35);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    let c = PreviewContext { frame_width: 2, frame_height: 1, ..ctx(&target) };
    orch.recompute_preview(&params, &c, target.buffer.bounds()).unwrap();
    let d = orch.preview().unwrap().data();
    assert_eq!(d[0], 1.0);
    assert_eq!(d[1], 0.0);
}

#[test]
fn test_readout_refreshes_after_recompute() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.5));
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();
    orch.set_readout(ReadoutSampler::new((2, 2), 3).unwrap());
    assert!(orch.readout().unwrap().last().is_none());

    orch.recompute_preview(&params, &ctx(&target), target.buffer.bounds()).unwrap();
    let (_, stats) = orch.readout().unwrap().last().unwrap();
    // (0.5 - 0.1) / 0.8 = 0.5
    assert!((stats.mean - 0.5).abs() < 1e-6, "mean {}", stats.mean);
    // The sampler keeps its image-space point
    assert_eq!(orch.readout().unwrap().point(), (2, 2));
}

#[test]
fn test_progress_phases_reported() {
    let target = TargetImage::new("t", constant(4, 4, 3, 0.5));
    let params = linear_params(0.1, 0.9);
    let mut orch = PreviewOrchestrator::new(&params).unwrap();

    let phases = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&phases);
    orch.set_progress_callback(Box::new(move |p| sink.lock().unwrap().push(p)));

    orch.recompute_preview(&params, &ctx(&target), target.buffer.bounds()).unwrap();
    let phases = phases.lock().unwrap();
    assert_eq!(
        *phases,
        vec![PreviewPhase::Resample, PreviewPhase::Stretch, PreviewPhase::Finalize]
    );
}
