//! Preview orchestration.
//!
//! Runs the full preview pass: resample the selected region at the
//! viewport zoom, apply the point transform (or blend pass), blend
//! against the pre-transform copy through the mask, clamp, and refresh
//! the cursor readout. Recomputation is gated by a structural signature
//! of every input, so an unchanged request is a cheap cache hit.

#[cfg(test)]
mod tests;

use crate::buffer::SampleBuffer;
use crate::compositor;
use crate::geometry::Rect;
use crate::histogram::HistogramAnalyzer;
use crate::mask::{self, Mask, MaskView};
use crate::models::{
    ChangeDetector, MaskSignature, PreviewSignature, StretchKind, StretchParameters,
};
use crate::readout::ReadoutSampler;
use crate::transform::TransformEngine;
use crate::verbose_println;
use crate::viewport::ViewportMapper;

/// An identified image the preview pipeline can target or combine with.
#[derive(Debug, Clone)]
pub struct TargetImage {
    pub id: String,
    pub buffer: SampleBuffer,
}

impl TargetImage {
    pub fn new(id: impl Into<String>, buffer: SampleBuffer) -> Self {
        Self {
            id: id.into(),
            buffer,
        }
    }
}

/// Borrowed inputs of one recompute pass: the target, the optional mask
/// and blend source, and the display frame the preview is rendered into.
#[derive(Debug, Clone, Copy)]
pub struct PreviewContext<'a> {
    pub target: &'a TargetImage,
    pub mask: Option<&'a Mask>,
    pub blend_source: Option<&'a TargetImage>,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Coarse progress stages reported during a recompute pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPhase {
    Resample,
    Stretch,
    Combine,
    MaskBlend,
    Finalize,
}

/// What a recompute request actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// The pipeline ran and the preview buffer was rebuilt.
    Computed,
    /// Nothing relevant changed; the existing preview was kept as-is.
    Cached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComputeState {
    Idle,
    Computing,
}

/// Drives preview recomputation over a target image.
///
/// The committed signature only advances when a pass completes, so a
/// failed pass leaves the orchestrator ready to retry. A second
/// recompute request while one is in flight is rejected rather than
/// queued.
pub struct PreviewOrchestrator {
    engine: TransformEngine,
    detector: ChangeDetector,
    state: ComputeState,
    mapper: Option<ViewportMapper>,
    preview: Option<SampleBuffer>,
    unmasked: Option<SampleBuffer>,
    readout: Option<ReadoutSampler>,
    progress: Option<Box<dyn FnMut(PreviewPhase) + Send>>,
}

impl PreviewOrchestrator {
    pub fn new(params: &StretchParameters) -> Result<Self, String> {
        Ok(Self {
            engine: TransformEngine::new(params)?,
            detector: ChangeDetector::new(),
            state: ComputeState::Idle,
            mapper: None,
            preview: None,
            unmasked: None,
            readout: None,
            progress: None,
        })
    }

    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    /// The masked, clamped preview of the last completed pass.
    pub fn preview(&self) -> Option<&SampleBuffer> {
        self.preview.as_ref()
    }

    /// The pre-mask transform result the readout samples from.
    pub fn unmasked_preview(&self) -> Option<&SampleBuffer> {
        self.unmasked.as_ref()
    }

    pub fn mapper(&self) -> Option<&ViewportMapper> {
        self.mapper.as_ref()
    }

    pub fn last_signature(&self) -> Option<&PreviewSignature> {
        self.detector.last()
    }

    /// Force the next recompute request to run the full pass.
    pub fn invalidate(&mut self) {
        self.detector.invalidate();
    }

    pub fn set_progress_callback(&mut self, callback: Box<dyn FnMut(PreviewPhase) + Send>) {
        self.progress = Some(callback);
    }

    /// Attach a cursor readout. Its point is in full-image coordinates;
    /// it is refreshed against the current preview immediately and after
    /// every completed pass.
    pub fn set_readout(&mut self, sampler: ReadoutSampler) {
        self.readout = Some(sampler);
        self.refresh_readout();
    }

    pub fn readout(&self) -> Option<&ReadoutSampler> {
        self.readout.as_ref()
    }

    /// Move the readout point (full-image coordinates) and refresh it.
    pub fn move_readout(&mut self, point: (i64, i64)) {
        if let Some(sampler) = self.readout.as_mut() {
            sampler.set_point(point);
        }
        self.refresh_readout();
    }

    /// Run the preview pipeline for the given parameters, inputs and
    /// image-space selection. Returns `Cached` without touching the
    /// preview when nothing relevant changed since the last completed
    /// pass. A request made while a pass is in flight is an error.
    pub fn recompute_preview(
        &mut self,
        params: &StretchParameters,
        ctx: &PreviewContext<'_>,
        selection: Rect,
    ) -> Result<PreviewOutcome, String> {
        if self.state == ComputeState::Computing {
            return Err("A preview recompute is already in progress".to_string());
        }
        self.state = ComputeState::Computing;
        let result = self.recompute_inner(params, ctx, selection);
        self.state = ComputeState::Idle;
        result
    }

    fn recompute_inner(
        &mut self,
        params: &StretchParameters,
        ctx: &PreviewContext<'_>,
        selection: Rect,
    ) -> Result<PreviewOutcome, String> {
        self.engine.recalc_if_needed(params)?;
        let target = ctx.target;
        // Selections are always relative to the base image bounds
        let selection = selection.clipped_to(target.buffer.width(), target.buffer.height());
        let mask = resolve_mask(ctx);

        let mapper = ViewportMapper::new(selection, ctx.frame_width, ctx.frame_height)?;

        let signature = PreviewSignature {
            stretch: self.engine.signature().clone(),
            target_id: target.id.clone(),
            mask: mask.map(|m| MaskSignature {
                id: m.id.clone(),
                inverted: m.inverted,
            }),
            selection,
        };
        if self.preview.is_some() && !self.detector.needs_recompute(&signature) {
            verbose_println!("Preview unchanged, keeping cached buffer");
            return Ok(PreviewOutcome::Cached);
        }

        self.phase(PreviewPhase::Resample);
        let zoom = mapper.zoom();
        let mut working = target.buffer.resample(&selection, zoom)?;
        let original = working.clone();
        let resampled_mask = match mask {
            Some(m) => Some(m.buffer.resample(&selection, zoom)?),
            None => None,
        };
        let mask_view = match (mask, resampled_mask.as_ref()) {
            (Some(m), Some(buf)) => Some(MaskView::new(buf, m.inverted)),
            _ => None,
        };

        let kind = self.engine.params().kind;
        let unmasked;
        if kind == StretchKind::Blend {
            self.phase(PreviewPhase::Combine);
            // A missing or incompatible blend source leaves the preview
            // unblended instead of failing the whole pass.
            match self.resolve_blend_source(ctx) {
                Some(src) => {
                    let source = src.buffer.resample(&selection, zoom)?;
                    compositor::blend_buffers(
                        &mut working,
                        &source,
                        self.engine.params(),
                        mask_view.as_ref(),
                    )?;
                }
                None => verbose_println!(
                    "Blend source {:?} unavailable, skipping combine",
                    self.engine.params().combine_target_id
                ),
            }
            // The mask is folded into the blend itself
            unmasked = working.clone();
        } else {
            if kind == StretchKind::Stf && !self.engine.stf_ready() {
                let coeffs = self.engine.params().normalized_lum_coefficients();
                let linked = self.engine.params().stf_linked;
                let mut analyzer = HistogramAnalyzer::new(&target.buffer, coeffs);
                let curves = analyzer.derive_stf_curves(linked)?;
                self.engine.set_stf(curves);
            }
            self.phase(PreviewPhase::Stretch);
            compositor::apply_point_transform(&mut working, &self.engine)?;
            unmasked = working.clone();
            if let Some(mv) = mask_view.as_ref() {
                self.phase(PreviewPhase::MaskBlend);
                mask::blend_with_original(&mut working, &original, mv)?;
            }
        }

        self.phase(PreviewPhase::Finalize);
        let mut unmasked = unmasked;
        clamp_unit(working.data_mut());
        clamp_unit(unmasked.data_mut());

        self.preview = Some(working);
        self.unmasked = Some(unmasked);
        self.mapper = Some(mapper);
        self.detector.commit(signature);
        self.refresh_readout();
        Ok(PreviewOutcome::Computed)
    }

    /// The blend source named by the parameters, if it is present and
    /// shaped like the target.
    fn resolve_blend_source<'a>(&self, ctx: &PreviewContext<'a>) -> Option<&'a TargetImage> {
        let wanted = self.engine.params().combine_target_id.as_ref()?;
        let src = ctx.blend_source.filter(|s| &s.id == wanted)?;
        let t = &ctx.target.buffer;
        if src.buffer.width() != t.width()
            || src.buffer.height() != t.height()
            || src.buffer.channels() != t.channels()
        {
            return None;
        }
        Some(src)
    }

    fn phase(&mut self, phase: PreviewPhase) {
        if let Some(cb) = self.progress.as_mut() {
            cb(phase);
        }
    }

    /// Re-sample the readout window against the unmasked preview. The
    /// sampler's point is mapped from full-image into preview-buffer
    /// coordinates through the current selection and zoom.
    fn refresh_readout(&mut self) {
        let Some(mut sampler) = self.readout.take() else {
            return;
        };
        if let (Some(unmasked), Some(mapper)) = (self.unmasked.as_ref(), self.mapper.as_ref()) {
            let sel = mapper.selection();
            let zoom = mapper.zoom();
            let (ix, iy) = sampler.point();
            let px = ((ix - i64::from(sel.x0)) as f64 * zoom).round() as i64;
            let py = ((iy - i64::from(sel.y0)) as f64 * zoom).round() as i64;
            let image_point = sampler.point();
            sampler.set_point((px, py));
            let mode = self.engine.params().channel_mode;
            let coeffs = self.engine.params().normalized_lum_coefficients();
            if let Err(e) = sampler.sample(unmasked, mode, &coeffs) {
                verbose_println!("Readout sampling failed: {}", e);
            }
            sampler.set_point(image_point);
        }
        self.readout = Some(sampler);
    }
}

/// The attached mask, if it is shaped like the target. An incompatible
/// mask skips the mask blend step rather than failing the pass.
fn resolve_mask<'a>(ctx: &PreviewContext<'a>) -> Option<&'a Mask> {
    let m = ctx.mask?;
    let t = &ctx.target.buffer;
    if m.buffer.width() != t.width() || m.buffer.height() != t.height() {
        verbose_println!(
            "Mask '{}' is {}x{} but target '{}' is {}x{}, skipping mask blend",
            m.id,
            m.buffer.width(),
            m.buffer.height(),
            ctx.target.id,
            t.width(),
            t.height()
        );
        return None;
    }
    Some(m)
}

/// Clamp every sample into [0, 1], mapping non-finite values to 0.
fn clamp_unit(data: &mut [f32]) {
    for v in data.iter_mut() {
        *v = if v.is_finite() {
            v.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}
