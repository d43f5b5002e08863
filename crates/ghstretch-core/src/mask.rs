//! Spatial mask blending.
//!
//! A mask is a weight buffer in [0, 1] blending transformed and original
//! samples: `out = (1 - w) * original + w * transformed`, with `w`
//! flipped when the mask is inverted. Masks with fewer channels than the
//! target reuse channel 0 for every target channel.

use crate::buffer::SampleBuffer;

/// A named mask attached to a view.
#[derive(Debug, Clone)]
pub struct Mask {
    pub id: String,
    pub buffer: SampleBuffer,
    pub inverted: bool,
}

impl Mask {
    pub fn view(&self) -> MaskView<'_> {
        MaskView {
            buffer: &self.buffer,
            inverted: self.inverted,
        }
    }
}

/// Borrowed mask with its orientation resolved per lookup.
#[derive(Debug, Clone, Copy)]
pub struct MaskView<'a> {
    buffer: &'a SampleBuffer,
    inverted: bool,
}

impl<'a> MaskView<'a> {
    pub fn new(buffer: &'a SampleBuffer, inverted: bool) -> Self {
        Self { buffer, inverted }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Effective weight at a position. Channel 0 is reused when the mask
    /// has fewer channels than the target image.
    #[inline]
    pub fn weight(&self, x: u32, y: u32, channel: u8) -> f32 {
        let m = self.buffer.sample(x, y, channel).clamp(0.0, 1.0);
        if self.inverted {
            1.0 - m
        } else {
            m
        }
    }
}

/// Final mask pass: blend the post-transform buffer against the saved
/// pre-transform copy, per real color channel.
///
/// Point-transform kinds are masked this way uniformly; for the virtual
/// channel modes (Lightness/Saturation/Luminance) this is the only
/// correct place to mask, since their transform touches every real
/// channel at once.
pub fn blend_with_original(
    preview: &mut SampleBuffer,
    original: &SampleBuffer,
    mask: &MaskView<'_>,
) -> Result<(), String> {
    if preview.width() != original.width()
        || preview.height() != original.height()
        || preview.channels() != original.channels()
    {
        return Err(format!(
            "Mask blend shape mismatch: preview {}x{}x{}, original {}x{}x{}",
            preview.width(),
            preview.height(),
            preview.channels(),
            original.width(),
            original.height(),
            original.channels()
        ));
    }
    if mask.width() != preview.width() || mask.height() != preview.height() {
        return Err(format!(
            "Mask size {}x{} does not match target {}x{}",
            mask.width(),
            mask.height(),
            preview.width(),
            preview.height()
        ));
    }

    let channels = preview.channels();
    for y in 0..preview.height() {
        for x in 0..preview.width() {
            for c in 0..channels {
                let w = mask.weight(x, y, c);
                let transformed = preview.sample(x, y, c);
                let orig = original.sample(x, y, c);
                preview.set_sample(x, y, c, (1.0 - w) * orig + w * transformed);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(width: u32, height: u32, channels: u8, value: f32) -> SampleBuffer {
        let len = width as usize * height as usize * channels as usize;
        SampleBuffer::from_data(width, height, channels, vec![value; len]).unwrap()
    }

    #[test]
    fn test_opaque_mask_keeps_transformed() {
        let original = constant(4, 4, 3, 0.2);
        let mut preview = constant(4, 4, 3, 0.8);
        let mask_buf = constant(4, 4, 1, 1.0);
        let mask = MaskView::new(&mask_buf, false);
        blend_with_original(&mut preview, &original, &mask).unwrap();
        assert!(preview.data().iter().all(|&v| (v - 0.8).abs() < 1e-6));
    }

    #[test]
    fn test_zero_mask_restores_original() {
        let original = constant(4, 4, 3, 0.2);
        let mut preview = constant(4, 4, 3, 0.8);
        let mask_buf = constant(4, 4, 1, 0.0);
        let mask = MaskView::new(&mask_buf, false);
        blend_with_original(&mut preview, &original, &mask).unwrap();
        assert!(preview.data().iter().all(|&v| (v - 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_inverted_mask_flips_weight() {
        let original = constant(1, 1, 1, 0.0);
        let mut preview = constant(1, 1, 1, 1.0);
        let mask_buf = constant(1, 1, 1, 0.25);
        let mask = MaskView::new(&mask_buf, true);
        blend_with_original(&mut preview, &original, &mask).unwrap();
        // effective weight 0.75
        assert!((preview.sample(0, 0, 0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_partial_weight_blends_linearly() {
        let original = constant(1, 1, 1, 0.0);
        let mut preview = constant(1, 1, 1, 1.0);
        let mask_buf = constant(1, 1, 1, 0.4);
        let mask = MaskView::new(&mask_buf, false);
        blend_with_original(&mut preview, &original, &mask).unwrap();
        assert!((preview.sample(0, 0, 0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_single_channel_mask_covers_rgb() {
        let original = constant(2, 2, 3, 0.0);
        let mut preview = constant(2, 2, 3, 1.0);
        let mask_buf = constant(2, 2, 1, 0.5);
        let mask = MaskView::new(&mask_buf, false);
        blend_with_original(&mut preview, &original, &mask).unwrap();
        assert!(preview.data().iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let original = constant(2, 2, 3, 0.0);
        let mut preview = constant(2, 2, 3, 1.0);
        let mask_buf = constant(3, 3, 1, 0.5);
        let mask = MaskView::new(&mask_buf, false);
        assert!(blend_with_original(&mut preview, &original, &mask).is_err());
    }
}
