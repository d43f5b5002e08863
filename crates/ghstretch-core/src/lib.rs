//! GHStretch Core Library
//!
//! Parametric brightness-stretch transforms with a masked, channel-aware
//! preview pipeline: the generalised hyperbolic stretch family, channel
//! compositing, mask blending, change-detection caching, viewport mapping
//! and readout/histogram statistics.

pub mod buffer;
pub mod color;
pub mod compositor;
pub mod config;
pub mod geometry;
pub mod histogram;
pub mod mask;
pub mod models;
pub mod presets;
pub mod preview;
pub mod readout;
pub mod transform;
pub mod viewport;

// Re-export commonly used types
pub use buffer::{RegionStats, SampleBuffer};
pub use geometry::Rect;
pub use histogram::{ChannelHistogram, ClipAggregator, HistogramAnalyzer, HistogramChannel};
pub use mask::{Mask, MaskView};
pub use models::{
    validate_parameters, ChangeDetector, ChannelMode, OverflowPolicy, PreviewSignature,
    StretchKind, StretchParameters,
};
pub use preview::{PreviewContext, PreviewOrchestrator, PreviewOutcome, PreviewPhase, TargetImage};
pub use readout::{ReadoutSampler, ReadoutStats};
pub use transform::TransformEngine;
pub use viewport::ViewportMapper;
