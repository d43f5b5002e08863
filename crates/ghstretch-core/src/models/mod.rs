//! Parameter model for the stretch pipeline.

mod defaults;
mod enums;
mod params;
mod signature;
mod validation;


pub use enums::{ChannelMode, OverflowPolicy, StretchKind};
pub use params::StretchParameters;
pub use signature::{ChangeDetector, MaskSignature, PreviewSignature, StretchSignature};
pub use validation::validate_parameters;
