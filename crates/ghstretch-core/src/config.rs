//! Global runtime configuration.
//!
//! Provides the global verbose flag used by the `verbose_println!` macro
//! and the fixed resolutions shared across the histogram and signature
//! modules.

use std::sync::atomic::{AtomicBool, Ordering};

// Global verbose flag for controlling debug output
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set the global verbose flag. When true, debug messages will be printed.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

/// Check if verbose mode is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Print a message to stderr only if verbose mode is enabled.
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if $crate::config::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Number of histogram bins over the normalized [0, 1] sample range.
pub const HISTOGRAM_RESOLUTION: usize = 65536;

/// Decimal places retained when quantizing parameters into a cache
/// signature. Matches the display precision of the numeric fields so the
/// cache does not thrash on insignificant float noise.
pub const SIGNATURE_DECIMALS: u32 = 6;

/// Sample count above which per-pixel loops switch to rayon.
pub const PARALLEL_THRESHOLD: usize = 100_000;
