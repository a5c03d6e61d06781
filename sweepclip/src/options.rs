//! Knobs for the clipper.

use serde::{Deserialize, Serialize};

/// What to do with chains of result edges that didn't close up into contours.
///
/// With valid inputs every chain closes. Open chains are a sign of numerical
/// trouble (for example, an intersection point that wasn't snapped to the
/// vertex it should have been), and they carry no area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeftoverChains {
    /// Silently leave them out of the result.
    #[default]
    Drop,
    /// Leave them out of the result, and log a warning.
    Warn,
    /// Fail with [`Error::OpenChains`](crate::Error::OpenChains).
    Error,
}

/// Options for [`Clipper`](crate::Clipper).
///
/// ```
/// use sweepclip::{ClipOptions, LeftoverChains};
///
/// let strict = ClipOptions {
///     leftover_chains: LeftoverChains::Error,
/// };
/// assert_ne!(strict, ClipOptions::default());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipOptions {
    pub leftover_chains: LeftoverChains,
}
