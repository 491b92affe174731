use crate::MAX_CHANNELS;

/// Knobs for [`EdfDecoder`](crate::EdfDecoder).
///
/// ```rust
/// use edfdecode::{DecodeOptions, EdfDecoder};
///
/// let decoder = EdfDecoder::new(
///     DecodeOptions::default()
///         .with_max_channels(256)
///         .with_clamp_digital(false),
/// );
/// assert_eq!(decoder.options().max_channels, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Headers declaring more signals than this are treated as corrupt.
    pub max_channels: usize,
    /// Saturate digital samples to each channel's digital range before
    /// rescaling.
    pub clamp_digital: bool,
    /// Decode records on the rayon thread pool. Only honoured when the
    /// `parallel` feature is enabled; output is identical either way.
    pub parallel: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_channels: MAX_CHANNELS,
            clamp_digital: true,
            parallel: false,
        }
    }
}

impl DecodeOptions {
    pub fn with_max_channels(mut self, max_channels: usize) -> Self {
        self.max_channels = max_channels;
        self
    }

    pub fn with_clamp_digital(mut self, clamp_digital: bool) -> Self {
        self.clamp_digital = clamp_digital;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
