//! # EDF decoder for Rust
//!
//! A pure Rust decoder for EDF (European Data Format) files, the container
//! most EEG and polysomnography equipment exports. The whole file is decoded
//! in one call into a [`Recording`]: the global header, one
//! [`ChannelDescriptor`] per signal, and every channel's samples converted
//! to physical units.
//!
//! ## Quick Start
//!
//! ```rust
//! use edfdecode::doctest_utils::{EdfBuilder, SignalSpec};
//!
//! # fn main() -> edfdecode::Result<()> {
//! # let bytes = EdfBuilder::new()
//! #     .signal(SignalSpec::eeg("Fp1", 4))
//! #     .signal(SignalSpec::eeg("Fp2", 4))
//! #     .physical_record(&[vec![10.0, 20.0, 30.0, 40.0], vec![-10.0, -20.0, -30.0, -40.0]])
//! #     .build();
//! let recording = edfdecode::decode(&bytes)?;
//!
//! for (i, channel) in recording.channels().iter().enumerate() {
//!     let samples = recording.samples(i).unwrap_or(&[]);
//!     println!("{}: {} samples in {}", channel.label, samples.len(), channel.physical_dimension);
//! }
//!
//! let fp1 = recording.samples_by_label("Fp1").unwrap();
//! assert!((fp1[0] - 10.0).abs() < 0.01);
//! # Ok(())
//! # }
//! ```
//!
//! ## Physical vs Digital Values
//!
//! EDF stores 16-bit integers. Each channel declares a digital and a
//! physical range, which define a linear mapping:
//!
//! ```text
//! gain     = (physical_max - physical_min) / (digital_max - digital_min)
//! offset   = physical_min - digital_min * gain
//! physical = digital * gain + offset
//! ```
//!
//! ```rust
//! use edfdecode::Calibration;
//!
//! let cal = Calibration::new(-100.0, 100.0, -32768, 32767).unwrap();
//! assert!((cal.to_physical(32767) - 100.0).abs() < 1e-9);
//! assert!((cal.to_physical(-32768) + 100.0).abs() < 1e-9);
//! ```
//!
//! ## Errors
//!
//! Decoding is all-or-nothing: a truncated or malformed file yields a
//! [`DecodeError`] and no partial data. See [`ErrorKind`] for the taxonomy.
//!
//! ## Logging
//!
//! The decoder reports stage transitions through the [`log`] facade at
//! `debug` level. It never installs a logger.
//!
//! ## Features
//!
//! * `parallel` - decode data records on the rayon thread pool when
//!   [`DecodeOptions::parallel`] is set.

pub mod decoder;
pub mod error;
pub mod header;
pub mod layout;
pub mod options;
pub mod samples;
pub mod summary;
pub mod types;
mod utils;

#[doc(hidden)]
pub mod doctest_utils; // For doctest and integration test fixtures

use std::path::Path;

// Re-export main types for convenience
pub use decoder::{DecodeState, EdfDecoder};
pub use error::{DecodeError, ErrorKind, Result};
pub use layout::{ChannelLayout, RecordLayout};
pub use options::DecodeOptions;
pub use samples::SampleDecoder;
pub use summary::MetadataSummary;
pub use types::{Calibration, ChannelDescriptor, FileHeader, RawAnnotation, Recording};

// Important constants
pub const HEADER_BLOCK_SIZE: usize = 256;
pub const BYTES_PER_SAMPLE: usize = 2;
pub const MAX_CHANNELS: usize = 10_000;

/// Decodes an in-memory EDF file with default options.
pub fn decode(bytes: &[u8]) -> Result<Recording> {
    EdfDecoder::default().decode(bytes)
}

/// Reads and decodes an EDF file with default options.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Recording> {
    EdfDecoder::default().decode_file(path)
}

/// Library version
///
/// ```rust
/// let version = edfdecode::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
