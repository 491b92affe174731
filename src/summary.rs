use std::fmt;

use crate::types::{ChannelDescriptor, FileHeader};

/// Human-readable view of a file's metadata.
///
/// Formatting only; writing the text anywhere is up to the caller.
///
/// ```rust
/// use edfdecode::doctest_utils::{EdfBuilder, SignalSpec};
///
/// let bytes = EdfBuilder::new()
///     .signal(SignalSpec::eeg("Fp1", 256))
///     .signal(SignalSpec::eeg("Fp2", 256))
///     .build();
/// let recording = edfdecode::decode(&bytes)?;
///
/// let text = recording.summary().to_string();
/// assert!(text.contains("Number of Channels: 2"));
/// assert!(text.contains("Sample Rate: 256 Hz"));
/// assert!(text.contains("Channels: Fp1 Fp2"));
/// # Ok::<(), edfdecode::DecodeError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MetadataSummary<'a> {
    header: &'a FileHeader,
    channels: &'a [ChannelDescriptor],
}

impl<'a> MetadataSummary<'a> {
    pub fn new(header: &'a FileHeader, channels: &'a [ChannelDescriptor]) -> Self {
        MetadataSummary { header, channels }
    }
}

impl fmt::Display for MetadataSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration = self.header.record_duration_seconds;

        writeln!(f, "=== EDF File Metadata ===")?;
        writeln!(f, "Number of Channels: {}", self.channels.len())?;
        // 第一个通道的采样率作为文件采样率
        match self.channels.first() {
            Some(first) => writeln!(f, "Sample Rate: {} Hz", first.sample_rate(duration))?,
            None => writeln!(f, "Sample Rate: n/a")?,
        }

        let labels: Vec<&str> = self.channels.iter().map(|c| c.label.as_str()).collect();
        writeln!(f, "Channels: {}", labels.join(" "))?;

        if !self.header.start_date.is_empty() || !self.header.start_time.is_empty() {
            writeln!(f, "Start: {} {}", self.header.start_date, self.header.start_time)?;
        }
        if self.header.record_count >= 0 {
            writeln!(
                f,
                "Data Records: {} x {}s",
                self.header.record_count, duration
            )?;
        } else {
            writeln!(f, "Data Records: unknown x {}s", duration)?;
        }

        for (i, channel) in self.channels.iter().enumerate() {
            writeln!(
                f,
                "  [{}] {} ({}): {} to {} {}, {} Hz",
                i,
                channel.label,
                if channel.transducer.is_empty() { "-" } else { channel.transducer.as_str() },
                channel.physical_min,
                channel.physical_max,
                channel.physical_dimension,
                channel.sample_rate(duration)
            )?;
        }
        Ok(())
    }
}
