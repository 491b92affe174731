use crate::error::{DecodeError, Result};
use crate::types::{Calibration, ChannelDescriptor, FileHeader};
use crate::BYTES_PER_SAMPLE;

/// Where one channel's samples sit inside a data record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelLayout {
    /// 信号在数据记录中的字节偏移
    pub offset: usize,
    pub samples_per_record: usize,
    pub calibration: Calibration,
}

impl ChannelLayout {
    pub fn byte_len(&self) -> usize {
        self.samples_per_record * BYTES_PER_SAMPLE
    }
}

/// Byte layout of every data record in a file.
///
/// All records share the same layout, so this is computed once from the
/// headers and reused for each record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLayout {
    pub channels: Vec<ChannelLayout>,
    /// 每个数据记录的大小（字节）
    pub record_size: usize,
    /// Records to decode; derived from the file size when the header
    /// declared the count as unknown.
    pub record_count: usize,
    /// First byte of the data section.
    pub data_offset: usize,
}

impl RecordLayout {
    /// Total bytes the data section must hold.
    ///
    /// `None` when the product overflows, which no real source can satisfy.
    pub fn data_len(&self) -> Option<usize> {
        self.record_count.checked_mul(self.record_size)
    }
}

/// Computes channel offsets, the record size, and the effective record count.
///
/// `total_bytes` is the length of the whole source including the headers.
/// When `header.record_count` is negative the count becomes
/// `(total_bytes - header_bytes) / record_size`; leftover bytes are ignored.
///
/// ```rust
/// use edfdecode::doctest_utils::{EdfBuilder, SignalSpec};
/// use edfdecode::header::parse_header;
/// use edfdecode::layout::plan_layout;
///
/// let bytes = EdfBuilder::new()
///     .signal(SignalSpec::eeg("Fp1", 3))
///     .signal(SignalSpec::eeg("Fp2", 5))
///     .build();
/// let (header, channels) = parse_header(&bytes)?;
/// let layout = plan_layout(&header, &channels, bytes.len())?;
///
/// assert_eq!(layout.channels[1].offset, 6);
/// assert_eq!(layout.record_size, 16);
/// # Ok::<(), edfdecode::DecodeError>(())
/// ```
pub fn plan_layout(
    header: &FileHeader,
    descriptors: &[ChannelDescriptor],
    total_bytes: usize,
) -> Result<RecordLayout> {
    let mut channels = Vec::with_capacity(descriptors.len());
    let mut offset = 0usize;

    for (i, descriptor) in descriptors.iter().enumerate() {
        let calibration = descriptor.calibration(i)?;
        let channel = ChannelLayout {
            offset,
            samples_per_record: descriptor.samples_per_record,
            calibration,
        };
        offset = channel
            .samples_per_record
            .checked_mul(BYTES_PER_SAMPLE)
            .and_then(|len| offset.checked_add(len))
            .ok_or_else(|| DecodeError::LayoutError(format!("record size overflows at channel {}", i)))?;
        channels.push(channel);
    }

    let record_size = offset;
    if record_size == 0 {
        return Err(DecodeError::LayoutError(
            "no channel carries samples, data records are empty".to_string(),
        ));
    }

    let record_count = if header.record_count < 0 {
        total_bytes.saturating_sub(header.header_bytes) / record_size
    } else {
        usize::try_from(header.record_count).map_err(|_| {
            DecodeError::malformed(
                "number of data records",
                None,
                &header.record_count.to_string(),
            )
        })?
    };

    Ok(RecordLayout {
        channels,
        record_size,
        record_count,
        data_offset: header.header_bytes,
    })
}
