//! Global and per-signal header parsing.
//!
//! An EDF file opens with a 256-byte global header followed by `ns * 256`
//! bytes of signal headers. The signal headers are stored field by field:
//! all labels first, then all transducer types, and so on. Each field is
//! space-padded ASCII.

use crate::error::{DecodeError, Result};
use crate::types::{ChannelDescriptor, FileHeader};
use crate::utils::{field_text, parse_float_field, parse_int_field, FieldReader};
use crate::{HEADER_BLOCK_SIZE, MAX_CHANNELS};

/// Parses both header sections with the default channel limit.
///
/// ```rust
/// use edfdecode::doctest_utils::{EdfBuilder, SignalSpec};
///
/// let bytes = EdfBuilder::new()
///     .signal(SignalSpec::eeg("Fp1", 256))
///     .signal(SignalSpec::eeg("Fp2", 256))
///     .build();
///
/// let (header, channels) = edfdecode::header::parse_header(&bytes)?;
/// assert_eq!(header.channel_count, 2);
/// assert_eq!(header.header_bytes, 768);
/// assert_eq!(channels[1].label, "Fp2");
/// # Ok::<(), edfdecode::DecodeError>(())
/// ```
pub fn parse_header(bytes: &[u8]) -> Result<(FileHeader, Vec<ChannelDescriptor>)> {
    parse_header_with_limit(bytes, MAX_CHANNELS)
}

/// Parses both header sections, rejecting more than `max_channels` signals.
pub fn parse_header_with_limit(
    bytes: &[u8],
    max_channels: usize,
) -> Result<(FileHeader, Vec<ChannelDescriptor>)> {
    let header = parse_global_header(bytes, max_channels)?;

    let signal_block = &bytes[HEADER_BLOCK_SIZE..header.header_bytes];
    let channels = parse_signal_headers(signal_block, header.channel_count)?;

    Ok((header, channels))
}

/// 解析主头部（256字节）
fn parse_global_header(bytes: &[u8], max_channels: usize) -> Result<FileHeader> {
    let main = bytes.get(..HEADER_BLOCK_SIZE).ok_or(DecodeError::UnexpectedEof {
        context: "global header",
        needed: HEADER_BLOCK_SIZE,
        available: bytes.len(),
    })?;
    let mut reader = FieldReader::new(main, "global header");

    let version = reader.text(8)?;
    let patient_id = reader.text(80)?;
    let recording_id = reader.text(80)?;
    let start_date = reader.text(8)?;
    let start_time = reader.text(8)?;
    let header_bytes_raw = reader.take(8)?;
    let reserved = reader.text(44)?;
    let record_count_raw = reader.take(8)?;
    let duration_raw = reader.take(8)?;
    let channel_count_raw = reader.take(4)?;

    // 信号数先行校验，其余字段都依赖它
    let declared_channels: i64 = parse_int_field(channel_count_raw, "number of signals", None)?;
    if declared_channels < 0 || declared_channels as u64 > max_channels as u64 {
        return Err(DecodeError::malformed(
            "number of signals",
            None,
            &field_text(channel_count_raw),
        ));
    }
    let channel_count = declared_channels as usize;

    let expected_header_bytes = HEADER_BLOCK_SIZE * (channel_count + 1);
    if bytes.len() < expected_header_bytes {
        return Err(DecodeError::UnexpectedEof {
            context: "signal headers",
            needed: expected_header_bytes,
            available: bytes.len(),
        });
    }

    let header_bytes: i64 = parse_int_field(header_bytes_raw, "header size", None)?;
    if header_bytes != expected_header_bytes as i64 {
        return Err(DecodeError::malformed(
            "header size",
            None,
            &field_text(header_bytes_raw),
        ));
    }

    let record_count: i64 = parse_int_field(record_count_raw, "number of data records", None)?;

    let record_duration_seconds = parse_float_field(duration_raw, "data record duration", None)?;
    if record_duration_seconds <= 0.0 {
        return Err(DecodeError::malformed(
            "data record duration",
            None,
            &field_text(duration_raw),
        ));
    }

    Ok(FileHeader {
        version,
        patient_id,
        recording_id,
        start_date,
        start_time,
        header_bytes: expected_header_bytes,
        reserved,
        record_count,
        record_duration_seconds,
        channel_count,
    })
}

/// 解析信号头部：每个字段按列连续存放
fn parse_signal_headers(block: &[u8], count: usize) -> Result<Vec<ChannelDescriptor>> {
    let mut reader = FieldReader::new(block, "signal headers");

    let labels = reader.column(count, 16)?;
    let transducers = reader.column(count, 80)?;
    let dimensions = reader.column(count, 8)?;
    let physical_mins = reader.column(count, 8)?;
    let physical_maxs = reader.column(count, 8)?;
    let digital_mins = reader.column(count, 8)?;
    let digital_maxs = reader.column(count, 8)?;
    let prefilters = reader.column(count, 80)?;
    let samples = reader.column(count, 8)?;
    let reserved = reader.column(count, 32)?;

    let mut channels = Vec::with_capacity(count);
    for i in 0..count {
        let ch = Some(i);

        let samples_per_record: i64 = parse_int_field(samples[i], "samples per record", ch)?;
        if samples_per_record < 0 {
            return Err(DecodeError::malformed(
                "samples per record",
                ch,
                &field_text(samples[i]),
            ));
        }

        let descriptor = ChannelDescriptor {
            label: field_text(labels[i]),
            transducer: field_text(transducers[i]),
            physical_dimension: field_text(dimensions[i]),
            physical_min: parse_float_field(physical_mins[i], "physical minimum", ch)?,
            physical_max: parse_float_field(physical_maxs[i], "physical maximum", ch)?,
            digital_min: parse_int_field(digital_mins[i], "digital minimum", ch)?,
            digital_max: parse_int_field(digital_maxs[i], "digital maximum", ch)?,
            prefilter: field_text(prefilters[i]),
            samples_per_record: samples_per_record as usize,
            reserved: field_text(reserved[i]),
        };

        // 提前发现无法定标的通道
        descriptor.calibration(i)?;

        channels.push(descriptor);
    }

    Ok(channels)
}
