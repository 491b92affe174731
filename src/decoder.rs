use std::path::Path;

use log::{debug, trace};

use crate::error::{DecodeError, ErrorKind, Result};
use crate::header::parse_header_with_limit;
use crate::layout::{plan_layout, RecordLayout};
use crate::options::DecodeOptions;
use crate::samples::SampleDecoder;
use crate::types::{ChannelDescriptor, RawAnnotation, Recording};

/// Progress of a single decode call.
///
/// `Failed` is terminal and reachable from every other state; `Done` is
/// only reached once every record has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    Start,
    HeaderParsed,
    RecordsDecoding,
    Done,
    Failed(ErrorKind),
}

/// EDF decoder: headers, then record layout, then every data record.
///
/// Decoding is all-or-nothing. Any failure discards the partially filled
/// sample buffers and returns the error; no partial [`Recording`] is ever
/// produced. The decoder holds no state between calls, so one instance can
/// be shared freely.
///
/// # Examples
///
/// ```rust
/// use edfdecode::doctest_utils::{EdfBuilder, SignalSpec};
/// use edfdecode::EdfDecoder;
///
/// let bytes = EdfBuilder::new()
///     .signal(SignalSpec::eeg("Fp1", 2))
///     .signal(SignalSpec::eeg("Fp2", 2))
///     .record(vec![vec![0, 100], vec![-100, 0]])
///     .record(vec![vec![200, 300], vec![-200, -300]])
///     .build();
///
/// let recording = EdfDecoder::default().decode(&bytes)?;
/// assert_eq!(recording.record_count(), 2);
/// assert_eq!(recording.channels()[1].label, "Fp2");
/// assert_eq!(recording.samples(1).unwrap().len(), 4);
/// # Ok::<(), edfdecode::DecodeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdfDecoder {
    options: DecodeOptions,
}

impl EdfDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        EdfDecoder { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes a complete EDF byte stream held in memory.
    ///
    /// # Errors
    ///
    /// * `UnexpectedEof` - the headers are cut short
    /// * `MalformedField` - a numeric header field does not parse or is out of range
    /// * `CalibrationError` - a channel's digital or physical range is degenerate
    /// * `LayoutError` - no channel carries samples
    /// * `TruncatedRecord` - the data section is shorter than the record count implies
    pub fn decode(&self, bytes: &[u8]) -> Result<Recording> {
        DecodeSession::new(bytes, &self.options).run()
    }

    /// Reads a file in one go and decodes it.
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<Recording> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!("read {} bytes from {}", bytes.len(), path.display());
        self.decode(&bytes)
    }
}

struct DecodeSession<'a> {
    bytes: &'a [u8],
    options: &'a DecodeOptions,
    state: DecodeState,
}

impl<'a> DecodeSession<'a> {
    fn new(bytes: &'a [u8], options: &'a DecodeOptions) -> Self {
        DecodeSession {
            bytes,
            options,
            state: DecodeState::Start,
        }
    }

    fn run(&mut self) -> Result<Recording> {
        let result = self.advance();
        match &result {
            Ok(_) => self.transition(DecodeState::Done),
            Err(e) => self.transition(DecodeState::Failed(e.kind())),
        }
        result
    }

    fn advance(&mut self) -> Result<Recording> {
        let (header, channels) = parse_header_with_limit(self.bytes, self.options.max_channels)?;
        self.transition(DecodeState::HeaderParsed);
        debug!(
            "header: {} signals, {} records declared, {}s per record",
            header.channel_count, header.record_count, header.record_duration_seconds
        );

        let layout = plan_layout(&header, &channels, self.bytes.len())?;
        self.transition(DecodeState::RecordsDecoding);
        debug!(
            "layout: {} bytes per record, {} records from offset {}",
            layout.record_size, layout.record_count, layout.data_offset
        );

        let data = &self.bytes[layout.data_offset.min(self.bytes.len())..];
        let samples = decode_records(data, &layout, self.options)?;
        let annotations = collect_annotations(data, &channels, &layout);
        trace!(
            "decoded {} records, {} annotation blocks",
            layout.record_count,
            annotations.len()
        );

        let calibrations = layout.channels.iter().map(|c| c.calibration).collect();
        Ok(Recording::new(
            header,
            channels,
            calibrations,
            layout.record_count,
            samples,
            annotations,
        ))
    }

    fn transition(&mut self, next: DecodeState) {
        debug!("decode state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// 按记录解码所有样本，写入预先分配好的通道缓冲区
fn decode_records(
    data: &[u8],
    layout: &RecordLayout,
    options: &DecodeOptions,
) -> Result<Vec<Vec<f64>>> {
    // 先确认数据区足够，避免为损坏的记录数分配巨量内存
    match layout.data_len() {
        Some(needed) if needed <= data.len() => {}
        _ => {
            return Err(DecodeError::TruncatedRecord {
                record: Some(data.len() / layout.record_size),
                expected: layout.record_size,
                actual: data.len() % layout.record_size,
            })
        }
    }

    let mut buffers: Vec<Vec<f64>> = layout
        .channels
        .iter()
        .map(|c| vec![0.0; c.samples_per_record * layout.record_count])
        .collect();

    let jobs = carve_records(&mut buffers, layout);
    run_jobs(jobs, data, layout, SampleDecoder::new(options.clamp_digital), options.parallel)?;

    Ok(buffers)
}

/// Splits every channel buffer into per-record windows.
///
/// `jobs[r][ch]` is the slice that record `r` fills for channel `ch`. The
/// windows are disjoint, so records can be decoded in any order.
fn carve_records<'b>(buffers: &'b mut [Vec<f64>], layout: &RecordLayout) -> Vec<Vec<&'b mut [f64]>> {
    let mut jobs: Vec<Vec<&'b mut [f64]>> = (0..layout.record_count)
        .map(|_| Vec::with_capacity(layout.channels.len()))
        .collect();

    for (buffer, channel) in buffers.iter_mut().zip(&layout.channels) {
        if channel.samples_per_record == 0 {
            for job in jobs.iter_mut() {
                job.push(Default::default());
            }
        } else {
            for (job, window) in jobs.iter_mut().zip(buffer.chunks_mut(channel.samples_per_record)) {
                job.push(window);
            }
        }
    }

    jobs
}

fn record_bytes<'d>(data: &'d [u8], layout: &RecordLayout, index: usize) -> &'d [u8] {
    let start = (index * layout.record_size).min(data.len());
    let end = (start + layout.record_size).min(data.len());
    &data[start..end]
}

#[cfg(feature = "parallel")]
fn run_jobs(
    jobs: Vec<Vec<&mut [f64]>>,
    data: &[u8],
    layout: &RecordLayout,
    decoder: SampleDecoder,
    parallel: bool,
) -> Result<()> {
    use rayon::prelude::*;

    if !parallel {
        return run_jobs_serial(jobs, data, layout, decoder);
    }

    jobs.into_par_iter()
        .enumerate()
        .try_for_each(|(index, mut outputs)| {
            decoder
                .decode_record_into(record_bytes(data, layout, index), layout, &mut outputs)
                .map_err(|e| e.at_record(index))
        })
}

#[cfg(not(feature = "parallel"))]
fn run_jobs(
    jobs: Vec<Vec<&mut [f64]>>,
    data: &[u8],
    layout: &RecordLayout,
    decoder: SampleDecoder,
    parallel: bool,
) -> Result<()> {
    if parallel {
        log::warn!("parallel decoding requested but the `parallel` feature is disabled");
    }
    run_jobs_serial(jobs, data, layout, decoder)
}

fn run_jobs_serial(
    jobs: Vec<Vec<&mut [f64]>>,
    data: &[u8],
    layout: &RecordLayout,
    decoder: SampleDecoder,
) -> Result<()> {
    for (index, mut outputs) in jobs.into_iter().enumerate() {
        decoder
            .decode_record_into(record_bytes(data, layout, index), layout, &mut outputs)
            .map_err(|e| e.at_record(index))?;
    }
    Ok(())
}

/// 注释通道的原始文本（不解析 TAL）
fn collect_annotations(
    data: &[u8],
    channels: &[ChannelDescriptor],
    layout: &RecordLayout,
) -> Vec<RawAnnotation> {
    let annotation_channels: Vec<usize> = channels
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_annotation())
        .map(|(i, _)| i)
        .collect();
    if annotation_channels.is_empty() {
        return Vec::new();
    }

    let mut annotations = Vec::new();
    for record in 0..layout.record_count {
        let raw_record = record_bytes(data, layout, record);
        for &channel in &annotation_channels {
            let slot = &layout.channels[channel];
            let raw = &raw_record[slot.offset..slot.offset + slot.byte_len()];
            let text = String::from_utf8_lossy(raw).trim_end_matches('\0').to_string();
            if !text.is_empty() {
                annotations.push(RawAnnotation {
                    channel,
                    record,
                    text,
                });
            }
        }
    }
    annotations
}
