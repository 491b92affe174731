use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{DecodeError, Result};
use crate::summary::MetadataSummary;

/// Label reserved by EDF+ for annotation signals.
pub const ANNOTATION_LABEL: &str = "EDF Annotations";

/// The fixed 256-byte global header of an EDF file.
///
/// Text fields are stored with their space padding removed. `record_count`
/// is kept exactly as declared, so `-1` survives here even when the decoder
/// had to derive the real count from the file size (see
/// [`Recording::record_count`]).
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub version: String,
    pub patient_id: String,
    pub recording_id: String,
    /// `dd.mm.yy`
    pub start_date: String,
    /// `hh.mm.ss`
    pub start_time: String,
    pub header_bytes: usize,
    pub reserved: String,
    pub record_count: i64,
    pub record_duration_seconds: f64,
    pub channel_count: usize,
}

impl FileHeader {
    /// Parses the start date and time fields into a timestamp.
    ///
    /// Two-digit years follow the EDF clipping rule: `85..=99` map to the
    /// 1900s, everything else to the 2000s. Returns `None` when either field
    /// is not a valid date or time; many anonymised files blank them out.
    ///
    /// ```rust
    /// use edfdecode::doctest_utils::{EdfBuilder, SignalSpec};
    ///
    /// let bytes = EdfBuilder::new()
    ///     .start("14.03.24", "09.30.05")
    ///     .signal(SignalSpec::eeg("Fp1", 4))
    ///     .build();
    /// let recording = edfdecode::decode(&bytes)?;
    /// let start = recording.header().start_datetime().unwrap();
    /// assert_eq!(start.to_string(), "2024-03-14 09:30:05");
    /// # Ok::<(), edfdecode::DecodeError>(())
    /// ```
    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        let date = parse_edf_date(&self.start_date)?;
        let time = parse_edf_time_of_day(&self.start_time)?;
        Some(NaiveDateTime::new(date, time))
    }

    /// EDF+ files mark themselves with `EDF+C` or `EDF+D` in the reserved field.
    pub fn is_edf_plus(&self) -> bool {
        self.reserved.starts_with("EDF+C") || self.reserved.starts_with("EDF+D")
    }
}

/// Per-signal header, one per channel in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    pub label: String,
    pub transducer: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefilter: String,
    pub samples_per_record: usize,
    pub reserved: String,
}

impl ChannelDescriptor {
    /// Derives the linear calibration for this channel.
    ///
    /// `channel` is only used to label the error.
    pub fn calibration(&self, channel: usize) -> Result<Calibration> {
        Calibration::new(
            self.physical_min,
            self.physical_max,
            self.digital_min,
            self.digital_max,
        )
        .map_err(|reason| DecodeError::CalibrationError { channel, reason })
    }

    /// Samples per second, given the duration of one data record.
    pub fn sample_rate(&self, record_duration_seconds: f64) -> f64 {
        self.samples_per_record as f64 / record_duration_seconds
    }

    pub fn is_annotation(&self) -> bool {
        self.label == ANNOTATION_LABEL
    }
}

/// Linear digital-to-physical mapping: `physical = digital * gain + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub gain: f64,
    pub offset: f64,
    pub digital_min: i32,
    pub digital_max: i32,
}

impl Calibration {
    /// 由物理/数字范围计算增益和偏移
    pub fn new(
        physical_min: f64,
        physical_max: f64,
        digital_min: i32,
        digital_max: i32,
    ) -> std::result::Result<Self, String> {
        if digital_max <= digital_min {
            return Err(format!(
                "digital maximum {} must exceed digital minimum {}",
                digital_max, digital_min
            ));
        }
        if physical_max == physical_min {
            return Err(format!(
                "physical minimum equals physical maximum ({})",
                physical_min
            ));
        }

        let gain = (physical_max - physical_min) / (digital_max as f64 - digital_min as f64);
        let offset = physical_min - digital_min as f64 * gain;
        if !gain.is_finite() || !offset.is_finite() {
            return Err(format!(
                "physical range {} to {} does not give a finite gain",
                physical_min, physical_max
            ));
        }

        Ok(Calibration {
            gain,
            offset,
            digital_min,
            digital_max,
        })
    }

    pub fn to_physical(&self, digital: i32) -> f64 {
        digital as f64 * self.gain + self.offset
    }

    /// Nearest digital value for `physical`, saturated to the digital range.
    pub fn to_digital(&self, physical: f64) -> i32 {
        let digital = ((physical - self.offset) / self.gain).round();
        digital.clamp(self.digital_min as f64, self.digital_max as f64) as i32
    }

    pub fn clamp(&self, digital: i32) -> i32 {
        digital.clamp(self.digital_min, self.digital_max)
    }
}

/// Raw text carried by an annotation channel in one data record.
///
/// Trailing NUL padding is stripped; the time-stamped annotation lists
/// inside are not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotation {
    pub channel: usize,
    pub record: usize,
    pub text: String,
}

/// A fully decoded EDF file.
///
/// Built once by the decoder and never mutated afterwards. Every channel has
/// exactly `samples_per_record * record_count` physical samples.
#[derive(Debug, Clone)]
pub struct Recording {
    header: FileHeader,
    channels: Vec<ChannelDescriptor>,
    calibrations: Vec<Calibration>,
    record_count: usize,
    samples: Vec<Vec<f64>>,
    annotations: Vec<RawAnnotation>,
}

impl Recording {
    pub(crate) fn new(
        header: FileHeader,
        channels: Vec<ChannelDescriptor>,
        calibrations: Vec<Calibration>,
        record_count: usize,
        samples: Vec<Vec<f64>>,
        annotations: Vec<RawAnnotation>,
    ) -> Self {
        Recording {
            header,
            channels,
            calibrations,
            record_count,
            samples,
            annotations,
        }
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn channels(&self) -> &[ChannelDescriptor] {
        &self.channels
    }

    /// Physical samples of one channel, or `None` if the index is out of range.
    ///
    /// ```rust
    /// use edfdecode::doctest_utils::{EdfBuilder, SignalSpec};
    ///
    /// let bytes = EdfBuilder::new()
    ///     .signal(SignalSpec::eeg("Fp1", 4))
    ///     .record(vec![vec![0, 1, 2, 3]])
    ///     .record(vec![vec![4, 5, 6, 7]])
    ///     .build();
    /// let recording = edfdecode::decode(&bytes)?;
    ///
    /// assert_eq!(recording.samples(0).map(|s| s.len()), Some(8));
    /// assert!(recording.samples(1).is_none());
    /// # Ok::<(), edfdecode::DecodeError>(())
    /// ```
    pub fn samples(&self, channel: usize) -> Option<&[f64]> {
        self.samples.get(channel).map(Vec::as_slice)
    }

    /// Number of data records actually decoded.
    ///
    /// Differs from `header().record_count` only when the header declared
    /// the count as unknown.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn calibration(&self, channel: usize) -> Option<&Calibration> {
        self.calibrations.get(channel)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.record_count as f64 * self.header.record_duration_seconds
    }

    pub fn sample_rate(&self, channel: usize) -> Option<f64> {
        self.channels
            .get(channel)
            .map(|c| c.sample_rate(self.header.record_duration_seconds))
    }

    /// Index of the first channel whose label matches exactly.
    pub fn channel_index(&self, label: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.label == label)
    }

    pub fn samples_by_label(&self, label: &str) -> Option<&[f64]> {
        self.channel_index(label).and_then(|i| self.samples(i))
    }

    pub fn annotations(&self) -> &[RawAnnotation] {
        &self.annotations
    }

    /// Borrowed metadata view suitable for printing.
    pub fn summary(&self) -> MetadataSummary<'_> {
        MetadataSummary::new(&self.header, &self.channels)
    }
}

/// 解析 "dd.mm.yy"
fn parse_edf_date(s: &str) -> Option<NaiveDate> {
    let parts = split_three(s)?;
    let year = if parts[2] > 84 { 1900 + parts[2] } else { 2000 + parts[2] };
    NaiveDate::from_ymd_opt(year as i32, parts[1], parts[0])
}

/// 解析 "hh.mm.ss"
fn parse_edf_time_of_day(s: &str) -> Option<NaiveTime> {
    let parts = split_three(s)?;
    NaiveTime::from_hms_opt(parts[0], parts[1], parts[2])
}

fn split_three(s: &str) -> Option<[u32; 3]> {
    let mut out = [0u32; 3];
    let mut parts = s.trim().split('.');
    for slot in out.iter_mut() {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
