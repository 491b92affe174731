// Internal utilities for documentation and integration tests
// This file assembles synthetic EDF byte streams; it is not a general writer

use crate::types::Calibration;

/// Signal header values for [`EdfBuilder`].
#[derive(Debug, Clone)]
pub struct SignalSpec {
    pub label: String,
    pub transducer: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefilter: String,
    pub samples_per_record: usize,
}

impl SignalSpec {
    pub fn new(
        label: &str,
        physical_min: f64,
        physical_max: f64,
        digital_min: i32,
        digital_max: i32,
        samples_per_record: usize,
    ) -> Self {
        SignalSpec {
            label: label.to_string(),
            transducer: String::new(),
            physical_dimension: "uV".to_string(),
            physical_min,
            physical_max,
            digital_min,
            digital_max,
            prefilter: String::new(),
            samples_per_record,
        }
    }

    /// ±100 µV over the full 16-bit range.
    pub fn eeg(label: &str, samples_per_record: usize) -> Self {
        SignalSpec::new(label, -100.0, 100.0, -32768, 32767, samples_per_record)
    }

    /// An EDF+ annotation signal carrying `samples_per_record * 2` bytes of text.
    pub fn annotations(samples_per_record: usize) -> Self {
        let mut spec = SignalSpec::new(
            crate::types::ANNOTATION_LABEL,
            -1.0,
            1.0,
            -32768,
            32767,
            samples_per_record,
        );
        spec.physical_dimension = String::new();
        spec
    }

    pub fn calibration(&self) -> Calibration {
        Calibration::new(
            self.physical_min,
            self.physical_max,
            self.digital_min,
            self.digital_max,
        )
        .expect("test signal must have a valid calibration")
    }
}

/// Assembles an EDF file in memory.
///
/// The declared record count defaults to the number of records added; use
/// [`EdfBuilder::declared_record_count`] to write something else (e.g. `-1`).
#[derive(Debug, Clone)]
pub struct EdfBuilder {
    patient: String,
    recording: String,
    start_date: String,
    start_time: String,
    reserved: String,
    record_duration: f64,
    declared_record_count: Option<i64>,
    signals: Vec<SignalSpec>,
    records: Vec<Vec<Vec<i16>>>,
}

impl Default for EdfBuilder {
    fn default() -> Self {
        EdfBuilder::new()
    }
}

impl EdfBuilder {
    pub fn new() -> Self {
        EdfBuilder {
            patient: "X X X X".to_string(),
            recording: "Startdate X X X X".to_string(),
            start_date: "01.01.24".to_string(),
            start_time: "00.00.00".to_string(),
            reserved: String::new(),
            record_duration: 1.0,
            declared_record_count: None,
            signals: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn patient(mut self, patient: &str) -> Self {
        self.patient = patient.to_string();
        self
    }

    pub fn recording(mut self, recording: &str) -> Self {
        self.recording = recording.to_string();
        self
    }

    pub fn start(mut self, date: &str, time: &str) -> Self {
        self.start_date = date.to_string();
        self.start_time = time.to_string();
        self
    }

    pub fn reserved(mut self, reserved: &str) -> Self {
        self.reserved = reserved.to_string();
        self
    }

    pub fn record_duration(mut self, seconds: f64) -> Self {
        self.record_duration = seconds;
        self
    }

    pub fn declared_record_count(mut self, count: i64) -> Self {
        self.declared_record_count = Some(count);
        self
    }

    pub fn signal(mut self, spec: SignalSpec) -> Self {
        self.signals.push(spec);
        self
    }

    /// Appends one data record of digital samples, one `Vec` per signal.
    pub fn record(mut self, samples: Vec<Vec<i16>>) -> Self {
        self.records.push(samples);
        self
    }

    /// Appends one data record of physical values, quantised with each
    /// signal's calibration.
    pub fn physical_record(self, values: &[Vec<f64>]) -> Self {
        let digital = self
            .signals
            .iter()
            .zip(values)
            .map(|(spec, channel)| {
                let cal = spec.calibration();
                channel.iter().map(|&v| cal.to_digital(v) as i16).collect()
            })
            .collect();
        self.record(digital)
    }

    pub fn build(&self) -> Vec<u8> {
        let ns = self.signals.len();
        let header_bytes = 256 * (ns + 1);
        let mut out = vec![b' '; header_bytes];

        write_field(&mut out, 0, 8, "0");
        write_field(&mut out, 8, 80, &self.patient);
        write_field(&mut out, 88, 80, &self.recording);
        write_field(&mut out, 168, 8, &self.start_date);
        write_field(&mut out, 176, 8, &self.start_time);
        write_field(&mut out, 184, 8, &header_bytes.to_string());
        write_field(&mut out, 192, 44, &self.reserved);
        let declared = self
            .declared_record_count
            .unwrap_or(self.records.len() as i64);
        write_field(&mut out, 236, 8, &declared.to_string());
        write_field(&mut out, 244, 8, &fit_number(self.record_duration, 8));
        write_field(&mut out, 252, 4, &ns.to_string());

        // 按照字段顺序写入，每个字段所有信号一起写
        let mut pos = 256;
        let mut column = |width: usize, values: Vec<String>| {
            for value in values {
                write_field(&mut out, pos, width, &value);
                pos += width;
            }
        };
        let s = &self.signals;
        column(16, s.iter().map(|x| x.label.clone()).collect());
        column(80, s.iter().map(|x| x.transducer.clone()).collect());
        column(8, s.iter().map(|x| x.physical_dimension.clone()).collect());
        column(8, s.iter().map(|x| fit_number(x.physical_min, 8)).collect());
        column(8, s.iter().map(|x| fit_number(x.physical_max, 8)).collect());
        column(8, s.iter().map(|x| x.digital_min.to_string()).collect());
        column(8, s.iter().map(|x| x.digital_max.to_string()).collect());
        column(80, s.iter().map(|x| x.prefilter.clone()).collect());
        column(8, s.iter().map(|x| x.samples_per_record.to_string()).collect());
        column(32, s.iter().map(|_| String::new()).collect());

        for record in &self.records {
            for (spec, samples) in self.signals.iter().zip(record) {
                assert_eq!(
                    samples.len(),
                    spec.samples_per_record,
                    "record for {} has the wrong sample count",
                    spec.label
                );
                for sample in samples {
                    out.extend_from_slice(&sample.to_le_bytes());
                }
            }
        }

        out
    }
}

/// Overwrites `width` bytes at `offset` with `text`, space padded.
pub fn write_field(buf: &mut [u8], offset: usize, width: usize, text: &str) {
    let field = &mut buf[offset..offset + width];
    field.fill(b' ');
    let bytes = text.as_bytes();
    let len = bytes.len().min(width);
    field[..len].copy_from_slice(&bytes[..len]);
}

/// Packs text into 16-bit samples the way annotation signals store it.
pub fn text_samples(text: &str, samples_per_record: usize) -> Vec<i16> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(samples_per_record * 2, 0);
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Formats `value` in at most `width` characters, dropping decimals first.
fn fit_number(value: f64, width: usize) -> String {
    let plain = value.to_string();
    if plain.len() <= width {
        return plain;
    }
    (0..width)
        .rev()
        .map(|precision| format!("{:.*}", precision, value))
        .find(|s| s.len() <= width)
        .unwrap_or(plain)
}
