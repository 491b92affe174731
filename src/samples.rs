use crate::error::{DecodeError, Result};
use crate::layout::RecordLayout;

/// Turns the raw bytes of one data record into physical values.
///
/// Samples are little-endian `i16`. With `clamp_digital` set, values outside
/// a channel's `[digital_min, digital_max]` are saturated before rescaling,
/// as edflib does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleDecoder {
    pub clamp_digital: bool,
}

impl Default for SampleDecoder {
    fn default() -> Self {
        SampleDecoder {
            clamp_digital: true,
        }
    }
}

impl SampleDecoder {
    pub fn new(clamp_digital: bool) -> Self {
        SampleDecoder { clamp_digital }
    }

    /// Decodes one record into a fresh buffer per channel.
    ///
    /// ```rust
    /// use edfdecode::doctest_utils::{EdfBuilder, SignalSpec};
    /// use edfdecode::header::parse_header;
    /// use edfdecode::layout::plan_layout;
    /// use edfdecode::samples::SampleDecoder;
    ///
    /// let bytes = EdfBuilder::new()
    ///     .signal(SignalSpec::new("Ramp", -10.0, 10.0, -10, 10, 3))
    ///     .record(vec![vec![-10, 0, 10]])
    ///     .build();
    /// let (header, channels) = parse_header(&bytes)?;
    /// let layout = plan_layout(&header, &channels, bytes.len())?;
    ///
    /// let record = &bytes[layout.data_offset..layout.data_offset + layout.record_size];
    /// let decoded = SampleDecoder::default().decode_record(record, &layout)?;
    /// assert_eq!(decoded, vec![vec![-10.0, 0.0, 10.0]]);
    /// # Ok::<(), edfdecode::DecodeError>(())
    /// ```
    pub fn decode_record(&self, raw: &[u8], layout: &RecordLayout) -> Result<Vec<Vec<f64>>> {
        let mut buffers: Vec<Vec<f64>> = layout
            .channels
            .iter()
            .map(|c| vec![0.0; c.samples_per_record])
            .collect();
        {
            let mut outputs: Vec<&mut [f64]> = buffers.iter_mut().map(Vec::as_mut_slice).collect();
            self.decode_record_into(raw, layout, &mut outputs)?;
        }
        Ok(buffers)
    }

    /// Decodes one record into caller-provided slices.
    ///
    /// `outputs[ch]` must hold exactly `samples_per_record` values for
    /// channel `ch`. Nothing outside `raw` and `outputs` is touched.
    pub fn decode_record_into(
        &self,
        raw: &[u8],
        layout: &RecordLayout,
        outputs: &mut [&mut [f64]],
    ) -> Result<()> {
        if raw.len() < layout.record_size {
            return Err(DecodeError::TruncatedRecord {
                record: None,
                expected: layout.record_size,
                actual: raw.len(),
            });
        }
        if outputs.len() != layout.channels.len() {
            return Err(DecodeError::LayoutError(format!(
                "{} output buffers for {} channels",
                outputs.len(),
                layout.channels.len()
            )));
        }

        for (channel, out) in layout.channels.iter().zip(outputs.iter_mut()) {
            if out.len() != channel.samples_per_record {
                return Err(DecodeError::LayoutError(format!(
                    "output buffer holds {} samples, channel needs {}",
                    out.len(),
                    channel.samples_per_record
                )));
            }

            let bytes = &raw[channel.offset..channel.offset + channel.byte_len()];
            let cal = &channel.calibration;

            for (slot, pair) in out.iter_mut().zip(bytes.chunks_exact(2)) {
                // 有符号16位整数（小端序）
                let mut digital = i16::from_le_bytes([pair[0], pair[1]]) as i32;
                if self.clamp_digital {
                    digital = cal.clamp(digital);
                }
                *slot = cal.to_physical(digital);
            }
        }

        Ok(())
    }
}
