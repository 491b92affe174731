use edfdecode::doctest_utils::{write_field, EdfBuilder, SignalSpec};
use edfdecode::{decode, decode_file, DecodeError, DecodeOptions, EdfDecoder, ErrorKind};
use std::io::Write;

// 生成多通道测试文件的辅助函数
fn eeg_file(labels: &[&str], samples_per_record: usize, records: usize) -> EdfBuilder {
    let mut builder = EdfBuilder::new()
        .patient("MC001 F 15-MAR-1985 Multi_Channel")
        .start("15.03.24", "08.00.00");
    for label in labels {
        builder = builder.signal(SignalSpec::eeg(label, samples_per_record));
    }
    for record in 0..records {
        let samples = (0..labels.len())
            .map(|ch| {
                (0..samples_per_record)
                    .map(|i| (record * 1000 + ch * 100 + i) as i16)
                    .collect()
            })
            .collect();
        builder = builder.record(samples);
    }
    builder
}

#[test]
fn test_sample_counts_match_records() {
    let mut builder = EdfBuilder::new()
        .signal(SignalSpec::eeg("EEG C3", 256))
        .signal(SignalSpec::eeg("EEG C4", 128))
        .signal(SignalSpec::new("ECG", -5.0, 5.0, -2048, 2047, 64));
    for _ in 0..7 {
        builder = builder.record(vec![vec![0; 256], vec![0; 128], vec![0; 64]]);
    }
    let recording = decode(&builder.build()).unwrap();

    assert_eq!(recording.record_count(), 7);
    assert_eq!(recording.samples(0).unwrap().len(), 256 * 7);
    assert_eq!(recording.samples(1).unwrap().len(), 128 * 7);
    assert_eq!(recording.samples(2).unwrap().len(), 64 * 7);
    assert!(recording.samples(3).is_none());
}

#[test]
fn test_samples_follow_record_order() {
    let bytes = eeg_file(&["Fp1", "Fp2"], 3, 2)
        .build();
    let recording = EdfDecoder::new(DecodeOptions::default()).decode(&bytes).unwrap();
    let cal = *recording.calibration(1).unwrap();

    let expected: Vec<f64> = [100, 101, 102, 1100, 1101, 1102]
        .iter()
        .map(|&d| cal.to_physical(d))
        .collect();
    assert_eq!(recording.samples(1).unwrap(), expected.as_slice());
}

#[test]
fn test_column_major_labels() {
    let mut fp2 = SignalSpec::eeg("Fp2", 4);
    fp2.transducer = "AgAgCl electrodes".to_string();
    let bytes = EdfBuilder::new()
        .signal(SignalSpec::eeg("Fp1", 4))
        .signal(fp2)
        .record(vec![vec![1; 4], vec![2; 4]])
        .build();

    let recording = decode(&bytes).unwrap();
    assert_eq!(recording.channels()[0].label, "Fp1");
    assert_eq!(recording.channels()[1].label, "Fp2");
    assert_eq!(recording.channels()[0].transducer, "");
    assert_eq!(recording.channels()[1].transducer, "AgAgCl electrodes");
    assert_eq!(recording.channel_index("Fp2"), Some(1));
}

#[test]
fn test_full_range_calibration() {
    let bytes = EdfBuilder::new()
        .signal(SignalSpec::eeg("Cz", 3))
        .record(vec![vec![0, 32767, -32768]])
        .build();
    let recording = decode(&bytes).unwrap();
    let samples = recording.samples(0).unwrap();

    let gain = 200.0 / 65535.0;
    let offset = -100.0 + 32768.0 * gain;
    assert!((samples[0] - offset).abs() < 1e-12);
    assert!((samples[0] - 0.0015).abs() < 1e-4);
    assert!((samples[1] - 100.0).abs() < 1e-9);
    assert!((samples[2] + 100.0).abs() < 1e-9);
}

#[test]
fn test_truncated_file_is_rejected() {
    let bytes = eeg_file(&["Fp1", "Fp2"], 10, 5).build();
    let cut = bytes.len() - 15;

    let err = decode(&bytes[..cut]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedRecord);
    match err {
        DecodeError::TruncatedRecord { record, .. } => assert_eq!(record, Some(4)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_record_count() {
    let bytes = eeg_file(&["Fp1", "Fp2", "F3"], 8, 3)
        .declared_record_count(-1)
        .build();
    let record_size = 3 * 8 * 2;
    assert_eq!(bytes.len(), 256 + 256 * 3 + 3 * record_size);

    let recording = decode(&bytes).unwrap();
    assert_eq!(recording.header().record_count, -1);
    assert_eq!(recording.record_count(), 3);
    assert_eq!(recording.samples(2).unwrap().len(), 24);
}

#[test]
fn test_unknown_record_count_ignores_partial_tail() {
    let mut bytes = eeg_file(&["Fp1"], 4, 2).declared_record_count(-1).build();
    bytes.extend_from_slice(&[1, 2, 3]);

    let recording = decode(&bytes).unwrap();
    assert_eq!(recording.record_count(), 2);
}

#[test]
fn test_over_declared_tail_is_ignored() {
    // 声明2个记录，文件实际多出一个记录和一些垃圾字节
    let mut bytes = eeg_file(&["Fp1"], 4, 3).declared_record_count(2).build();
    bytes.extend_from_slice(b"garbage");

    let recording = decode(&bytes).unwrap();
    assert_eq!(recording.record_count(), 2);
    assert_eq!(recording.samples(0).unwrap().len(), 8);
}

#[test]
fn test_under_declared_data_is_fatal() {
    let bytes = eeg_file(&["Fp1"], 4, 2).declared_record_count(3).build();
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedRecord);
}

#[test]
fn test_degenerate_physical_range() {
    let flat = SignalSpec::new("Flat", 5.0, 5.0, -100, 100, 2);
    let bytes = EdfBuilder::new()
        .signal(SignalSpec::eeg("Fp1", 2))
        .signal(flat)
        .record(vec![vec![0, 0], vec![0, 0]])
        .build();

    match decode(&bytes).unwrap_err() {
        DecodeError::CalibrationError { channel, .. } => assert_eq!(channel, 1),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_no_samples_is_layout_error() {
    let bytes = EdfBuilder::new().build();
    assert_eq!(decode(&bytes).unwrap_err().kind(), ErrorKind::LayoutError);
}

#[test]
fn test_malformed_duration() {
    let mut bytes = eeg_file(&["Fp1"], 4, 1).build();
    write_field(&mut bytes, 244, 8, "one");
    assert_eq!(decode(&bytes).unwrap_err().kind(), ErrorKind::MalformedField);
}

#[test]
fn test_channel_limit_option() {
    let bytes = eeg_file(&["Fp1", "Fp2", "F3", "F4"], 2, 1).build();

    let decoder = EdfDecoder::new(DecodeOptions::default().with_max_channels(3));
    assert_eq!(decoder.decode(&bytes).unwrap_err().kind(), ErrorKind::MalformedField);

    let decoder = EdfDecoder::new(DecodeOptions::default().with_max_channels(4));
    assert!(decoder.decode(&bytes).is_ok());
}

#[test]
fn test_out_of_range_digital_values() {
    let bytes = EdfBuilder::new()
        .signal(SignalSpec::new("Narrow", -1.0, 1.0, -100, 100, 2))
        .record(vec![vec![1000, -1000]])
        .build();

    let clamped = decode(&bytes).unwrap();
    let samples = clamped.samples(0).unwrap();
    assert!((samples[0] - 1.0).abs() < 1e-12);
    assert!((samples[1] + 1.0).abs() < 1e-12);

    let raw = EdfDecoder::new(DecodeOptions::default().with_clamp_digital(false))
        .decode(&bytes)
        .unwrap();
    assert!((raw.samples(0).unwrap()[0] - 10.0).abs() < 1e-12);
}

#[test]
fn test_metadata_queries() {
    let bytes = eeg_file(&["Fp1", "Fp2"], 50, 4)
        .record_duration(0.5)
        .build();
    let recording = decode(&bytes).unwrap();

    assert_eq!(recording.duration_seconds(), 2.0);
    assert_eq!(recording.sample_rate(0), Some(100.0));
    assert_eq!(recording.header().patient_id, "MC001 F 15-MAR-1985 Multi_Channel");
    assert_eq!(
        recording.header().start_datetime().unwrap().to_string(),
        "2024-03-15 08:00:00"
    );
    assert!(!recording.header().is_edf_plus());
    assert!(recording.summary().to_string().contains("Sample Rate: 100 Hz"));
}

#[test]
fn test_decode_file() {
    let bytes = eeg_file(&["Fp1", "Fp2"], 16, 3).build();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let from_file = decode_file(file.path()).unwrap();
    let from_memory = decode(&bytes).unwrap();
    assert_eq!(from_file.samples(1), from_memory.samples(1));
    assert_eq!(from_file.header(), from_memory.header());
}

#[test]
fn test_decode_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = decode_file(dir.path().join("missing.edf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_decoder_is_reusable() {
    let decoder = EdfDecoder::default();
    let a = decoder.decode(&eeg_file(&["A"], 4, 1).build()).unwrap();
    let b = decoder.decode(&eeg_file(&["B", "C"], 4, 2).build()).unwrap();

    assert_eq!(a.channels().len(), 1);
    assert_eq!(b.channels().len(), 2);
    assert_eq!(b.record_count(), 2);
}
