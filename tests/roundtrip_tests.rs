use edfdecode::decode;
use edfdecode::doctest_utils::{EdfBuilder, SignalSpec};
use proptest::prelude::*;

// 物理值 -> 数字量化 -> 解码，误差不超过半个量化步长
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn physical_values_survive_quantisation(
        physical_max in (1u32..5000).prop_map(f64::from),
        digital_max in 100i32..32767,
        samples_per_record in 1usize..32,
        records in 1usize..6,
        seed in proptest::collection::vec(-1.0f64..1.0, 1..64),
    ) {
        let physical_min = -physical_max;
        let digital_min = -digital_max - 1;
        let spec = SignalSpec::new("EEG", physical_min, physical_max, digital_min, digital_max, samples_per_record);
        let gain = spec.calibration().gain;

        let mut builder = EdfBuilder::new().signal(spec);
        let mut expected = Vec::new();
        for r in 0..records {
            let values: Vec<f64> = (0..samples_per_record)
                .map(|i| seed[(r * samples_per_record + i) % seed.len()] * physical_max)
                .collect();
            expected.extend_from_slice(&values);
            builder = builder.physical_record(&[values]);
        }

        let recording = decode(&builder.build()).unwrap();
        let decoded = recording.samples(0).unwrap();

        prop_assert_eq!(decoded.len(), samples_per_record * records);
        for (got, want) in decoded.iter().zip(&expected) {
            prop_assert!((got - want).abs() <= gain / 2.0 + 1e-9, "{} vs {} (gain {})", got, want, gain);
        }
    }
}

#[test]
fn test_multi_channel_round_trip() {
    let specs = [
        SignalSpec::eeg("EEG C3", 256),
        SignalSpec::new("ECG Lead II", -5.0, 5.0, -2048, 2047, 128),
        SignalSpec::new("Temp", 30.0, 42.0, 0, 1200, 1),
    ];
    let mut builder = EdfBuilder::new();
    for spec in &specs {
        builder = builder.signal(spec.clone());
    }

    let mut expected: Vec<Vec<f64>> = vec![Vec::new(); specs.len()];
    for second in 0..4 {
        let record: Vec<Vec<f64>> = specs
            .iter()
            .map(|spec| {
                (0..spec.samples_per_record)
                    .map(|i| {
                        let t = (second * spec.samples_per_record + i) as f64 / spec.samples_per_record as f64;
                        let mid = (spec.physical_max + spec.physical_min) / 2.0;
                        let amp = (spec.physical_max - spec.physical_min) / 4.0;
                        mid + amp * (2.0 * std::f64::consts::PI * 10.0 * t).sin()
                    })
                    .collect()
            })
            .collect();
        for (ch, values) in record.iter().enumerate() {
            expected[ch].extend_from_slice(values);
        }
        builder = builder.physical_record(&record);
    }

    let recording = decode(&builder.build()).unwrap();
    for (ch, spec) in specs.iter().enumerate() {
        let gain = spec.calibration().gain;
        let decoded = recording.samples(ch).unwrap();
        assert_eq!(decoded.len(), expected[ch].len());
        for (got, want) in decoded.iter().zip(&expected[ch]) {
            assert!((got - want).abs() <= gain / 2.0 + 1e-9, "channel {}: {} vs {}", spec.label, got, want);
        }
    }
}
