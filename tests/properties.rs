//! Property tests for the analysis stages

use noise_monitor_core::analysis::features::FeatureSet;
use noise_monitor_core::analysis::level::{decibels, decibels_from_rms, MAX_DB, MIN_DB};
use noise_monitor_core::analysis::smoothing::apply_moving_average;
use noise_monitor_core::{NoiseClassifier, SpectralAnalyzer, TrendSmoother};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decibels_stay_in_range(samples in proptest::collection::vec(-1000.0f32..1000.0, 1..512),
                              offset in 0.0f64..140.0) {
        let db = decibels(&samples, offset).unwrap();
        prop_assert!((MIN_DB..=MAX_DB).contains(&db), "db={}", db);
    }

    #[test]
    fn decibels_monotonic_in_rms(a in 0.0f64..10.0, b in 0.0f64..10.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let db_low = decibels_from_rms(low, 94.0).unwrap();
        let db_high = decibels_from_rms(high, 94.0).unwrap();
        prop_assert!(db_low <= db_high, "{} dB at {} vs {} dB at {}", db_low, low, db_high, high);
    }

    #[test]
    fn streaming_equals_batch(values in proptest::collection::vec(0.0f64..120.0, 10..60),
                              window in 1usize..10) {
        let mut smoother = TrendSmoother::new(window).unwrap();
        let streamed: Vec<f64> = values.iter().map(|&v| smoother.add(v).unwrap()).collect();
        let batch = apply_moving_average(&values, window).unwrap();
        prop_assert_eq!(streamed, batch);
    }

    #[test]
    fn smoothed_value_within_window_bounds(values in proptest::collection::vec(0.0f64..120.0, 1..40),
                                           window in 1usize..8) {
        let mut smoother = TrendSmoother::new(window).unwrap();
        for (i, &v) in values.iter().enumerate() {
            let avg = smoother.add(v).unwrap();
            let start = (i + 1).saturating_sub(window);
            let recent = &values[start..=i];
            let lo = recent.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(avg >= lo - 1e-9 && avg <= hi + 1e-9);
            prop_assert!(smoother.len() <= window);
        }
    }

    #[test]
    fn rejected_value_leaves_history(values in proptest::collection::vec(0.0f64..120.0, 1..20)) {
        let mut smoother = TrendSmoother::new(5).unwrap();
        for &v in &values {
            smoother.add(v).unwrap();
        }
        let before = smoother.buffer();
        prop_assert!(smoother.add(f64::NAN).is_err());
        prop_assert!(smoother.add(f64::INFINITY).is_err());
        prop_assert_eq!(smoother.buffer(), before);
    }

    #[test]
    fn spectral_features_well_formed(samples in proptest::collection::vec(-1.0f32..1.0, 16..1024)) {
        let analyzer = SpectralAnalyzer::new(16000).unwrap();
        let (frame, f) = analyzer.analyze(&samples, 1024).unwrap();
        let nyquist = 8000.0;

        prop_assert_eq!(frame.magnitudes.len(), 513);
        prop_assert!(frame.magnitudes.iter().all(|&m| m >= 0.0 && m.is_finite()));

        let sum = f.low_ratio + f.mid_ratio + f.high_ratio;
        prop_assert!((sum - 1.0).abs() < 1e-9, "ratios sum to {}", sum);
        prop_assert!((0.0..=1.0).contains(&f.flatness));
        prop_assert!(f.entropy >= -1e-9);
        prop_assert!(f.spread >= 0.0);
        prop_assert!(f.centroid >= 0.0 && f.centroid <= nyquist + 1e-6);
        prop_assert!(f.rolloff >= 0.0 && f.rolloff <= nyquist + 1e-6);
        prop_assert!(f.dominant_frequency >= 0.0 && f.dominant_frequency <= nyquist + 1e-6);
    }

    #[test]
    fn confidence_in_range(db in 0.0f64..120.0,
                           weights in (0.01f64..1.0, 0.01f64..1.0, 0.01f64..1.0),
                           flatness in 0.0f64..1.0) {
        let total = weights.0 + weights.1 + weights.2;
        let (low, mid) = (weights.0 / total, weights.1 / total);
        let high = weights.2 / total;
        let features = FeatureSet {
            centroid: 1000.0,
            spread: 200.0,
            rolloff: 4000.0,
            flatness,
            entropy: 5.0,
            dominant_frequency: 500.0,
            low_ratio: low,
            mid_ratio: mid,
            high_ratio: high,
        };
        let classifier = NoiseClassifier::new();

        let by_level = classifier.classify_by_level(db).unwrap();
        prop_assert!((0.5..=1.0).contains(&by_level.confidence));

        let with_spectrum = classifier.classify_with_spectrum(db, &features).unwrap();
        prop_assert!((0.5..=1.0).contains(&with_spectrum.confidence));
        prop_assert_eq!(with_spectrum.category, by_level.category);
        prop_assert!(with_spectrum.noise_type.is_some());
    }

    #[test]
    fn unbalanced_ratios_rejected(db in 0.0f64..120.0,
                                  low in 0.0f64..1.0,
                                  mid in 0.0f64..1.0,
                                  high in 0.0f64..1.0) {
        prop_assume!((low + mid + high - 1.0).abs() > 1e-3);
        let features = FeatureSet {
            centroid: 1000.0,
            spread: 200.0,
            rolloff: 4000.0,
            flatness: 0.5,
            entropy: 5.0,
            dominant_frequency: 500.0,
            low_ratio: low,
            mid_ratio: mid,
            high_ratio: high,
        };
        prop_assert!(NoiseClassifier::new().classify_with_spectrum(db, &features).is_err());
    }
}
