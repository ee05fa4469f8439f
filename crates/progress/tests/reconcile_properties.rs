//! Property tests for byte reconciliation and line classification.

use progress::{ByteReconciler, LineClassifier, Reading, is_stats_shape, parse_stats};
use proptest::prelude::*;
use test_support::format_reading;

fn increasing_readings() -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(0u64..1_000_000, 1..32).prop_map(|mut readings| {
        readings.sort_unstable();
        readings
    })
}

proptest! {
    #[test]
    fn readings_of_one_file_reconcile_to_the_last(readings in increasing_readings()) {
        let mut reconciler = ByteReconciler::new();
        for bytes in &readings {
            reconciler.observe(Reading::new(*bytes, false));
        }
        prop_assert_eq!(Some(reconciler.total()), readings.last().copied());
    }

    #[test]
    fn completed_files_sum_up(files in proptest::collection::vec(increasing_readings(), 1..8)) {
        let mut reconciler = ByteReconciler::new();
        let mut previous_total = 0;
        for readings in &files {
            for bytes in readings {
                let total = reconciler.observe(Reading::new(*bytes, false));
                prop_assert!(total >= previous_total);
                previous_total = total;
            }
            let last = readings.last().copied().unwrap_or_default();
            previous_total = reconciler.observe(Reading::new(last, true));
        }

        let expected: u64 = files.iter().filter_map(|readings| readings.last()).sum();
        prop_assert_eq!(reconciler.total(), expected);
    }

    #[test]
    fn rendered_readings_classify_as_progress_only(
        bytes in any::<u64>(),
        percent in 0u8..=100,
        rate in 0.0f64..1e12,
        seconds in 0u64..1_000_000,
    ) {
        let fragment = format!("{}\r", format_reading(bytes, percent, rate, seconds));
        let line = LineClassifier::new("/src").classify(&fragment).expect("terminated");

        prop_assert!(line.is_progress_stats());
        let flags = [
            line.is_irrelevant(),
            line.is_completed_stats(),
            line.is_source_root(),
            line.is_path(),
            line.is_unclassifiable(),
        ];
        prop_assert!(flags.iter().all(|flag| !flag));

        let stats = line.stats().expect("parses").expect("stats line");
        prop_assert_eq!(stats.transferred_bytes(), bytes);
        prop_assert_eq!(stats.percent(), percent);
    }

    #[test]
    fn completed_lines_keep_their_shape_without_summary(
        bytes in any::<u64>(),
        transfer in 1usize..10_000,
        remaining in 0usize..10_000,
    ) {
        let reading = format_reading(bytes, 100, 1_048_576.0, 5);
        let fragment = format!("{reading} (xfr#{transfer}, to-chk={remaining}/{})\n", remaining + 1);

        prop_assert!(is_stats_shape(&fragment));
        prop_assert!(is_stats_shape(&reading));
        let stats = parse_stats(&fragment, true).expect("parses");
        prop_assert_eq!(stats.transferred_bytes(), bytes);
        prop_assert!(stats.is_completed());
    }
}
