use analytics::{AnalyticsEngine, BinSize, Selection, bin_records, normalize, reverse_cdf};
use core_types::{
    AnalyticsRecord, FieldValue, GroupingParam, NormalResults, PeriodType, RecordType, ResultSet,
    TrialRecord,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn record(cagr_pct: f64, n_tickers: Option<i64>) -> AnalyticsRecord {
    AnalyticsRecord {
        cagr_pct,
        n_tickers: n_tickers.into(),
        rebalance_period: FieldValue::NotAvailable,
        momentum_lookback_days: FieldValue::NotAvailable,
        test_period_months: FieldValue::NotAvailable,
        score: 0.0,
        source: PeriodType::Test,
    }
}

fn records_strategy() -> impl Strategy<Value = Vec<AnalyticsRecord>> {
    prop::collection::vec(
        (-100.0f64..300.0, prop::option::of(1i64..6)).prop_map(|(c, n)| record(c, n)),
        0..200,
    )
}

fn bin_size_strategy() -> impl Strategy<Value = BinSize> {
    prop_oneof![
        Just(1.0),
        Just(2.0),
        Just(5.0),
        Just(10.0),
        0.25f64..25.0,
    ]
    .prop_map(|pct| BinSize::new(pct).unwrap())
}

fn grouping_strategy() -> impl Strategy<Value = GroupingParam> {
    prop_oneof![Just(GroupingParam::None), Just(GroupingParam::NTickers)]
}

fn normal_set(cagrs: &[f64]) -> ResultSet {
    let results = cagrs
        .iter()
        .map(|c| TrialRecord {
            cagr: Some(*c),
            ..Default::default()
        })
        .collect::<Vec<_>>();
    ResultSet::Normal(NormalResults {
        total_tests: results.len() as u64,
        completed_tests: results.len() as u64,
        results,
        ..Default::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn binning_conserves_every_record(
        records in records_strategy(),
        bin_size in bin_size_strategy(),
        group_by in grouping_strategy(),
    ) {
        let histogram = bin_records(&records, bin_size, group_by);
        prop_assert_eq!(histogram.grand_total(), records.len() as u64);
        for key in &histogram.group_keys {
            let expected = records.iter().filter(|r| &group_by.group_key(r) == key).count();
            prop_assert_eq!(histogram.total(key), expected as u64);
        }
        prop_assert!(histogram.bins.windows(2).all(|w| w[0].floor < w[1].floor));

        let dense = histogram.densify();
        prop_assert_eq!(dense.grand_total(), records.len() as u64);
        prop_assert!(dense.bins.len() >= histogram.bins.len());
    }

    #[test]
    fn reverse_cdf_starts_at_one_hundred_and_never_rises(
        records in records_strategy(),
        bin_size in bin_size_strategy(),
        group_by in grouping_strategy(),
    ) {
        let histogram = bin_records(&records, bin_size, group_by);
        let points = reverse_cdf(&histogram.bins);
        prop_assert_eq!(points.len(), histogram.bins.len());

        for key in &histogram.group_keys {
            let curve: Vec<f64> = points.iter().filter_map(|p| p.percentage(key)).collect();
            prop_assert_eq!(curve.len(), points.len());
            prop_assert_eq!(curve[0], 100.0);
            prop_assert!(curve.windows(2).all(|w| w[0] >= w[1]));

            let (Some(top_bin), Some(top_point)) = (histogram.bins.last(), points.last()) else {
                continue;
            };
            let total = histogram.total(key) as f64;
            let expected = (1000.0 * top_bin.count(key) as f64 / total).round() / 10.0;
            // Within one rounding step of the exact share.
            prop_assert!((top_point.percentage(key).unwrap_or(-1.0) - expected).abs() <= 0.1 + 1e-9);
        }
    }

    #[test]
    fn merging_conserves_normalized_records(
        first in prop::collection::vec(-1.0f64..3.0, 0..50),
        second in prop::collection::vec(-1.0f64..3.0, 0..50),
    ) {
        let selection = Selection::single(PeriodType::Test, RecordType::Top);
        let sets = [normal_set(&first), normal_set(&second)];
        let merged = merger::merge(&sets).unwrap();
        prop_assert_eq!(
            normalize(&merged, &selection).len(),
            first.len() + second.len()
        );

        let engine = AnalyticsEngine::with_parts(
            selection,
            BinSize::new(5.0).unwrap(),
            GroupingParam::None,
        );
        let report = engine.analyze_many(&sets).unwrap();
        prop_assert_eq!(report.record_count, first.len() + second.len());
    }
}
