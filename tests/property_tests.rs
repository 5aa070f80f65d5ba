// ==========================================
// 属性测试
// ==========================================
// 测试目标: 序列补零 / 调拨守恒 / 调拨确定性 / 富余充足时无未满足缺货
// ==========================================


use demand_rebalancer::domain::{GapRecord, PairKey};
use demand_rebalancer::engine::{SeriesBuilder, TransferPlanner, TransferSettings};
use proptest::prelude::*;
use std::collections::HashMap;
use test_helpers::{gap, sparse_history};

// 单组合的 (日偏移, 整数销量) 记录
fn entries_strategy() -> impl Strategy<Value = Vec<(u64, f64)>> {
    prop::collection::vec((0u64..90, (0u32..200).prop_map(f64::from)), 1..60)
}

// 单商品缺口表，每个仓库出现一次
fn gaps_strategy() -> impl Strategy<Value = Vec<GapRecord>> {
    prop::collection::vec(-60i64..60, 1..12).prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, g)| gap("X", &format!("L{}", i), g))
            .collect()
    })
}

// 富余合计不小于缺货合计的缺口表（末位仓补足差额）
fn covered_gaps_strategy() -> impl Strategy<Value = (Vec<GapRecord>, i64)> {
    (0i64..20).prop_flat_map(|threshold| {
        (
            prop::collection::vec(-60i64..0, 1..8),
            prop::collection::vec((threshold + 1)..(threshold + 60), 0..6),
            0i64..30,
        )
            .prop_map(move |(shortages, surpluses, slack)| {
                let need: i64 = -shortages.iter().sum::<i64>();
                let have: i64 = surpluses.iter().sum();
                let top_up = (need - have + slack).max(threshold + 1);

                let mut values = Vec::new();
                // 缺货与富余交错排列
                let longest = shortages.len().max(surpluses.len());
                for i in 0..longest {
                    values.extend(shortages.get(i).copied());
                    values.extend(surpluses.get(i).copied());
                }
                values.push(top_up);

                let gaps = values
                    .into_iter()
                    .enumerate()
                    .map(|(i, g)| gap("X", &format!("L{}", i), g))
                    .collect();
                (gaps, threshold)
            })
    })
}

proptest! {
    #[test]
    fn prop_series_is_contiguous(entries in entries_strategy()) {
        let records = sparse_history("X", "A", &entries);
        let pair = PairKey::new("X", "A");

        let series = SeriesBuilder::new(1).build(&pair, &records).unwrap();

        let min = entries.iter().map(|e| e.0).min().unwrap();
        let max = entries.iter().map(|e| e.0).max().unwrap();
        prop_assert!(series.is_contiguous());
        prop_assert_eq!(series.len() as u64, max - min + 1);

        let input_total: f64 = entries.iter().map(|e| e.1).sum();
        let series_total: f64 = series.values().iter().sum();
        prop_assert_eq!(input_total, series_total);
    }

    #[test]
    fn prop_zero_fill_is_idempotent(entries in entries_strategy()) {
        let records = sparse_history("X", "A", &entries);
        let pair = PairKey::new("X", "A");
        let builder = SeriesBuilder::new(1);

        let once = builder.build(&pair, &records).unwrap();
        let twice = builder.build(&pair, &once.to_records()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_transfers_conserve_quantity(gaps in gaps_strategy(), threshold in 0i64..20) {
        let plan = TransferPlanner::new(TransferSettings { min_surplus_threshold: threshold }).plan(&gaps);
        let initial: HashMap<&str, i64> = gaps.iter().map(|g| (g.location_id.as_str(), g.gap)).collect();

        let mut sent: HashMap<&str, i64> = HashMap::new();
        let mut received: HashMap<&str, i64> = HashMap::new();
        for s in &plan.suggestions {
            prop_assert!(s.quantity > 0);
            prop_assert_ne!(&s.from_location, &s.to_location);
            prop_assert!(initial[s.from_location.as_str()] > threshold);
            prop_assert!(initial[s.to_location.as_str()] < 0);
            *sent.entry(s.from_location.as_str()).or_insert(0) += s.quantity;
            *received.entry(s.to_location.as_str()).or_insert(0) += s.quantity;
        }

        for (location, total) in &sent {
            prop_assert!(*total <= initial[location]);
        }

        let unmet: HashMap<&str, i64> = plan
            .unmet
            .iter()
            .map(|u| (u.location_id.as_str(), u.unmet_need))
            .collect();
        for g in gaps.iter().filter(|g| g.gap < 0) {
            let got = received.get(g.location_id.as_str()).copied().unwrap_or(0);
            let left = unmet.get(g.location_id.as_str()).copied().unwrap_or(0);
            prop_assert_eq!(got + left, -g.gap);
        }
    }

    #[test]
    fn prop_planner_is_deterministic(gaps in gaps_strategy()) {
        let planner = TransferPlanner::new(TransferSettings::default());
        prop_assert_eq!(planner.plan(&gaps), planner.plan(&gaps));
    }

    #[test]
    fn prop_sufficient_surplus_leaves_no_unmet((gaps, threshold) in covered_gaps_strategy()) {
        let eligible: i64 = gaps.iter().filter(|g| g.gap > threshold).map(|g| g.gap).sum();
        let shortage: i64 = gaps.iter().filter(|g| g.gap < 0).map(|g| -g.gap).sum();
        prop_assert!(eligible >= shortage);

        let plan = TransferPlanner::new(TransferSettings { min_surplus_threshold: threshold }).plan(&gaps);
        prop_assert!(plan.unmet.is_empty(), "unmet: {:?}", plan.unmet);
        prop_assert_eq!(plan.total_quantity(), shortage);
    }
}
