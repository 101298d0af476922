//! Invariants of the aggregation engine that must hold for any table

use proptest::prelude::*;

use chrono::NaiveDate;
use salesq_core::insight::{format_ranked, parse_currency, FormatOptions};
use salesq_core::ops::{
    aggregate, percent_of_total, rank, top_n, year_over_year_growth, yearly_sums, RankBy,
};
use salesq_core::{Field, Metric, Record, Table};

const CATEGORIES: [&str; 4] = ["Furniture", "Office Supplies", "Technology", "Toys"];
const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];

fn arb_record() -> impl Strategy<Value = Record> {
    (0..CATEGORIES.len(), 0..REGIONS.len(), 2014i32..2019, 1u32..=12, 1u32..=28, 0u32..1_000_000)
        .prop_map(|(category, region, year, month, day, cents)| {
            let order_date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            Record {
                row_id: String::new(),
                order_date,
                ship_date: order_date,
                sales: f64::from(cents) / 100.0,
                category: CATEGORIES[category].to_string(),
                sub_category: String::new(),
                region: REGIONS[region].to_string(),
                state: String::new(),
                segment: "Consumer".to_string(),
                ship_mode: "Standard Class".to_string(),
                customer_name: format!("Customer {region}"),
                product_name: format!("Product {category}"),
            }
        })
}

fn arb_table(max_len: usize) -> impl Strategy<Value = Table> {
    proptest::collection::vec(arb_record(), 0..max_len).prop_map(Table::from_records)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn prop_group_sums_add_up_to_total(table in arb_table(60)) {
        let total: f64 = table.iter().map(|r| r.sales).sum();
        for fields in [
            vec![Field::Category],
            vec![Field::Region, Field::Year],
            vec![Field::Quarter],
        ] {
            let result = aggregate(&table, &fields, Metric::Sales);
            prop_assert!(close(result.total(), total));
            for (_, summary) in &result {
                prop_assert!(summary.count > 0);
                #[allow(clippy::cast_precision_loss)]
                let mean = summary.sum / summary.count as f64;
                prop_assert!(close(summary.mean, mean));
            }
        }
    }

    #[test]
    fn prop_top_n_is_idempotent_and_ordered(table in arb_table(60), n in 1usize..8) {
        let result = aggregate(&table, &[Field::Region], Metric::Sales);
        let first = top_n(&result, n, RankBy::Sum).unwrap();
        let second = top_n(&result, n, RankBy::Sum).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), n.min(result.len()));
        let values: Vec<f64> = first.iter().map(|e| e.value).collect();
        prop_assert!(values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn prop_percent_of_total_sums_to_100(table in arb_table(60)) {
        let result = aggregate(&table, &[Field::Category], Metric::Sales);
        if result.total() == 0.0 {
            for key in result.keys() {
                prop_assert!(percent_of_total(&result, key).unwrap_err().is_division());
            }
        } else {
            let sum: f64 = result
                .keys()
                .map(|k| percent_of_total(&result, k).unwrap())
                .sum();
            prop_assert!((sum - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn prop_currency_round_trips(table in arb_table(60)) {
        let result = aggregate(&table, &[Field::ProductName], Metric::Sales);
        prop_assume!(!result.is_empty());
        let top = top_n(&result, 5, RankBy::Sum).unwrap();
        let options = FormatOptions { show_share: false, ..FormatOptions::default() };

        for (line, entry) in format_ranked(&top, result.total(), &options).iter().zip(top.iter()) {
            let amount = line.rsplit(": ").next().unwrap();
            let parsed = parse_currency(amount).unwrap();
            prop_assert!((parsed - entry.value).abs() < 0.005 + 1e-9);
        }
    }

    #[test]
    fn prop_growth_covers_consecutive_years(table in arb_table(60)) {
        let yearly = yearly_sums(&table);
        match year_over_year_growth(&yearly) {
            Ok(growth) => {
                prop_assert_eq!(growth.len(), yearly.len().saturating_sub(1));
                for g in &growth {
                    prop_assert!(g.from_year < g.to_year);
                }
            }
            Err(e) => {
                prop_assert!(e.is_division());
                prop_assert!(yearly.values().rev().skip(1).any(|v| *v == 0.0));
            }
        }
    }

    #[test]
    fn prop_full_ranking_covers_every_group(table in arb_table(60)) {
        let result = aggregate(&table, &[Field::Category, Field::Region], Metric::Sales);
        prop_assert_eq!(rank(&result, RankBy::Count).len(), result.len());
    }
}
