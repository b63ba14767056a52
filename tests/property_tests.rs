//! Property-based tests for dispatch text parsing, phone formatting and
//! status statistics.

use chrono::NaiveDate;
use proptest::prelude::*;

use dispatch_board::{
    models::{ScheduleRecord, ScheduleStatus},
    parser::parse_schedule_text,
    phone::format_phone_number,
    store::ScheduleStore,
    transfer::{export_json, import_json},
    views::{compute_stats, render_rows},
};

// Strategies for generating test data
fn phone_digits_strategy() -> impl Strategy<Value = String> {
    "0[0-9]{9,10}".prop_map(|s| s)
}

fn customer_code_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_\\-]{1,12}".prop_map(|s| s)
}

fn address_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof!["[가-힣]{1,6}", "[0-9]{1,4}동", "[0-9]{1,4}호", "[a-z]{1,5}"],
        0..5,
    )
    .prop_map(|parts| parts.join(" "))
}

fn status_strategy() -> impl Strategy<Value = ScheduleStatus> {
    (1u8..=5).prop_map(|code| ScheduleStatus::try_from(code).unwrap())
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
}

fn records_strategy() -> impl Strategy<Value = Vec<ScheduleRecord>> {
    prop::collection::vec(
        (phone_digits_strategy(), customer_code_strategy(), status_strategy()),
        0..40,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(phone, code, status)| {
                let parsed = parse_schedule_text(&format!("{}☏{}", phone, code)).unwrap();
                let mut record = ScheduleRecord::new(parsed, date());
                record.status = status;
                record
            })
            .collect()
    })
}

// Property: recognized texts always yield the embedded phone and code
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn phone_and_code_are_extracted(
        prefix in "[가-힣 \\[\\]]{0,10}",
        phone in phone_digits_strategy(),
        code in customer_code_strategy(),
        address in address_strategy(),
    ) {
        let text = format!("{}{}☏{} {} ♡ 09:30", prefix, phone, code, address);
        let parsed = parse_schedule_text(&text).unwrap();
        prop_assert_eq!(parsed.phone_number, phone);
        prop_assert_eq!(parsed.customer_code, code);
        prop_assert_eq!(parsed.address, address.trim());
    }

    #[test]
    fn text_without_marker_is_rejected(text in "[^☏]{0,60}") {
        prop_assert!(parse_schedule_text(&text).is_err());
    }
}

// Property: phone formatting only inserts hyphens for 10/11 digits
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn formatting_preserves_digits(digits in "[0-9]{1,14}") {
        let formatted = format_phone_number(&digits);
        prop_assert_eq!(formatted.replace('-', ""), digits.clone());
        match digits.len() {
            10 | 11 => {
                prop_assert_eq!(formatted.matches('-').count(), 2);
            }
            _ => {
                prop_assert_eq!(formatted, digits);
            }
        }
    }
}

// Property: statistics and rendering agree with the collection
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn percentages_sum_to_one_hundred(records in records_strategy()) {
        let stats = compute_stats(&records);
        let counted: usize = stats.shares.iter().map(|s| s.count).sum();
        prop_assert_eq!(counted, records.len());
        prop_assert_eq!(stats.shares.len(), 5);

        if !records.is_empty() {
            let total: f64 = stats.shares.iter().map(|s| s.percentage).sum();
            prop_assert!((total - 100.0).abs() < 1e-6, "sum was {}", total);
        }
    }

    #[test]
    fn rows_are_newest_first(records in records_strategy()) {
        let rows = render_rows(&records);
        prop_assert_eq!(rows.len(), records.len());
        for (display, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.original_index, records.len() - 1 - display);
            prop_assert_eq!(&row.customer_code, &records[row.original_index].customer_code);
        }
    }

    #[test]
    fn removal_shifts_later_indices(records in records_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!records.is_empty());
        let index = pick.index(records.len());
        let mut store = ScheduleStore::from_records(records.clone());

        let removed = store.remove(index).unwrap();

        prop_assert_eq!(&removed, &records[index]);
        prop_assert_eq!(store.len(), records.len() - 1);
        for later in index..store.len() {
            prop_assert_eq!(store.get(later), Some(&records[later + 1]));
        }
    }

    #[test]
    fn export_import_restores_collection(records in records_strategy()) {
        let json = export_json(&records).unwrap();
        prop_assert_eq!(import_json(&json).unwrap(), records);
    }
}
