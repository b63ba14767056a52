use serde::Serialize;

use crate::models::ScheduleRecord;
use crate::phone::format_phone_number;

/// Placeholder shown wherever the collection is empty.
pub const EMPTY_MESSAGE: &str = "등록된 스케줄이 없습니다.";

/// One table row, newest records first.
///
/// `original_index` is the record's insertion index and is what the row's
/// status selector and delete button address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub original_index: usize,
    pub date: String,
    pub phone_number: String,
    pub customer_code: String,
    pub address: String,
    pub status_code: u8,
    pub status_label: &'static str,
    pub css_class: String,
}

pub fn render_rows(records: &[ScheduleRecord]) -> Vec<ScheduleRow> {
    let len = records.len();
    records
        .iter()
        .rev()
        .enumerate()
        .map(|(display_index, record)| ScheduleRow {
            original_index: len - 1 - display_index,
            date: record.date.format("%Y-%m-%d").to_string(),
            phone_number: format_phone_number(&record.phone_number),
            customer_code: record.customer_code.clone(),
            address: record.address.clone(),
            status_code: record.status.code(),
            status_label: record.status.label(),
            css_class: format!("status-{}", record.status.code()),
        })
        .collect()
}

/// Plain-text rendition of the table for terminals.
pub fn render_table(rows: &[ScheduleRow]) -> String {
    if rows.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let mut out = String::from("번호 | 날짜 | 전화번호 | 고객관리번호 | 작업 상태 | 주소\n");
    for row in rows {
        out.push_str(&format!(
            "{} | {} | {} | {} | {} | {}\n",
            row.original_index,
            row.date,
            row.phone_number,
            row.customer_code,
            row.status_label,
            row.address
        ));
    }
    out
}
