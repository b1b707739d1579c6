//! Output formatting utilities

use crate::application::{Activity, Dashboard, Page};
use crate::domain::{CollectionKey, Record};
use crate::infrastructure::Stats;
use chrono::Local;

/// Columns shown in list output for each collection
fn columns(collection: CollectionKey) -> &'static [&'static str] {
    match collection {
        CollectionKey::Partners => &["code", "name", "type", "contact_person", "phone"],
        CollectionKey::ExpenseItems => &[
            "code",
            "name",
            "category",
            "tax_type",
            "default_currency",
            "default_price",
        ],
        CollectionKey::PaymentTerms => &["code", "name", "days", "status"],
        CollectionKey::LedgerEntries => &["code", "entry_date", "partner_id", "amount", "currency"],
    }
}

/// Format records as an aligned table with the id as last column
pub fn format_record_table(collection: CollectionKey, records: &[Record]) -> String {
    if records.is_empty() {
        return "No records found".to_string();
    }

    let mut headers: Vec<&str> = columns(collection).to_vec();
    headers.push("id");

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|field| record.get_text(field).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut output = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_uppercase()).collect();
    output.push_str(&render(&header_cells));
    output.push('\n');
    for row in &rows {
        output.push_str(&render(row));
        output.push('\n');
    }
    output
}

/// Format one page of a list view with a position footer
pub fn format_page(collection: CollectionKey, page: &Page) -> String {
    let mut output = format_record_table(collection, &page.items);
    if !page.items.is_empty() {
        output.push_str(&format!(
            "\nPage {}/{} ({} records)\n",
            page.page, page.total_pages, page.total_items
        ));
    }
    output
}

/// Format every field of a record, system fields first
pub fn format_record_detail(record: &Record) -> String {
    let mut output = format!("id = {}\n", record.id);
    for field in record.fields.keys() {
        output.push_str(&format!(
            "{} = {}\n",
            field,
            record.get_text(field).unwrap_or_default()
        ));
    }
    output.push_str(&format!("created_at = {}\n", record.created_at.to_rfc3339()));
    output.push_str(&format!("updated_at = {}\n", record.updated_at.to_rfc3339()));
    output
}

pub fn format_stats(stats: &Stats) -> String {
    CollectionKey::ALL
        .iter()
        .map(|c| format!("{:<14} {}\n", c.cli_name(), stats.count(*c)))
        .collect()
}

fn activity_label(collection: CollectionKey) -> &'static str {
    match collection {
        CollectionKey::Partners => "New partner",
        CollectionKey::ExpenseItems => "New expense item",
        CollectionKey::PaymentTerms => "New payment term",
        CollectionKey::LedgerEntries => "New ledger entry",
    }
}

/// Recent creations, one per line with local creation time
pub fn format_recent_activity(activities: &[Activity]) -> String {
    if activities.is_empty() {
        return "No recent activity\n".to_string();
    }

    let mut output = String::from("Recent activity:\n");
    for activity in activities {
        let record = &activity.record;
        output.push_str(&format!(
            "  {}  {}: {} ({})\n",
            record.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            activity_label(activity.collection),
            record.get_text("name").unwrap_or_default(),
            record.code().unwrap_or("-"),
        ));
    }
    output
}

/// Counts followed by the activity feed
pub fn format_dashboard(dashboard: &Dashboard) -> String {
    format!(
        "{}\n{}",
        format_stats(&dashboard.stats),
        format_recent_activity(&dashboard.recent)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldMap;
    use chrono::Utc;
    use serde_json::json;

    fn partner(code: &str, name: &str) -> Record {
        let fields: FieldMap = [
            ("code".to_string(), json!(code)),
            ("name".to_string(), json!(name)),
            ("type".to_string(), json!("customer")),
        ]
        .into_iter()
        .collect();
        Record::new(fields, Utc::now())
    }

    #[test]
    fn test_format_empty_table() {
        let output = format_record_table(CollectionKey::Partners, &[]);
        assert_eq!(output, "No records found");
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let records = vec![
            partner("ANSC-010001", "Acme"),
            partner("ANSC-010002", "Tokyo Freight"),
        ];
        let output = format_record_table(CollectionKey::Partners, &records);
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("CODE"));
        assert!(lines[0].contains("CONTACT_PERSON"));
        assert!(lines[1].starts_with("ANSC-010001  Acme "));
        assert!(lines[2].contains("Tokyo Freight"));
        assert!(lines[2].ends_with(&records[1].id));
    }

    #[test]
    fn test_format_page_footer() {
        let page = Page {
            items: vec![partner("ANSC-010001", "Acme")],
            page: 1,
            total_pages: 3,
            total_items: 21,
        };
        let output = format_page(CollectionKey::Partners, &page);
        assert!(output.contains("Page 1/3 (21 records)"));
    }

    #[test]
    fn test_format_record_detail() {
        let record = partner("ANSC-010001", "Acme");
        let output = format_record_detail(&record);
        assert!(output.starts_with(&format!("id = {}\n", record.id)));
        assert!(output.contains("name = Acme\n"));
        assert!(output.contains("created_at = "));
    }

    #[test]
    fn test_format_recent_activity() {
        assert_eq!(format_recent_activity(&[]), "No recent activity\n");

        let activities = vec![Activity {
            collection: CollectionKey::Partners,
            record: partner("ANSC-010001", "Acme"),
        }];
        let output = format_recent_activity(&activities);
        assert!(output.starts_with("Recent activity:\n"));
        assert!(output.contains("New partner: Acme (ANSC-010001)"));
    }

    #[test]
    fn test_format_stats() {
        let stats = Stats {
            customers: 2,
            expense_items: 0,
            payment_terms: 1,
            ledger_entries: 0,
        };
        let output = format_stats(&stats);
        assert!(output.contains("partners       2\n"));
        assert!(output.contains("payment-terms  1\n"));
    }
}
