//! CSV rendering of an [`ExportView`].
//!
//! One flat table with a fixed set of columns; the `record` column says what
//! each row is:
//!
//! | record     | group          | name       | unit | quantity | unit_price | total |
//! |------------|----------------|------------|------|----------|------------|-------|
//! | `resource` | section title  | resource   | ...  | ...      | avg cost   | cost  |
//! | `item`     | main item      | sub item   | ...  | ...      | unit price | total |
//! | `total`    |                | total name |      |          |            | value |

use std::io::Write;

use calc_core::errors::{CalcError, CalcResult};
use calc_core::export::ExportView;

const HEADER: [&str; 7] = ["record", "group", "name", "unit", "quantity", "unit_price", "total"];

fn number(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn write_csv<W: Write>(view: &ExportView, out: W) -> CalcResult<()> {
    let csv_error = |e: csv::Error| CalcError::file_error("write csv", "<output>", e.to_string());
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record(HEADER).map_err(csv_error)?;

    for section in &view.sections {
        for row in &section.rows {
            writer
                .write_record([
                    "resource",
                    section.title.as_str(),
                    row.name.as_str(),
                    row.unit.as_str(),
                    number(row.quantity).as_str(),
                    row.unit_price.map(number).unwrap_or_default().as_str(),
                    number(row.total_cost).as_str(),
                ])
                .map_err(csv_error)?;
        }
    }

    for item in &view.line_items {
        writer
            .write_record([
                "item",
                item.main_item.as_str(),
                item.sub_item.as_str(),
                item.unit.as_str(),
                number(item.quantity).as_str(),
                number(item.unit_price).as_str(),
                number(item.total).as_str(),
            ])
            .map_err(csv_error)?;
    }

    let totals = &view.totals;
    let total_rows = [
        ("materials_total", totals.materials_total),
        ("workmanship_total", totals.workmanship_total),
        ("labor_total", totals.labor_total),
        ("resources_total", totals.resources_total),
        ("summary_total", totals.summary_total),
        ("selling_total", totals.selling_total),
        ("final_total", totals.final_total),
    ];
    for (name, value) in total_rows {
        writer
            .write_record(["total", "", name, "", "", "", number(value).as_str()])
            .map_err(csv_error)?;
    }

    writer
        .flush()
        .map_err(|e| CalcError::file_error("flush csv", "<output>", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_core::export::{ExportLineItem, ExportMetadata, ExportTotals};
    use chrono::Utc;

    fn view() -> ExportView {
        ExportView {
            metadata: ExportMetadata {
                name: "فيلا".to_string(),
                code: "P-1".to_string(),
                project_type: "سكني".to_string(),
                area: 200.0,
                floor: 2,
                created: Utc::now(),
                modified: Utc::now(),
            },
            sections: Vec::new(),
            line_items: vec![ExportLineItem {
                main_item: "العزل".to_string(),
                sub_item: "سيكا 107 للحمامات".to_string(),
                quantity: 10.0,
                unit: "م2".to_string(),
                unit_price: 255.0,
                sell_price: 255.0,
                total: 2550.0,
            }],
            totals: ExportTotals {
                summary_total: 2550.0,
                ..ExportTotals::default()
            },
        }
    }

    #[test]
    fn test_csv_layout() {
        let mut out = Vec::new();
        write_csv(&view(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "record,group,name,unit,quantity,unit_price,total");
        assert_eq!(lines[1], "item,العزل,سيكا 107 للحمامات,م2,10.00,255.00,2550.00");
        assert!(lines.contains(&"total,,summary_total,,,,2550.00"));
        assert_eq!(lines.len(), 1 + 1 + 7);
    }
}
