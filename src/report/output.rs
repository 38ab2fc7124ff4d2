use serde_json::json;
use serde_json::Value as JSValue;

use survey_tables::{Cell, ColumnKey, ResultTable};

fn cell_to_json(cell: &Cell) -> JSValue {
    match cell {
        Cell::Integer(i) => json!(i),
        Cell::Decimal(f) => json!(f),
        Cell::NoData => JSValue::Null,
        Cell::Text(s) => json!(s),
    }
}

pub fn table_to_json(table: &ResultTable) -> JSValue {
    let columns: Vec<JSValue> = table
        .columns
        .iter()
        .map(|c| json!({"group": c.group, "label": c.label}))
        .collect();
    let rows: Vec<JSValue> = table
        .rows
        .iter()
        .map(|r| {
            let cells: Vec<JSValue> = r.cells.iter().map(cell_to_json).collect();
            json!({"label": r.label, "cells": cells})
        })
        .collect();
    json!({
        "name": table.name,
        "axis": table.axis_name,
        "columns": columns,
        "rows": rows
    })
}

pub fn build_summary_js(title: &str, tables: &[ResultTable]) -> JSValue {
    let tables: Vec<JSValue> = tables.iter().map(table_to_json).collect();
    json!({ "title": title, "tables": tables })
}

fn escape(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            c => res.push(c),
        }
    }
    res
}

fn cell_to_html(cell: &Cell) -> String {
    match cell {
        Cell::Integer(i) => i.to_string(),
        Cell::Decimal(f) => format!("{:.2}", f),
        Cell::NoData => "NaN".to_string(),
        Cell::Text(s) => escape(s),
    }
}

// Consecutive columns of the same group share a header cell.
fn group_spans(columns: &[ColumnKey]) -> Vec<(String, usize)> {
    let mut spans: Vec<(String, usize)> = Vec::new();
    for c in columns.iter() {
        let g = c.group.clone().unwrap_or_default();
        let same_group = spans.last().map(|(last, _)| *last == g).unwrap_or(false);
        match spans.last_mut() {
            Some(last) if same_group => last.1 += 1,
            _ => spans.push((g, 1)),
        }
    }
    spans
}

pub fn table_to_html(table: &ResultTable) -> String {
    let mut res = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n");
    let axis = escape(table.axis_name.as_deref().unwrap_or(""));
    if table.columns.iter().any(|c| c.group.is_some()) {
        res.push_str("    <tr>\n      <th></th>\n");
        for (group, span) in group_spans(&table.columns) {
            res.push_str(&format!(
                "      <th colspan=\"{}\" halign=\"left\">{}</th>\n",
                span,
                escape(&group)
            ));
        }
        res.push_str("    </tr>\n");
    }
    res.push_str(&format!("    <tr>\n      <th>{}</th>\n", axis));
    for c in table.columns.iter() {
        res.push_str(&format!("      <th>{}</th>\n", escape(&c.label)));
    }
    res.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for row in table.rows.iter() {
        res.push_str(&format!("    <tr>\n      <th>{}</th>\n", escape(&row.label)));
        for cell in row.cells.iter() {
            res.push_str(&format!("      <td>{}</td>\n", cell_to_html(cell)));
        }
        res.push_str("    </tr>\n");
    }
    res.push_str("  </tbody>\n</table>\n");
    res
}

/// A standalone page with every table under its name.
pub fn render_html(title: &str, tables: &[ResultTable]) -> String {
    let mut res = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n",
        escape(title),
        escape(title)
    );
    for table in tables.iter() {
        res.push_str(&format!("<h2>{}</h2>\n", escape(&table.name)));
        res.push_str(&table_to_html(table));
    }
    res.push_str("</body>\n</html>\n");
    res
}
