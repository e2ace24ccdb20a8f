//! Flat export rows for CSV and JSON downloads.
//!
//! Downstream of grouping: each missing book becomes one row per group it
//! was attributed to, with the full column set the download formats share.

use serde::Serialize;

use crate::{error::Result, types::SeriesGroup};

/// One export row; field order is the CSV column order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub series: String,
    pub series_asin: String,
    pub title: String,
    /// All series memberships, "Name #pos" joined with ", "
    pub all_series: String,
    pub subtitle: String,
    pub authors: String,
    pub narrators: String,
    pub publisher: String,
    pub genres: String,
    pub asin: String,
    pub sku: String,
    pub sku_group: String,
    pub isbn: String,
    pub region: String,
    pub book_format: String,
}

const COLUMNS: &[&str] = &[
    "series",
    "seriesAsin",
    "title",
    "allSeries",
    "subtitle",
    "authors",
    "narrators",
    "publisher",
    "genres",
    "asin",
    "sku",
    "skuGroup",
    "isbn",
    "region",
    "bookFormat",
];

/// Flattens series groups into export rows, preserving group and book order.
pub fn rows_from_groups(groups: &[SeriesGroup]) -> Vec<ExportRow> {
    let mut rows = Vec::new();
    for group in groups {
        for book in &group.books {
            let all_series = book
                .series
                .iter()
                .map(|m| match &m.position {
                    Some(position) => format!("{} #{}", m.name, position),
                    None => m.name.clone(),
                })
                .collect::<Vec<_>>()
                .join(", ");

            rows.push(ExportRow {
                series: group.series.clone(),
                series_asin: book.series_asin.clone().unwrap_or_default(),
                title: book.title.clone(),
                all_series,
                subtitle: book.subtitle.clone().unwrap_or_default(),
                authors: book.authors.join(", "),
                narrators: book.narrators.join(", "),
                publisher: book.publisher.clone().unwrap_or_default(),
                genres: book.genres.join(", "),
                asin: book.asin.clone(),
                sku: book.sku.clone().unwrap_or_default(),
                sku_group: book.sku_group.clone().unwrap_or_default(),
                isbn: book.isbn.clone().unwrap_or_default(),
                region: book.region.clone(),
                book_format: book.book_format.clone().unwrap_or_default(),
            });
        }
    }
    rows
}

/// Serializes export rows as a JSON array.
pub fn to_json(rows: &[ExportRow]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Serializes export rows as CSV with a header line.
///
/// Fields containing commas, quotes, or newlines are quoted per RFC 4180.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(","));
    out.push('\n');

    for row in rows {
        let fields = [
            &row.series,
            &row.series_asin,
            &row.title,
            &row.all_series,
            &row.subtitle,
            &row.authors,
            &row.narrators,
            &row.publisher,
            &row.genres,
            &row.asin,
            &row.sku,
            &row.sku_group,
            &row.isbn,
            &row.region,
            &row.book_format,
        ];
        let line = fields
            .iter()
            .map(|f| csv_escape(f.as_str()))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookRecord, SeriesMembership};

    fn group_with_one_book() -> SeriesGroup {
        SeriesGroup {
            series: "Broken Earth".to_string(),
            books: vec![BookRecord {
                asin: "A1".to_string(),
                title: "The Obelisk Gate".to_string(),
                region: "us".to_string(),
                series_asin: Some("S1".to_string()),
                authors: vec!["N. K. Jemisin".to_string()],
                series: vec![SeriesMembership::new("Broken Earth", "2")],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn rows_carry_group_attribution_and_joined_fields() {
        let rows = rows_from_groups(&[group_with_one_book()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].series, "Broken Earth");
        assert_eq!(rows[0].series_asin, "S1");
        assert_eq!(rows[0].all_series, "Broken Earth #2");
    }

    #[test]
    fn csv_has_header_and_quotes_embedded_commas() {
        let mut group = group_with_one_book();
        group.books[0].title = "One, Two".to_string();
        let csv = to_csv(&rows_from_groups(&[group]));

        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("series,seriesAsin,title,allSeries"));
        assert!(lines.next().unwrap().contains("\"One, Two\""));
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = to_json(&rows_from_groups(&[group_with_one_book()])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value[0].get("seriesAsin").is_some());
        assert!(value[0].get("bookFormat").is_some());
    }
}
