use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::report::RecommendationReport;

pub struct ExportSummary {
    pub sheets: usize,
    pub rows: usize,
}

enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

/// Write one worksheet per report (named after its sub-role) plus a `Query`
/// sheet describing what was run.
pub fn export_reports(path: &Path, reports: &[RecommendationReport]) -> Result<ExportSummary> {
    let mut workbook = Workbook::new();
    let mut rows_written = 0usize;

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Query")?;
        let mut rows = vec![vec![
            Cell::Text("Club".to_string()),
            Cell::Text("Role".to_string()),
            Cell::Text("Results".to_string()),
            Cell::Text("Generated".to_string()),
        ]];
        let generated = Local::now().format("%Y-%m-%d %H:%M").to_string();
        for report in reports {
            rows.push(vec![
                Cell::Text(report.club.clone()),
                Cell::Text(report.role.code().to_string()),
                Cell::Number(report.results.len() as f64),
                Cell::Text(generated.clone()),
            ]);
        }
        write_rows(sheet, &rows)?;
    }

    for report in reports {
        let sheet = workbook.add_worksheet();
        sheet.set_name(report.role.code())?;
        let rows = report_rows(report);
        rows_written += rows.len().saturating_sub(1);
        write_rows(sheet, &rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportSummary {
        sheets: reports.len() + 1,
        rows: rows_written,
    })
}

fn report_rows(report: &RecommendationReport) -> Vec<Vec<Cell>> {
    let mut header = vec![
        Cell::Text("Rank".to_string()),
        Cell::Text("Player".to_string()),
        Cell::Text("Nation".to_string()),
        Cell::Text("Club".to_string()),
        Cell::Text("Age".to_string()),
        Cell::Text("Fit %".to_string()),
        Cell::Text("Key Feature".to_string()),
        Cell::Text("Key Value".to_string()),
    ];
    header.extend(report.display_columns.iter().map(|c| Cell::Text(c.clone())));

    let mut rows = vec![header];
    for rec in &report.results {
        let mut row = vec![
            Cell::Number(rec.rank as f64),
            Cell::Text(rec.player.clone()),
            Cell::Text(rec.nation.clone()),
            rec.club.clone().map(Cell::Text).unwrap_or(Cell::Empty),
            rec.age.map(|a| Cell::Number(a as f64)).unwrap_or(Cell::Text("N/A".to_string())),
            Cell::Number(rec.fit_cosine),
            Cell::Text(rec.key_feature.clone()),
            rec.key_feature_value.map(Cell::Number).unwrap_or(Cell::Empty),
        ];
        row.extend(
            rec.display_stats
                .iter()
                .map(|s| s.value.map(Cell::Number).unwrap_or(Cell::Empty)),
        );
        rows.push(row);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match cell {
                Cell::Text(value) => worksheet.write_string(r, c, value),
                Cell::Number(value) => worksheet.write_number(r, c, *value),
                Cell::Empty => continue,
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
