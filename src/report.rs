//! Merge the four time series and write the per-company workbook.
//!
//! Layout matches the analyst's template: company name in B1, a header
//! row underneath (Date / Blue / Red / Green, the chart's line colours),
//! data from row 3. Blue is NAV total return, Red is share-price total
//! return, Green is the discount to NAV.

use crate::morningstar::{HistoryPoint, SeriesBundle};
use anyhow::{bail, Context, Result};
use rust_xlsxwriter::Workbook;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One output row, keyed by observation date.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Observation date, `YYYY-MM-DD`.
    pub date: String,
    /// NAV cumulative return (Blue).
    pub nav_return: Option<f64>,
    /// Share-price cumulative return (Red).
    pub price_return: Option<f64>,
    /// Discount to NAV in percent (Green): `(price − nav) / nav × 100`.
    pub discount: Option<f64>,
}

fn by_date(series: &[HistoryPoint]) -> HashMap<&str, Option<f64>> {
    series
        .iter()
        .map(|p| (p.end_date.as_str(), p.value))
        .collect()
}

/// Inner-join the four series on date.
///
/// A row is emitted for each date present in all four series, in the
/// order of the NAV-return series. Missing or unparseable values leave
/// the corresponding cell empty rather than dropping the row.
pub fn build_rows(bundle: &SeriesBundle) -> Vec<ReportRow> {
    let price_return = by_date(&bundle.price_return);
    let nav = by_date(&bundle.nav);
    let price = by_date(&bundle.price);

    let mut rows = Vec::with_capacity(bundle.nav_return.len());
    for point in &bundle.nav_return {
        let date = point.end_date.as_str();
        let (Some(pr), Some(nav_level), Some(price_level)) =
            (price_return.get(date), nav.get(date), price.get(date))
        else {
            continue;
        };

        let discount = match (nav_level, price_level) {
            (Some(n), Some(p)) if *n != 0.0 => Some((p - n) / n * 100.0),
            _ => None,
        };

        rows.push(ReportRow {
            date: point.end_date.clone(),
            nav_return: point.value,
            price_return: *pr,
            discount,
        });
    }
    rows
}

/// The name becomes a file name; anything beyond a single path
/// component would land outside `out_dir`.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("invalid workbook name {name:?}");
    }
    Ok(())
}

/// Write one company's workbook into `out_dir`, returning its path.
pub fn write_workbook(out_dir: &Path, name: &str, rows: &[ReportRow]) -> Result<PathBuf> {
    validate_name(name)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    sheet.write_string(0, 1, name)?;
    sheet.write_string(1, 0, "Date")?;
    sheet.write_string(1, 1, "Blue")?;
    sheet.write_string(1, 2, "Red")?;
    sheet.write_string(1, 3, "Green")?;

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 2;
        sheet.write_string(r, 0, &row.date)?;
        if let Some(v) = row.nav_return {
            sheet.write_number(r, 1, v)?;
        }
        if let Some(v) = row.price_return {
            sheet.write_number(r, 2, v)?;
        }
        if let Some(v) = row.discount {
            sheet.write_number(r, 3, v)?;
        }
    }

    let path = out_dir.join(format!("{name}.xlsx"));
    workbook
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
