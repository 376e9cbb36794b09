//! Dashboard rendering (HTML with an embedded Plotly figure).

pub mod chart;
pub mod page;

use anyhow::Context;
use chrono::NaiveDate;

use crate::color::SeriesPalette;
use crate::report::LocationReport;

/// Render a self-contained dashboard page for one location.
pub fn render_dashboard(report: &LocationReport, generated_on: NaiveDate) -> anyhow::Result<String> {
    let palette = SeriesPalette::default();

    let figure = chart::spending_figure(report, &palette);
    let figure_json = serde_json::to_string(&figure).context("serializing chart figure")?;
    let report_json = serde_json::to_string(report).context("serializing report data")?;

    Ok(page::render_page(
        report,
        &palette,
        &script_safe(&figure_json),
        &script_safe(&report_json),
        generated_on,
    ))
}

/// Output file name: `health_financing_dashboard_<location>.html`, lowercased
/// with spaces replaced by underscores.  Path separators are replaced too.
pub fn output_filename(location: &str) -> String {
    let slug: String = location
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("health_financing_dashboard_{slug}.html")
}

/// JSON inside `<script>` must not close the element early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ColumnSet, Estimate, FundingSource, SpendingRecord, SpendingTable};
    use crate::report::build_location_report;

    fn report(location: &str) -> LocationReport {
        let row = |year: i32, the: f64| {
            SpendingRecord::new(location, year)
                .with(FundingSource::Total, Estimate::new(Some(the), Some(the * 0.9), Some(the * 1.1)))
                .with(FundingSource::Government, Estimate::point(the * 0.7))
                .with(FundingSource::OutOfPocket, Estimate::point(the * 0.3))
        };
        let table = SpendingTable::from_records(
            vec![row(2003, 1_000_000.0), row(2021, 2_000_000.0)],
            ColumnSet::complete(),
        );
        build_location_report(&table, location).expect("present")
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")
    }

    #[test]
    fn filename_follows_location() {
        assert_eq!(output_filename("Canada"), "health_financing_dashboard_canada.html");
        assert_eq!(
            output_filename("United States of America"),
            "health_financing_dashboard_united_states_of_america.html"
        );
        assert_eq!(output_filename("A/B"), "health_financing_dashboard_a_b.html");
    }

    #[test]
    fn page_contains_cards_and_figure() {
        let html = render_dashboard(&report("Canada"), date()).expect("render");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Canada Health Financing"));
        assert!(html.contains("$2.0M"));
        assert!(html.contains("+100.0%"));
        assert!(html.contains("18 years"));
        assert!(html.contains("Funding Composition (2021)"));
        assert!(html.contains("Government: 70.0%"));
        assert!(html.contains("Out-of-Pocket: 30.0%"));
        assert!(!html.contains("Development Aid:"));
        assert!(html.contains("Plotly.newPlot('boxplot-chart'"));
        assert!(html.contains(r#"<script type="application/json" id="report-data">{"location":"Canada""#));
        assert!(html.contains("getElementById('report-data')"));
        assert!(html.contains("Generated on 2024-05-01"));
    }

    #[test]
    fn single_year_renders_not_available() {
        let table = SpendingTable::from_records(
            vec![SpendingRecord::new("Tuvalu", 2015).with(FundingSource::Total, Estimate::point(5.0))],
            ColumnSet::complete(),
        );
        let report = build_location_report(&table, "Tuvalu").expect("present");
        let html = render_dashboard(&report, date()).expect("render");
        assert!(html.contains("N/A"));
        assert!(html.contains("0 years"));
    }

    #[test]
    fn hostile_location_cannot_break_out_of_script() {
        let html = render_dashboard(&report("</script><b>x"), date()).expect("render");
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("&lt;/script&gt;&lt;b&gt;x"));
    }
}
