use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

use crate::color::SeriesPalette;
use crate::data::model::FundingSource;
use crate::report::{FundingComposition, FundingShare, LocationReport, SummaryStats};

// ---------------------------------------------------------------------------
// HTML page
// ---------------------------------------------------------------------------

/// Assemble the full page.  `figure_json` and `report_json` must already be
/// safe to embed in a `<script>` element.
pub fn render_page(
    report: &LocationReport,
    palette: &SeriesPalette,
    figure_json: &str,
    report_json: &str,
    generated_on: NaiveDate,
) -> String {
    let location = html_escape(&report.location);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{location} Health Financing</title>
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap" rel="stylesheet">
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <style>{css}</style>
</head>
<body>
    <div class="dashboard-container">
        {header}
        {cards}
        {composition}
        {chart}
        {footer}
    </div>
    <script type="application/json" id="report-data">{report_json}</script>
    <script>{js}</script>
</body>
</html>"#,
        css = inline_css(),
        header = render_header(&location, &report.summary),
        cards = render_cards(&report.summary),
        composition = render_composition(&report.composition, palette),
        chart = render_chart_section(report, palette),
        footer = render_footer(generated_on),
        js = inline_javascript(figure_json),
    )
}

fn render_header(location: &str, summary: &SummaryStats) -> String {
    format!(
        r#"<header class="dashboard-header">
            <span class="dashboard-location-badge">{location}</span>
            <h1 class="dashboard-title">{location} Health Financing</h1>
            <p class="dashboard-subtitle">Health spending by funding source,
                <span class="time-period">{first}–{last}</span></p>
        </header>"#,
        first = summary.earliest_year,
        last = summary.latest_year,
    )
}

fn render_cards(summary: &SummaryStats) -> String {
    let (change_text, change_class) = signed_percent(summary.percent_change);
    let (growth_text, growth_class) = signed_percent(summary.avg_annual_growth);

    let cards = [
        stat_card(
            "Total Health Expenditure",
            &money_millions(summary.latest_total_millions()),
            "",
            &format!("Recorded in {}", summary.latest_year),
        ),
        stat_card(
            "Total Change",
            &change_text,
            change_class,
            &format!(
                "Since {} ({})",
                summary.earliest_year,
                money_millions(summary.earliest_total_millions())
            ),
        ),
        stat_card(
            "Avg. Annual Growth",
            &growth_text,
            growth_class,
            "Compound annual rate",
        ),
        stat_card(
            "Analysis Period",
            &format!("{} years", summary.year_span),
            "",
            &format!("{} to {}", summary.earliest_year, summary.latest_year),
        ),
    ];

    format!(r#"<section class="stat-grid">{}</section>"#, cards.join(""))
}

fn stat_card(title: &str, value: &str, value_class: &str, subtitle: &str) -> String {
    format!(
        r#"<div class="stat-card slide-up">
                <div class="stat-card-title">{title}</div>
                <div class="stat-card-value {value_class}">{value}</div>
                <div class="stat-card-subtitle">{subtitle}</div>
            </div>"#
    )
}

fn render_composition(composition: &FundingComposition, palette: &SeriesPalette) -> String {
    if composition.is_empty() {
        return format!(
            r#"<section class="chart-container"><h2 class="chart-title">Funding Composition ({})</h2>
            <p class="muted">No funding source data reported for this year.</p></section>"#,
            composition.year
        );
    }

    let bar: String = composition
        .shares
        .iter()
        .map(|s| {
            format!(
                r#"<div class="funding-bar-item" style="width: {width:.2}%; background-color: {color}" title="{label}"></div>"#,
                width = s.percent.unwrap_or(0.0).clamp(0.0, 100.0),
                color = palette.hex(s.source),
                label = s.source.short_label(),
            )
        })
        .collect();

    let legend: String = FundingSource::FUNDING
        .iter()
        .filter_map(|&source| composition.get(source))
        .map(|s| legend_item(s, palette))
        .collect();

    format!(
        r#"<section class="chart-container">
            <h2 class="chart-title">Funding Composition ({year})</h2>
            <div class="funding-bar">{bar}</div>
            <div class="funding-legend">{legend}</div>
            <p class="muted">Reported sources total {total}.</p>
        </section>"#,
        year = composition.year,
        total = money_millions(Some(composition.total_specified() / crate::report::MILLION)),
    )
}

fn legend_item(share: &FundingShare, palette: &SeriesPalette) -> String {
    let pct = share
        .percent
        .map(|p| format!("{p:.1}%"))
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        r#"<div class="funding-legend-item"><span class="funding-legend-color" style="background-color: {color}"></span><span>{label}: {pct}</span></div>"#,
        color = palette.hex(share.source),
        label = share.source.short_label(),
    )
}

fn render_chart_section(report: &LocationReport, palette: &SeriesPalette) -> String {
    let tags: String = report
        .series
        .iter()
        .map(|s| {
            format!(
                r#"<span class="source-tag" style="border-color: {color}; color: {color}">{label}</span>"#,
                color = palette.hex(s.source),
                label = s.source,
            )
        })
        .collect();

    format!(
        r#"<section class="chart-container">
            <h2 class="chart-title">Spending Trends by Funding Source</h2>
            <div class="source-tags">{tags}</div>
            <div id="boxplot-chart"></div>
        </section>"#
    )
}

fn render_footer(generated_on: NaiveDate) -> String {
    format!(
        r#"<footer class="footer">
            <p>Source: IHME Financing Global Health. Values in millions of USD.</p>
            <p>Generated on {}</p>
        </footer>"#,
        generated_on.format("%Y-%m-%d")
    )
}

fn inline_css() -> &'static str {
    r#"
        body { font-family: Inter, sans-serif; background: #F3F4F6; color: #1F2937; margin: 0; }
        h1, h2 { font-weight: 700; color: #111827; }
        .dashboard-container { max-width: 1200px; margin: 0 auto; padding: 2rem 1.5rem; }
        .dashboard-header { margin-bottom: 2rem; }
        .dashboard-title { font-size: 2.25rem; margin: 0.5rem 0; }
        .dashboard-subtitle { color: #6B7280; margin: 0; }
        .dashboard-location-badge { display: inline-block; background: #DBEAFE; color: #1D4ED8; border-radius: 999px; padding: 0.25rem 0.75rem; font-weight: 600; }
        .time-period { font-weight: 600; color: #374151; }
        .stat-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 1rem; margin-bottom: 1.5rem; }
        .stat-card { background: white; border-radius: 12px; padding: 1.25rem; box-shadow: 0 1px 3px rgba(0,0,0,0.08); transition: transform 0.2s; }
        .stat-card:hover { transform: translateY(-3px); }
        .stat-card-title { font-size: 0.85rem; text-transform: uppercase; letter-spacing: 0.05em; color: #6B7280; }
        .stat-card-value { font-size: 1.9rem; font-weight: 700; margin: 0.5rem 0; }
        .stat-card-subtitle { font-size: 0.85rem; color: #9CA3AF; }
        .trend-positive { color: #10B981; }
        .trend-negative { color: #EF4444; }
        .chart-container { background: white; border-radius: 12px; padding: 1.5rem; margin-bottom: 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
        .chart-title { font-size: 1.25rem; margin-top: 0; }
        .source-tags { display: flex; flex-wrap: wrap; gap: 0.5rem; margin-bottom: 1rem; }
        .source-tag { border: 1px solid; border-radius: 999px; padding: 0.15rem 0.6rem; font-size: 0.8rem; font-weight: 600; }
        .funding-bar { display: flex; height: 28px; border-radius: 8px; overflow: hidden; background: #E5E7EB; }
        .funding-bar-item { height: 100%; transition: width 1s ease-out; }
        .funding-legend { display: flex; flex-wrap: wrap; gap: 1rem; margin-top: 1rem; }
        .funding-legend-item { display: flex; align-items: center; gap: 0.4rem; font-size: 0.9rem; }
        .funding-legend-color { width: 12px; height: 12px; border-radius: 3px; display: inline-block; }
        .muted { color: #6B7280; font-size: 0.85rem; }
        .footer { text-align: center; color: #9CA3AF; font-size: 0.8rem; padding: 1rem 0; }
        .slide-up { animation: slideUp 0.5s ease-out both; }
        @keyframes slideUp { from { transform: translateY(20px); opacity: 0; } to { transform: translateY(0); opacity: 1; } }
        @media (max-width: 768px) { .dashboard-title { font-size: 1.6rem; } .stat-card-value { font-size: 1.5rem; } }
    "#
}

/// The chart export name comes from the `report-data` element.
fn inline_javascript(figure_json: &str) -> String {
    format!(
        r#"
        const report = JSON.parse(document.getElementById('report-data').textContent);
        const plotData = {figure_json};
        Plotly.newPlot('boxplot-chart', plotData.data, plotData.layout, {{
            responsive: true,
            displaylogo: false,
            toImageButtonOptions: {{ format: 'png', filename: 'health_financing_' + report.location, scale: 2 }}
        }});
    "#
    )
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// `$1,234.5M`, `-$1,234.5M`, or `N/A`.
pub fn money_millions(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };
    let tenths = (v * 10.0).round() as i64;
    let sign = if tenths < 0 { "-" } else { "" };
    let tenths = tenths.unsigned_abs();
    format!(
        "{sign}${}.{}M",
        (tenths / 10).to_formatted_string(&Locale::en),
        tenths % 10
    )
}

/// Signed percentage with its trend class; undefined values read `N/A`.
pub fn signed_percent(value: Option<f64>) -> (String, &'static str) {
    match value {
        Some(v) if v >= 0.0 => (format!("+{v:.1}%"), "trend-positive"),
        Some(v) => (format!("{v:.1}%"), "trend-negative"),
        None => ("N/A".to_string(), ""),
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
