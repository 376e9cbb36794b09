use serde_json::{json, Value};

use crate::color::SeriesPalette;
use crate::report::{ChartSeries, LocationReport};

const FONT_FAMILY: &str = "Inter, sans-serif";
const GRID_COLOR: &str = "rgba(229, 231, 235, 0.5)";
const AXIS_LINE_COLOR: &str = "rgba(209, 213, 219, 0.8)";

// ---------------------------------------------------------------------------
// Plotly figure (box plot of spending by year)
// ---------------------------------------------------------------------------

/// Build the Plotly figure (`{ data, layout }`) for the spending box plot.
pub fn spending_figure(report: &LocationReport, palette: &SeriesPalette) -> Value {
    let data: Vec<Value> = report
        .series
        .iter()
        .map(|s| box_trace(s, palette))
        .collect();

    json!({
        "data": data,
        "layout": layout(&report.years),
    })
}

fn box_trace(series: &ChartSeries, palette: &SeriesPalette) -> Value {
    let source = series.source;
    let label = source.label();
    let color = palette.hex(source);

    let x: Vec<i32> = series.points.iter().map(|p| p.year).collect();
    let y: Vec<Option<f64>> = series.points.iter().map(|p| p.value).collect();

    // Hover reads the band from customdata; without bounds only the year.
    let (customdata, hovertemplate) = if series.has_bounds {
        let rows: Vec<Value> = series
            .points
            .iter()
            .map(|p| json!([p.lower, p.upper, p.year]))
            .collect();
        let template = format!(
            "<span style=\"color: white; font-weight: bold; font-family: {FONT_FAMILY};\">\
             Year: %{{customdata[2]}}<br>{label}<br>\
             Value: $%{{customdata[0]:.1f}}M - $%{{customdata[1]:.1f}}M<br>\
             Mean: $%{{y:.1f}}M<br></span><extra></extra>"
        );
        (rows, template)
    } else {
        let rows: Vec<Value> = series.points.iter().map(|p| json!([p.year])).collect();
        let template = format!(
            "<span style=\"color: white; font-weight: bold; font-family: {FONT_FAMILY};\">\
             Year: %{{customdata[0]}}<br>{label}<br>\
             Value: $%{{y:.1f}}M<br></span><extra></extra>"
        );
        (rows, template)
    };

    json!({
        "type": "box",
        "name": label,
        "x": x,
        "y": y,
        "marker": {
            "color": color,
            "size": 10,
            "line": { "width": 2, "color": "rgba(255, 255, 255, 0.8)" },
            "opacity": 0.8,
        },
        "line": { "color": color, "width": 4 },
        "fillcolor": palette.fill(source, 0.2),
        "hoverlabel": { "bgcolor": palette.outline(source) },
        "hovertemplate": hovertemplate,
        "customdata": customdata,
        "boxpoints": "all",
        "jitter": 0.2,
        "pointpos": 0,
        "boxmean": true,
        "whiskerwidth": 1.0,
        "notched": true,
        "notchwidth": 0.5,
        "quartilemethod": "linear",
    })
}

fn axis_title(text: &str) -> Value {
    json!({
        "text": text,
        "font": { "family": FONT_FAMILY, "size": 14, "color": "#111827" },
        "standoff": 15,
    })
}

fn layout(years: &[i32]) -> Value {
    let tick_font = json!({ "family": FONT_FAMILY, "size": 12, "color": "#374151" });
    json!({
        "height": 550,
        "autosize": true,
        "margin": { "t": 20, "b": 130, "l": 80, "r": 40 },
        "plot_bgcolor": "rgba(249, 250, 251, 0.5)",
        "paper_bgcolor": "rgba(0,0,0,0)",
        "boxmode": "group",
        "boxgap": 0.3,
        "boxgroupgap": 0.4,
        "font": { "family": FONT_FAMILY, "color": "#1F2937" },
        "legend": {
            "orientation": "h",
            "yanchor": "top",
            "y": -0.25,
            "xanchor": "center",
            "x": 0.5,
            "bgcolor": "rgba(255, 255, 255, 0.8)",
            "bordercolor": "rgba(229, 231, 235, 0.7)",
            "borderwidth": 1,
            "font": { "family": FONT_FAMILY, "size": 12, "color": "#1F2937" },
        },
        "xaxis": {
            "title": axis_title("Year"),
            "tickangle": 45,
            "tickmode": "array",
            "tickvals": years,
            "tickfont": tick_font,
            "showgrid": true,
            "gridcolor": GRID_COLOR,
            "showline": true,
            "linewidth": 1,
            "linecolor": AXIS_LINE_COLOR,
            "zeroline": false,
        },
        "yaxis": {
            "title": axis_title("Spending (Millions USD)"),
            "tickprefix": "$",
            "ticksuffix": "M",
            "tickfont": tick_font,
            "showgrid": true,
            "gridcolor": GRID_COLOR,
            "showline": true,
            "linewidth": 1,
            "linecolor": AXIS_LINE_COLOR,
            "zeroline": false,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FundingSource;
    use crate::report::series::SeriesPoint;
    use crate::report::{FundingComposition, SummaryStats};

    fn report(series: Vec<ChartSeries>) -> LocationReport {
        LocationReport {
            location: "Peru".into(),
            summary: SummaryStats {
                earliest_year: 2003,
                latest_year: 2004,
                year_span: 1,
                earliest_total: Some(1.0),
                latest_total: Some(2.0),
                percent_change: Some(100.0),
                avg_annual_growth: Some(100.0),
            },
            composition: FundingComposition {
                year: 2004,
                shares: vec![],
            },
            series,
            years: vec![2003, 2004],
        }
    }

    fn point(year: i32, value: f64, bounds: Option<(f64, f64)>) -> SeriesPoint {
        SeriesPoint {
            year,
            value: Some(value),
            lower: bounds.map(|b| b.0),
            upper: bounds.map(|b| b.1),
        }
    }

    #[test]
    fn one_box_trace_per_series() {
        let fig = spending_figure(
            &report(vec![
                ChartSeries {
                    source: FundingSource::Total,
                    has_bounds: true,
                    points: vec![point(2003, 1.0, Some((0.5, 1.5))), point(2004, 2.0, Some((1.0, 3.0)))],
                },
                ChartSeries {
                    source: FundingSource::OutOfPocket,
                    has_bounds: false,
                    points: vec![point(2003, 0.2, None)],
                },
            ]),
            &SeriesPalette::default(),
        );

        let data = fig["data"].as_array().expect("data array");
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["type"], "box");
        assert_eq!(data[0]["name"], "Total Health Expenditure");
        assert_eq!(data[0]["customdata"][1], json!([1.0, 3.0, 2004]));
        assert!(data[0]["hovertemplate"]
            .as_str()
            .expect("template")
            .contains("customdata[1]"));
        assert_eq!(data[1]["customdata"][0], json!([2003]));
        assert_eq!(data[1]["marker"]["color"], "#F59E0B");
        assert_eq!(fig["layout"]["xaxis"]["tickvals"], json!([2003, 2004]));
    }

    #[test]
    fn missing_values_serialize_as_null() {
        let fig = spending_figure(
            &report(vec![ChartSeries {
                source: FundingSource::DevelopmentAssistance,
                has_bounds: false,
                points: vec![SeriesPoint {
                    year: 2003,
                    value: None,
                    lower: None,
                    upper: None,
                }],
            }]),
            &SeriesPalette::default(),
        );
        assert_eq!(fig["data"][0]["y"], json!([null]));
    }
}
