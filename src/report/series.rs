use serde::Serialize;

use crate::data::model::{FundingSource, LocationDataset};

use super::MILLION;

/// One observation of a series, already scaled to millions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// Everything the chart needs for one spending series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub source: FundingSource,
    /// Both bound columns exist, so points carry a confidence band.
    pub has_bounds: bool,
    pub points: Vec<SeriesPoint>,
}

/// Build the chart series in display order.
///
/// A series whose mean column is absent from the table is skipped.  Every
/// row contributes a point, duplicates included.
pub fn build_series(ds: &LocationDataset) -> Vec<ChartSeries> {
    FundingSource::ALL
        .iter()
        .filter(|&&source| ds.columns.get(source).mean)
        .map(|&source| {
            let has_bounds = ds.columns.get(source).bounds;
            let points = ds
                .records
                .iter()
                .map(|r| {
                    let e = r.estimate(source);
                    let scaled = |v: Option<f64>| v.map(|x| x / MILLION);
                    SeriesPoint {
                        year: r.year,
                        value: scaled(e.mean),
                        lower: if has_bounds { scaled(e.lower) } else { None },
                        upper: if has_bounds { scaled(e.upper) } else { None },
                    }
                })
                .collect();
            ChartSeries {
                source,
                has_bounds,
                points,
            }
        })
        .collect()
}
