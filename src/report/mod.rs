//! Metrics and chart series for one location.
//!
//! Everything here is a pure function of the loaded table; the renderer only
//! ever sees a [`LocationReport`].

pub mod series;
pub mod summary;

use serde::Serialize;

use crate::data::filter::select_location;
use crate::data::model::{LocationDataset, SpendingTable};

pub use series::ChartSeries;
pub use summary::{FundingComposition, FundingShare, SummaryStats};

/// Currency units per million.
pub const MILLION: f64 = 1_000_000.0;

/// View model for one location's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationReport {
    pub location: String,
    pub summary: SummaryStats,
    pub composition: FundingComposition,
    pub series: Vec<ChartSeries>,
    /// Distinct years, ascending; the chart's x ticks.
    pub years: Vec<i32>,
}

impl LocationReport {
    pub fn from_dataset(ds: &LocationDataset) -> Option<Self> {
        Some(LocationReport {
            location: ds.location_name.clone(),
            summary: summary::summarize(ds)?,
            composition: summary::funding_composition(ds)?,
            series: series::build_series(ds),
            years: ds.years(),
        })
    }
}

/// Build the report for `location` (exact, case-sensitive).  `None` when the
/// table has no rows for it.
pub fn build_location_report(table: &SpendingTable, location: &str) -> Option<LocationReport> {
    let ds = select_location(table, location)?;
    LocationReport::from_dataset(&ds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ColumnSet, Estimate, FundingSource, SpendingRecord};

    fn table() -> SpendingTable {
        let rec = |loc: &str, year: i32, the: f64, dah: Option<f64>| {
            SpendingRecord::new(loc, year)
                .with(FundingSource::Total, Estimate::point(the))
                .with(FundingSource::Government, Estimate::point(the * 0.5))
                .with(FundingSource::DevelopmentAssistance, Estimate::new(dah, None, None))
        };
        SpendingTable::from_records(
            vec![
                rec("Canada", 2021, 2_000_000.0, None),
                rec("Malawi", 2003, 10.0, Some(4.0)),
                rec("Canada", 2003, 1_000_000.0, None),
                rec("Malawi", 2004, 12.0, Some(5.0)),
            ],
            ColumnSet::complete(),
        )
    }

    #[test]
    fn unknown_location_is_none() {
        assert!(build_location_report(&table(), "Narnia").is_none());
        assert!(build_location_report(&table(), "").is_none());
    }

    #[test]
    fn report_covers_all_parts() {
        let report = build_location_report(&table(), "Canada").expect("present");
        assert_eq!(report.location, "Canada");
        assert_eq!(report.years, vec![2003, 2021]);
        assert_eq!(report.summary.percent_change, Some(100.0));
        assert_eq!(report.composition.year, 2021);
        assert!(report.composition.get(FundingSource::DevelopmentAssistance).is_none());
        assert_eq!(report.series.len(), 5);
        assert_eq!(report.series[0].points[0].value, Some(1.0));
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let t = table();
        let a = build_location_report(&t, "Malawi").expect("present");
        let b = build_location_report(&t, "Malawi").expect("present");
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.composition, b.composition);
        assert_eq!(a, b);
    }
}
