use serde::Serialize;

use crate::data::model::{FundingSource, LocationDataset};

use super::MILLION;

// ---------------------------------------------------------------------------
// SummaryStats – the dashboard cards
// ---------------------------------------------------------------------------

/// Headline numbers for one location.
///
/// Growth figures are `None` when they are undefined: a missing or zero
/// baseline for both, and additionally a single-year span or a negative
/// ratio for the compound rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub earliest_year: i32,
    pub latest_year: i32,
    pub year_span: i32,
    pub earliest_total: Option<f64>,
    pub latest_total: Option<f64>,
    pub percent_change: Option<f64>,
    pub avg_annual_growth: Option<f64>,
}

impl SummaryStats {
    pub fn latest_total_millions(&self) -> Option<f64> {
        self.latest_total.map(|v| v / MILLION)
    }

    pub fn earliest_total_millions(&self) -> Option<f64> {
        self.earliest_total.map(|v| v / MILLION)
    }
}

/// Compute the cards from a location's rows.  `None` only for an empty
/// dataset.
pub fn summarize(ds: &LocationDataset) -> Option<SummaryStats> {
    let earliest_year = ds.earliest_year()?;
    let latest_year = ds.latest_year()?;
    let year_span = latest_year - earliest_year;

    let earliest_total = ds
        .first_for_year(earliest_year)
        .and_then(|r| r.mean(FundingSource::Total));
    let latest_total = ds
        .first_for_year(latest_year)
        .and_then(|r| r.mean(FundingSource::Total));

    Some(SummaryStats {
        earliest_year,
        latest_year,
        year_span,
        earliest_total,
        latest_total,
        percent_change: percent_change(earliest_total, latest_total),
        avg_annual_growth: compound_growth(earliest_total, latest_total, year_span),
    })
}

/// `(latest - earliest) / earliest * 100`.
pub fn percent_change(earliest: Option<f64>, latest: Option<f64>) -> Option<f64> {
    let (earliest, latest) = (earliest?, latest?);
    if earliest == 0.0 {
        return None;
    }
    Some((latest - earliest) / earliest * 100.0).filter(|v| v.is_finite())
}

/// Compound annual growth rate in percent.
pub fn compound_growth(earliest: Option<f64>, latest: Option<f64>, years: i32) -> Option<f64> {
    let (earliest, latest) = (earliest?, latest?);
    if years <= 0 || earliest == 0.0 {
        return None;
    }
    let ratio = latest / earliest;
    if ratio < 0.0 {
        return None;
    }
    Some((ratio.powf(1.0 / years as f64) - 1.0) * 100.0).filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// FundingComposition – latest-year shares
// ---------------------------------------------------------------------------

/// One funding source's contribution in the latest year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingShare {
    pub source: FundingSource,
    pub value: f64,
    /// Share of total health expenditure; `None` when THE is missing or zero.
    pub percent: Option<f64>,
}

/// Shares of the four funding sources for the latest year.  Sources with a
/// missing value are left out rather than counted as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingComposition {
    pub year: i32,
    pub shares: Vec<FundingShare>,
}

impl FundingComposition {
    pub fn get(&self, source: FundingSource) -> Option<&FundingShare> {
        self.shares.iter().find(|s| s.source == source)
    }

    /// Sum of the sources that reported a value.
    pub fn total_specified(&self) -> f64 {
        self.shares.iter().map(|s| s.value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

pub fn funding_composition(ds: &LocationDataset) -> Option<FundingComposition> {
    let year = ds.latest_year()?;
    let row = ds.first_for_year(year)?;
    let total = row.mean(FundingSource::Total).filter(|t| *t != 0.0);

    let shares = FundingSource::FUNDING
        .iter()
        .filter(|&&source| ds.columns.get(source).mean)
        .filter_map(|&source| {
            let value = row.mean(source)?;
            Some(FundingShare {
                source,
                value,
                percent: total.map(|t| value / t * 100.0),
            })
        })
        .collect();

    Some(FundingComposition { year, shares })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ColumnSet, Estimate, SpendingRecord};

    fn dataset(records: Vec<SpendingRecord>) -> LocationDataset {
        LocationDataset {
            location_name: records[0].location_name.clone(),
            records,
            columns: ColumnSet::complete(),
        }
    }

    fn the(year: i32, value: f64) -> SpendingRecord {
        SpendingRecord::new("Canada", year).with(FundingSource::Total, Estimate::point(value))
    }

    #[test]
    fn canada_doubles_over_eighteen_years() {
        let stats = summarize(&dataset(vec![the(2003, 1_000_000.0), the(2021, 2_000_000.0)]))
            .expect("stats");
        assert_eq!(stats.year_span, 18);
        assert!((stats.percent_change.expect("defined") - 100.0).abs() < 1e-9);
        let expected = (2f64.powf(1.0 / 18.0) - 1.0) * 100.0;
        let cagr = stats.avg_annual_growth.expect("defined");
        assert!((cagr - expected).abs() < 1e-9);
        assert!((cagr - 3.926).abs() < 1e-3);
        assert_eq!(stats.latest_total_millions(), Some(2.0));
        assert_eq!(stats.earliest_total_millions(), Some(1.0));
    }

    #[test]
    fn single_year_has_no_growth_rate() {
        let stats = summarize(&dataset(vec![the(2010, 5.0)])).expect("stats");
        assert_eq!(stats.year_span, 0);
        assert_eq!(stats.percent_change, Some(0.0));
        assert_eq!(stats.avg_annual_growth, None);
    }

    #[test]
    fn zero_baseline_is_undefined_not_infinite() {
        let stats = summarize(&dataset(vec![the(2003, 0.0), the(2010, 5.0)])).expect("stats");
        assert_eq!(stats.percent_change, None);
        assert_eq!(stats.avg_annual_growth, None);
    }

    #[test]
    fn decline_is_negative() {
        let change = percent_change(Some(200.0), Some(150.0)).expect("defined");
        assert!((change + 25.0).abs() < 1e-12);
        assert!(compound_growth(Some(200.0), Some(150.0), 5).expect("defined") < 0.0);
        assert_eq!(compound_growth(Some(-1.0), Some(1.0), 5), None);
    }

    #[test]
    fn composition_skips_missing_sources() {
        let latest = the(2021, 1000.0)
            .with(FundingSource::Government, Estimate::point(600.0))
            .with(FundingSource::PrepaidPrivate, Estimate::point(100.0))
            .with(FundingSource::OutOfPocket, Estimate::point(250.0));
        let comp = funding_composition(&dataset(vec![the(2003, 500.0), latest])).expect("comp");
        assert_eq!(comp.year, 2021);
        assert_eq!(comp.shares.len(), 3);
        assert!(comp.get(FundingSource::DevelopmentAssistance).is_none());
        assert_eq!(comp.get(FundingSource::Government).and_then(|s| s.percent), Some(60.0));
        assert_eq!(comp.total_specified(), 950.0);
    }

    #[test]
    fn composition_percentages_stay_within_total() {
        let latest = the(2021, 1000.0)
            .with(FundingSource::Government, Estimate::point(500.0))
            .with(FundingSource::PrepaidPrivate, Estimate::point(100.0))
            .with(FundingSource::OutOfPocket, Estimate::point(300.0))
            .with(FundingSource::DevelopmentAssistance, Estimate::point(100.0));
        let comp = funding_composition(&dataset(vec![latest])).expect("comp");
        let sum: f64 = comp.shares.iter().filter_map(|s| s.percent).sum();
        assert_eq!(comp.shares.len(), 4);
        assert!(sum <= 100.0 + 1e-9);
    }

    #[test]
    fn composition_without_total_keeps_values_only() {
        let latest = SpendingRecord::new("Canada", 2021)
            .with(FundingSource::Government, Estimate::point(10.0));
        let comp = funding_composition(&dataset(vec![latest])).expect("comp");
        assert_eq!(comp.shares.len(), 1);
        assert_eq!(comp.shares[0].percent, None);
    }

    #[test]
    fn duplicate_year_uses_first_row() {
        let stats = summarize(&dataset(vec![
            the(2003, 100.0),
            the(2003, 999.0),
            the(2004, 200.0),
        ]))
        .expect("stats");
        assert_eq!(stats.earliest_total, Some(100.0));
        assert_eq!(stats.percent_change, Some(100.0));
    }
}
