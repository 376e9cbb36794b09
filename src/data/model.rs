use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// First and last year retained by the loader (inclusive).
pub const STUDY_WINDOW: (i32, i32) = (2003, 2021);

// ---------------------------------------------------------------------------
// FundingSource – one spending series
// ---------------------------------------------------------------------------

/// The five spending series carried by the IHME table.
///
/// `Total` is the overall health expenditure; the other four are the funding
/// sources whose shares make up the composition breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FundingSource {
    #[serde(rename = "the")]
    Total,
    #[serde(rename = "ghes")]
    Government,
    #[serde(rename = "ppp")]
    PrepaidPrivate,
    #[serde(rename = "oop")]
    OutOfPocket,
    #[serde(rename = "dah")]
    DevelopmentAssistance,
}

impl FundingSource {
    /// All series in chart order.
    pub const ALL: [FundingSource; 5] = [
        FundingSource::Total,
        FundingSource::Government,
        FundingSource::PrepaidPrivate,
        FundingSource::OutOfPocket,
        FundingSource::DevelopmentAssistance,
    ];

    /// The four sources that make up total expenditure.
    pub const FUNDING: [FundingSource; 4] = [
        FundingSource::Government,
        FundingSource::PrepaidPrivate,
        FundingSource::OutOfPocket,
        FundingSource::DevelopmentAssistance,
    ];

    /// Column prefix in the source table (`the`, `ghes`, ...).
    pub fn key(self) -> &'static str {
        match self {
            FundingSource::Total => "the",
            FundingSource::Government => "ghes",
            FundingSource::PrepaidPrivate => "ppp",
            FundingSource::OutOfPocket => "oop",
            FundingSource::DevelopmentAssistance => "dah",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FundingSource::Total => "Total Health Expenditure",
            FundingSource::Government => "Government Health Expenditure",
            FundingSource::PrepaidPrivate => "Prepaid Private Plans",
            FundingSource::OutOfPocket => "Out-of-Pocket Spending",
            FundingSource::DevelopmentAssistance => "Development Assistance for Health",
        }
    }

    /// Short name used in the composition legend.
    pub fn short_label(self) -> &'static str {
        match self {
            FundingSource::Total => "Total",
            FundingSource::Government => "Government",
            FundingSource::PrepaidPrivate => "Private Plans",
            FundingSource::OutOfPocket => "Out-of-Pocket",
            FundingSource::DevelopmentAssistance => "Development Aid",
        }
    }

    pub fn mean_column(self) -> String {
        format!("{}_total_mean", self.key())
    }

    pub fn lower_column(self) -> String {
        format!("{}_total_lower", self.key())
    }

    pub fn upper_column(self) -> String {
        format!("{}_total_upper", self.key())
    }

    fn index(self) -> usize {
        match self {
            FundingSource::Total => 0,
            FundingSource::Government => 1,
            FundingSource::PrepaidPrivate => 2,
            FundingSource::OutOfPocket => 3,
            FundingSource::DevelopmentAssistance => 4,
        }
    }
}

impl fmt::Display for FundingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key().to_ascii_uppercase())
    }
}

// ---------------------------------------------------------------------------
// Estimate – mean with uncertainty interval
// ---------------------------------------------------------------------------

/// A point estimate with its uncertainty interval, in currency units.
/// Absent or NaN cells are stored as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Estimate {
    pub mean: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Estimate {
    pub fn new(mean: Option<f64>, lower: Option<f64>, upper: Option<f64>) -> Self {
        Estimate {
            mean: mean.filter(|v| !v.is_nan()),
            lower: lower.filter(|v| !v.is_nan()),
            upper: upper.filter(|v| !v.is_nan()),
        }
    }

    #[cfg(test)]
    pub fn point(mean: f64) -> Self {
        Estimate::new(Some(mean), None, None)
    }
}

// ---------------------------------------------------------------------------
// SpendingRecord – one row of the table
// ---------------------------------------------------------------------------

/// One row of the spending table, keyed by `(location_name, year)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingRecord {
    pub location_name: String,
    pub year: i32,
    estimates: [Estimate; 5],
}

impl SpendingRecord {
    pub fn new(location_name: impl Into<String>, year: i32) -> Self {
        SpendingRecord {
            location_name: location_name.into(),
            year,
            estimates: [Estimate::default(); 5],
        }
    }

    #[cfg(test)]
    pub fn with(mut self, source: FundingSource, estimate: Estimate) -> Self {
        self.set(source, estimate);
        self
    }

    pub fn set(&mut self, source: FundingSource, estimate: Estimate) {
        self.estimates[source.index()] = estimate;
    }

    pub fn estimate(&self, source: FundingSource) -> &Estimate {
        &self.estimates[source.index()]
    }

    pub fn mean(&self, source: FundingSource) -> Option<f64> {
        self.estimate(source).mean
    }
}

// ---------------------------------------------------------------------------
// ColumnSet – which optional columns the source actually carried
// ---------------------------------------------------------------------------

/// Presence of one series' columns in the source header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesColumns {
    pub mean: bool,
    /// Both `_lower` and `_upper` exist.
    pub bounds: bool,
}

/// Column presence for every series, resolved once at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnSet {
    series: [SeriesColumns; 5],
}

impl ColumnSet {
    /// Resolve presence from a list of header names.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let has = |name: String| headers.iter().any(|h| h.as_ref() == name);
        let mut set = ColumnSet::default();
        for source in FundingSource::ALL {
            set.series[source.index()] = SeriesColumns {
                mean: has(source.mean_column()),
                bounds: has(source.lower_column()) && has(source.upper_column()),
            };
        }
        set
    }

    /// Every column present; what the IHME export looks like.
    #[cfg(test)]
    pub fn complete() -> Self {
        ColumnSet {
            series: [SeriesColumns { mean: true, bounds: true }; 5],
        }
    }

    pub fn get(&self, source: FundingSource) -> SeriesColumns {
        self.series[source.index()]
    }
}

// ---------------------------------------------------------------------------
// SpendingTable – the loaded dataset
// ---------------------------------------------------------------------------

/// The filtered table plus the distinct location index.
#[derive(Debug, Clone)]
pub struct SpendingTable {
    /// Retained rows in source order.
    pub records: Vec<SpendingRecord>,
    pub columns: ColumnSet,
    /// Sorted, deduplicated location names.
    pub locations: Vec<String>,
}

impl SpendingTable {
    /// Build the location index from the retained records.
    pub fn from_records(records: Vec<SpendingRecord>, columns: ColumnSet) -> Self {
        let locations: Vec<String> = records
            .iter()
            .map(|r| r.location_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        SpendingTable {
            records,
            columns,
            locations,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LocationDataset – one location's rows
// ---------------------------------------------------------------------------

/// All rows of one location, stably sorted by year.
#[derive(Debug, Clone)]
pub struct LocationDataset {
    pub location_name: String,
    pub records: Vec<SpendingRecord>,
    pub columns: ColumnSet,
}

impl LocationDataset {
    pub fn earliest_year(&self) -> Option<i32> {
        self.records.first().map(|r| r.year)
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.records.last().map(|r| r.year)
    }

    /// First row in source order for `year`.
    pub fn first_for_year(&self, year: i32) -> Option<&SpendingRecord> {
        self.records.iter().find(|r| r.year == year)
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.dedup();
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_follow_ihme_layout() {
        assert_eq!(FundingSource::Total.mean_column(), "the_total_mean");
        assert_eq!(FundingSource::OutOfPocket.lower_column(), "oop_total_lower");
        assert_eq!(FundingSource::DevelopmentAssistance.upper_column(), "dah_total_upper");
    }

    #[test]
    fn nan_cells_become_none() {
        let e = Estimate::new(Some(f64::NAN), Some(1.0), None);
        assert_eq!(e.mean, None);
        assert_eq!(e.lower, Some(1.0));
    }

    #[test]
    fn bounds_require_both_columns() {
        let cols = ColumnSet::from_headers(&[
            "location_name",
            "year",
            "the_total_mean",
            "the_total_lower",
            "the_total_upper",
            "ghes_total_mean",
            "ghes_total_lower",
        ]);
        assert_eq!(cols.get(FundingSource::Total), SeriesColumns { mean: true, bounds: true });
        assert_eq!(cols.get(FundingSource::Government), SeriesColumns { mean: true, bounds: false });
        assert!(!cols.get(FundingSource::DevelopmentAssistance).mean);
    }

    #[test]
    fn locations_are_sorted_and_unique() {
        let records = vec![
            SpendingRecord::new("Kenya", 2003),
            SpendingRecord::new("Canada", 2003),
            SpendingRecord::new("Kenya", 2004),
        ];
        let table = SpendingTable::from_records(records, ColumnSet::complete());
        assert_eq!(table.locations, vec!["Canada", "Kenya"]);
        assert_eq!(table.len(), 3);
    }
}
