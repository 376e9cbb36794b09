use std::path::Path;

use crate::data::error::LoadError;
use crate::data::filter::resolve_selection;
use crate::data::loader::load_file;
use crate::data::model::SpendingTable;
use crate::report::{build_location_report, LocationReport};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything one invocation works with: the table is loaded once, used
/// for a single selection, and dropped at exit.
pub struct Session {
    pub table: SpendingTable,
}

impl Session {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        Ok(Session {
            table: load_file(path)?,
        })
    }

    pub fn locations(&self) -> &[String] {
        &self.table.locations
    }

    /// Name or 1-based ordinal → location name.
    pub fn resolve(&self, input: &str) -> String {
        resolve_selection(self.locations(), input)
    }

    pub fn report_for(&self, location: &str) -> Option<LocationReport> {
        build_location_report(&self.table, location)
    }

    /// Numbered listing, one location per line.
    pub fn location_listing(&self) -> String {
        self.locations()
            .iter()
            .enumerate()
            .map(|(i, loc)| format!("  {}. {loc}\n", i + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ColumnSet, SpendingRecord};

    fn session() -> Session {
        Session {
            table: SpendingTable::from_records(
                vec![SpendingRecord::new("Peru", 2003), SpendingRecord::new("Chad", 2004)],
                ColumnSet::complete(),
            ),
        }
    }

    #[test]
    fn listing_is_numbered_from_one() {
        assert_eq!(session().location_listing(), "  1. Chad\n  2. Peru\n");
    }

    #[test]
    fn ordinal_and_name_give_same_report() {
        let s = session();
        let by_ordinal = s.report_for(&s.resolve("2"));
        let by_name = s.report_for("Peru");
        assert!(by_name.is_some());
        assert_eq!(by_ordinal, by_name);
    }
}
