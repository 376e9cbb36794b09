use super::model::{LocationDataset, SpendingTable};

// ---------------------------------------------------------------------------
// Location selection
// ---------------------------------------------------------------------------

/// Turn user input into a location name.
///
/// * All digits and within `1..=locations.len()` → that entry of the sorted
///   list (1-based, as printed by the listing).
/// * Anything else → the input itself, trimmed.  Whether it exists is decided
///   later by [`select_location`].
pub fn resolve_selection(locations: &[String], input: &str) -> String {
    let input = input.trim();
    if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = input.parse::<usize>() {
            if (1..=locations.len()).contains(&n) {
                return locations[n - 1].clone();
            }
        }
    }
    input.to_string()
}

/// Extract the rows of one location (case-sensitive exact match), stably
/// sorted by year.  `None` when the location has no rows.
pub fn select_location(table: &SpendingTable, location: &str) -> Option<LocationDataset> {
    let mut records: Vec<_> = table
        .records
        .iter()
        .filter(|r| r.location_name == location)
        .cloned()
        .collect();

    if records.is_empty() {
        return None;
    }
    records.sort_by_key(|r| r.year);

    Some(LocationDataset {
        location_name: location.to_string(),
        records,
        columns: table.columns,
    })
}
