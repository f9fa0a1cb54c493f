use chrono::NaiveDate;

use super::model::{StationDataset, StationRecord};

// ---------------------------------------------------------------------------
// Filter inputs
// ---------------------------------------------------------------------------

/// Geographic rectangle currently visible on the map (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Viewport {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.west <= lon && lon <= self.east && self.south <= lat && lat <= self.north
    }
}

/// Upper bound set by the time control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    Date(NaiveDate),
    Year(i32),
}

/// Which consumer the filtered list is for.
///
/// The year comparison differs between the two: the map shows stations
/// opened strictly before the cutoff year, while the model receives
/// stations up to and including it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPurpose {
    Display,
    Submission,
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Whether a record satisfies the time cutoff for the given purpose.
/// Records lacking the relevant date/year never pass.
pub fn passes_cutoff(rec: &StationRecord, cutoff: Cutoff, purpose: FilterPurpose) -> bool {
    match cutoff {
        Cutoff::Date(limit) => rec.open_date.is_some_and(|d| d <= limit),
        Cutoff::Year(limit) => match (rec.effective_year(), purpose) {
            (Some(y), FilterPurpose::Display) => y < limit,
            (Some(y), FilterPurpose::Submission) => y <= limit,
            (None, _) => false,
        },
    }
}

/// Return indices of records inside `viewport` that pass `cutoff`, in
/// dataset order.
pub fn filtered_indices(
    dataset: &StationDataset,
    viewport: &Viewport,
    cutoff: Cutoff,
    purpose: FilterPurpose,
) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            viewport.contains(rec.latitude, rec.longitude) && passes_cutoff(rec, cutoff, purpose)
        })
        .map(|(i, _)| i)
        .collect()
}
