use std::path::Path;

use serde::Serialize;

use crate::{
    error::ExportError,
    record::{Attribute, EstablishmentRecord, Location},
};

const UNNAMED: &str = "Unnamed establishment";
const NO_ADDRESS: &str = "Address not specified";
const NO_KIND: &str = "Type not specified";

/// What a result list shows for one establishment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entry {
    pub name: String,
    pub address: String,
    pub kind: String,
    pub postal_code: String,
    pub commune: String,
    pub location: Location,
}

impl Entry {
    pub fn from_record(record: &EstablishmentRecord) -> Option<Self> {
        let location = record.location()?;
        Some(Self {
            name: record
                .text(Attribute::Name)
                .unwrap_or_else(|| UNNAMED.to_string()),
            address: record
                .text(Attribute::Address)
                .unwrap_or_else(|| NO_ADDRESS.to_string()),
            kind: record
                .text(Attribute::Kind)
                .unwrap_or_else(|| NO_KIND.to_string()),
            postal_code: record.text(Attribute::PostalCode).unwrap_or_default(),
            commune: record.text(Attribute::Commune).unwrap_or_default(),
            location,
        })
    }

    /// `"lat, lon"`, as pasted into other mapping tools.
    pub fn coordinates(&self) -> String {
        format!("{}, {}", self.location.latitude, self.location.longitude)
    }
}

/// The result list of the current search and the entries picked from it.
///
/// A view lives for the whole session; every new search calls
/// [`ResultsView::reset`] (through [`ResultsView::show`]) before loading.
#[derive(Debug, Default)]
pub struct ResultsView {
    entries: Vec<Entry>,
    selected: Vec<usize>,
}

impl ResultsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.selected.clear();
    }

    /// Replace the displayed results. Records without a location are skipped.
    pub fn show(&mut self, records: &[EstablishmentRecord]) {
        self.reset();
        self.entries = records.iter().filter_map(Entry::from_record).collect();
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Flip the selection of entry `index`. Returns the new state, or `None`
    /// if there is no such entry.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        if index >= self.entries.len() {
            return None;
        }
        match self.selected.iter().position(|&i| i == index) {
            Some(position) => {
                self.selected.remove(position);
                Some(false)
            }
            None => {
                self.selected.push(index);
                Some(true)
            }
        }
    }

    /// Coordinates of the selected entries, one per line, in selection order.
    pub fn coordinates_text(&self) -> String {
        self.selected
            .iter()
            .map(|&i| self.entries[i].coordinates())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub async fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        if self.selected.is_empty() {
            return Err(ExportError::EmptySelection);
        }
        tokio::fs::write(path, self.coordinates_text()).await?;
        Ok(())
    }
}
