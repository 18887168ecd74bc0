//! The journal log: CRUD and temporal queries over dated entries.
//!
//! Storage is an injected [`TabularData`] of `(timestamp, date, text)` rows.
//! The backing store is user-editable, so malformed rows (wrong cell count,
//! unparsable date or timestamp) are silently skipped by every query rather
//! than failing the whole operation.

use crate::search::SearchIndex;
use crate::tsv::TabularData;
use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A committed journal entry. Immutable once written; re-saving the same day
/// appends another row instead of mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub created_at: NaiveDateTime,
    pub date: NaiveDate,
    pub text: String,
}

/// The entry log for one user, bound to its storage backend.
pub struct Journal {
    data: Box<dyn TabularData>,
}

impl Journal {
    pub fn new(data: Box<dyn TabularData>) -> Self {
        Self { data }
    }

    /// Appends an entry row, preceded by a header row when the store is empty.
    pub fn add_entry(&mut self, date: NaiveDate, text: &str) -> Result<()> {
        if self.data.is_empty()? {
            self.data.append_row(vec![
                "timestamp".to_string(),
                "date".to_string(),
                "text".to_string(),
            ])?;
        }
        self.data.append_row(vec![
            Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string(),
            date.format(DATE_FORMAT).to_string(),
            text.to_string(),
        ])
    }

    /// All texts for `date`, oldest first, joined with `". "`. An empty string
    /// means no entry exists; that is not an error.
    pub fn get_entry(&self, date: NaiveDate) -> Result<String> {
        let mut found: Vec<Entry> = self
            .data
            .rows()?
            .iter()
            .filter_map(|cells| entry_from_row(cells))
            .filter(|entry| entry.date == date)
            .collect();
        found.sort_by_key(|entry| entry.created_at);
        Ok(found
            .into_iter()
            .map(|entry| entry.text)
            .collect::<Vec<_>>()
            .join(". "))
    }

    /// Deletes every row whose date equals `date`.
    pub fn delete_entry(&mut self, date: NaiveDate) -> Result<()> {
        // Collect first, then delete back to front so earlier deletions do not
        // shift the indices still pending.
        let matching: Vec<usize> = self
            .data
            .rows()?
            .iter()
            .enumerate()
            .filter(|(_, cells)| entry_from_row(cells).is_some_and(|e| e.date == date))
            .map(|(index, _)| index)
            .collect();
        for index in matching.into_iter().rev() {
            self.data.delete_row(index)?;
        }
        Ok(())
    }

    /// The entry nearest to `date`. An exact hit wins outright; otherwise the
    /// nearest entry on or after `date` is preferred over the nearest one
    /// before it. `None` means the journal has no parsable entries at all.
    pub fn get_closest_entry(&self, date: NaiveDate) -> Result<Option<Entry>> {
        let mut closest_after: Option<(i64, Entry)> = None;
        let mut closest_before: Option<(i64, Entry)> = None;

        for cells in self.data.rows()? {
            let Some(entry) = entry_from_row(&cells) else {
                continue;
            };
            let gap = (date - entry.date).num_days();
            if gap == 0 {
                return Ok(Some(entry));
            }
            if gap > 0 {
                if closest_before.as_ref().is_none_or(|(g, _)| gap < *g) {
                    closest_before = Some((gap, entry));
                }
            } else if closest_after.as_ref().is_none_or(|(g, _)| gap > *g) {
                closest_after = Some((gap, entry));
            }
        }
        Ok(closest_after
            .or(closest_before)
            .map(|(_, entry)| entry))
    }

    /// All entries whose stored date string starts with `date_prefix`. Purely
    /// lexical, which is what month (`"1994-08"`) and year (`"1994"`)
    /// granularity queries need against `%Y-%m-%d` dates.
    pub fn get_entries(&self, date_prefix: &str) -> Result<Vec<Entry>> {
        Ok(self
            .data
            .rows()?
            .iter()
            .filter(|cells| {
                cells.len() == 3 && cells[1].starts_with(date_prefix)
            })
            .filter_map(|cells| entry_from_row(cells))
            .collect())
    }

    /// Fuzzy full-text search, results ordered by entry date ascending.
    ///
    /// The index is rebuilt from the current rows on every call, trading a
    /// linear rebuild for guaranteed index/content consistency.
    pub fn search_for(&self, query: &str) -> Result<Vec<Entry>> {
        let mut index = SearchIndex::new();
        let mut lookup: HashMap<String, Entry> = HashMap::new();
        for cells in self.data.rows()? {
            if let Some(entry) = entry_from_row(&cells) {
                index.add(&cells[1], &entry.text);
                lookup.insert(cells[1].clone(), entry);
            }
        }

        let mut result: Vec<Entry> = index
            .search(query)
            .into_iter()
            .filter_map(|rank| lookup.get(&rank.id).cloned())
            .collect();
        result.sort_by_key(|entry| entry.date);
        Ok(result)
    }
}

/// `None` for anything that is not a well-formed `(timestamp, date, text)` row.
fn entry_from_row(cells: &[String]) -> Option<Entry> {
    if cells.len() != 3 || cells[1].is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(&cells[1], DATE_FORMAT).ok()?;
    let created_at = NaiveDateTime::parse_from_str(&cells[0], TIMESTAMP_FORMAT).ok()?;
    Some(Entry {
        created_at,
        date,
        text: cells[2].clone(),
    })
}
