// File: src/model/schedule.rs
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row of the call schedule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TimeBlock {
    #[serde(rename = "time")]
    pub time_range: String,
    #[serde(rename = "groups")]
    pub attendees: Vec<String>,
}

impl TimeBlock {
    pub fn new(time_range: impl Into<String>, attendees: Vec<String>) -> Self {
        Self {
            time_range: time_range.into(),
            attendees,
        }
    }
}

/// Dates in the order they first appear in the call sheet, each with its
/// blocks in document order. Keys serialize as `YYYY-MM-DD`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Schedule {
    days: IndexMap<NaiveDate, Vec<TimeBlock>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the entry for `date` over. A date seen before keeps its position.
    pub fn open_date(&mut self, date: NaiveDate) {
        self.days.entry(date).or_default().clear();
    }

    pub fn blocks(&self, date: NaiveDate) -> &[TimeBlock] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn push_block(&mut self, date: NaiveDate, block: TimeBlock) {
        self.days.entry(date).or_default().push(block);
    }

    pub fn last_block_mut(&mut self, date: NaiveDate) -> Option<&mut TimeBlock> {
        self.days.get_mut(&date).and_then(|blocks| blocks.last_mut())
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.days.keys()
    }

    pub fn date_count(&self) -> usize {
        self.days.len()
    }

    pub fn block_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}
