//! Rolling interaction history
//!
//! Fixed-capacity FIFO of recent turns, used for repetition detection and
//! joke de-duplication. Oldest records are evicted first.

use std::collections::VecDeque;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Result;
use crate::intent::Intent;

/// One processed utterance and what was said back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    pub utterance: String,
    pub language: String,
    /// Intent the response was produced for; `None` when unmatched
    pub intent: Option<Intent>,
    pub confidence: u8,
    pub response: String,
}

impl InteractionRecord {
    /// Append the record to `writer` as one line of JSON
    ///
    /// # Errors
    ///
    /// Returns error if the record cannot be serialized or written
    pub fn write_json_line<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Bounded history of recent interactions
#[derive(Debug, Clone)]
pub struct History {
    records: VecDeque<InteractionRecord>,
    capacity: usize,
}

impl History {
    /// Create an empty history holding at most `capacity` records
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest when full
    pub fn push(&mut self, record: InteractionRecord) {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// How many records in the window carry `intent`
    #[must_use]
    pub fn count_intent(&self, intent: Intent) -> usize {
        self.records
            .iter()
            .filter(|r| r.intent == Some(intent))
            .count()
    }

    /// Responses previously given for `intent`, oldest first
    pub fn responses_for(&self, intent: Intent) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(move |r| r.intent == Some(intent))
            .map(|r| r.response.as_str())
    }

    /// Records oldest first
    pub fn iter(&self) -> impl Iterator<Item = &InteractionRecord> {
        self.records.iter()
    }

    /// Most recent record
    #[must_use]
    pub fn last(&self) -> Option<&InteractionRecord> {
        self.records.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(intent: Option<Intent>, response: &str) -> InteractionRecord {
        InteractionRecord {
            timestamp: Utc::now(),
            utterance: "test".to_string(),
            language: "en".to_string(),
            intent,
            confidence: 90,
            response: response.to_string(),
        }
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.push(record(Some(Intent::Time), &format!("r{i}")));
        }

        assert_eq!(history.len(), 3);
        let responses: Vec<_> = history.iter().map(|r| r.response.as_str()).collect();
        assert_eq!(responses, vec!["r2", "r3", "r4"]);
        assert_eq!(history.last().unwrap().response, "r4");
    }

    #[test]
    fn test_history_zero_capacity_holds_one() {
        let mut history = History::new(0);
        assert_eq!(history.capacity(), 1);
        history.push(record(None, "a"));
        history.push(record(None, "b"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_count_and_responses_by_intent() {
        let mut history = History::new(8);
        assert!(history.is_empty());
        history.push(record(Some(Intent::Joke), "joke one"));
        history.push(record(Some(Intent::Time), "time"));
        history.push(record(None, "unknown"));
        history.push(record(Some(Intent::Joke), "joke two"));

        assert_eq!(history.count_intent(Intent::Joke), 2);
        assert_eq!(history.count_intent(Intent::Greeting), 0);
        let jokes: Vec<_> = history.responses_for(Intent::Joke).collect();
        assert_eq!(jokes, vec!["joke one", "joke two"]);
    }

    #[test]
    fn test_write_json_line() {
        let mut out = Vec::new();
        record(Some(Intent::Time), "It's noon.").write_json_line(&mut out).unwrap();
        record(None, "Sorry?").write_json_line(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["intent"], "time");
        assert_eq!(first["response"], "It's noon.");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert!(second["intent"].is_null());
    }

    #[test]
    fn test_write_json_line_reports_write_failure() {
        let mut full = [0u8; 4];
        let mut writer = &mut full[..];
        let result = record(None, "too long for the buffer").write_json_line(&mut writer);
        assert!(result.is_err());
    }
}
