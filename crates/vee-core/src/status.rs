use serde::{Deserialize, Serialize};

use crate::{errors::Error, Result};

/// Ordered presence strings, no duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusList {
    entries: Vec<String>,
}

impl StatusList {
    pub fn add(&mut self, text: &str) -> Result<()> {
        if self.contains(text) {
            return Err(Error::DuplicateEntry(text.to_string()));
        }
        self.entries.push(text.to_string());
        Ok(())
    }

    /// Remove an exact match, keeping the order of the rest.
    pub fn remove(&mut self, text: &str) -> Result<()> {
        let Some(idx) = self.entries.iter().position(|s| s == text) else {
            return Err(Error::NotFound(text.to_string()));
        };
        self.entries.remove(idx);
        Ok(())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|s| s == text)
    }

    /// Round-robin pick: the entry after `cursor`, wrapping around.
    ///
    /// Returns the entry and the cursor to pass next time; `None` when empty.
    pub fn next_after(&self, cursor: Option<usize>) -> Option<(usize, &str)> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = match cursor {
            Some(c) => (c + 1) % self.entries.len(),
            None => 0,
        };
        Some((idx, self.entries[idx].as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_add_is_rejected_and_list_unchanged() {
        let mut list = StatusList::default();
        list.add("Playing").unwrap();
        let err = list.add("Playing").unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry(ref s) if s == "Playing"));
        assert_eq!(list.as_slice(), ["Playing"]);
    }

    #[test]
    fn no_duplicates_for_any_add_sequence() {
        let mut list = StatusList::default();
        for s in ["a", "b", "a", "c", "b", "a", "d"] {
            let _ = list.add(s);
        }
        assert_eq!(list.as_slice(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn removing_first_entry_succeeds() {
        let mut list = StatusList::default();
        list.add("Playing").unwrap();
        list.remove("Playing").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn remove_preserves_order_of_remainder() {
        let mut list = StatusList::default();
        for s in ["a", "b", "c", "d"] {
            list.add(s).unwrap();
        }
        list.remove("b").unwrap();
        assert_eq!(list.as_slice(), ["a", "c", "d"]);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut list = StatusList::default();
        list.add("a").unwrap();
        assert!(matches!(list.remove("z"), Err(Error::NotFound(_))));
        assert_eq!(list.as_slice(), ["a"]);
    }

    #[test]
    fn next_after_wraps_around() {
        let mut list = StatusList::default();
        assert!(list.next_after(None).is_none());

        list.add("one").unwrap();
        list.add("two").unwrap();
        assert_eq!(list.next_after(None), Some((0, "one")));
        assert_eq!(list.next_after(Some(0)), Some((1, "two")));
        assert_eq!(list.next_after(Some(1)), Some((0, "one")));
        // A stale cursor past the end still lands inside the list.
        assert_eq!(list.next_after(Some(7)), Some((0, "one")));
    }
}
