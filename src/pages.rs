//! Page-number sets and page-range expressions.
//!
//! Excluded pages are supplied as a comma-separated list of single numbers
//! and closed ranges (`"1-3,5,8-10"`). Parsing is lenient: malformed tokens
//! and ranges whose start exceeds their end are dropped rather than reported.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered set of 1-based page numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSet {
    pages: BTreeSet<u32>,
}

impl PageSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a page-range expression such as `"1-3,5,8-10"`.
    ///
    /// Whitespace anywhere in the expression is ignored. Tokens that are not
    /// numbers, and ranges with `start > end`, are silently skipped.
    pub fn parse(s: &str) -> Self {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let mut pages = BTreeSet::new();

        for part in compact.split(',') {
            if part.is_empty() {
                continue;
            }
            if let Some((start, end)) = part.split_once('-') {
                let (Ok(start), Ok(end)) = (start.parse::<u32>(), end.parse::<u32>()) else {
                    log::debug!("Dropping malformed page range '{}'", part);
                    continue;
                };
                if start <= end {
                    pages.extend(start..=end);
                }
            } else if let Ok(page) = part.parse::<u32>() {
                pages.insert(page);
            } else {
                log::debug!("Dropping malformed page token '{}'", part);
            }
        }

        Self { pages }
    }

    /// Format the set compactly, collapsing consecutive runs: `{1,2,3,5}` → `"1-3, 5"`.
    pub fn to_compact_string(&self) -> String {
        let mut ranges: Vec<String> = Vec::new();
        let mut iter = self.pages.iter().copied();

        let Some(first) = iter.next() else {
            return String::new();
        };
        let (mut start, mut end) = (first, first);

        for page in iter {
            if page == end + 1 {
                end = page;
            } else {
                ranges.push(format_run(start, end));
                start = page;
                end = page;
            }
        }
        ranges.push(format_run(start, end));

        ranges.join(", ")
    }

    /// Check if a page number is in the set.
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    /// Add a page number.
    pub fn insert(&mut self, page: u32) -> bool {
        self.pages.insert(page)
    }

    /// Number of pages in the set.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate page numbers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }

    /// Keep only pages that exist in a document of `total` pages (1..=total).
    pub fn within(&self, total: u32) -> PageSet {
        let pages = self
            .pages
            .iter()
            .copied()
            .filter(|p| (1..=total).contains(p))
            .collect();
        PageSet { pages }
    }
}

fn format_run(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

impl fmt::Display for PageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact_string())
    }
}

impl FromIterator<u32> for PageSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PageSet {
    type Item = &'a u32;
    type IntoIter = std::collections::btree_set::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(set: &PageSet) -> Vec<u32> {
        set.iter().collect()
    }

    #[test]
    fn test_parse_ranges_and_singles() {
        let set = PageSet::parse("1-3,5,8-10");
        assert_eq!(pages(&set), vec![1, 2, 3, 5, 8, 9, 10]);
    }

    #[test]
    fn test_parse_reversed_range_dropped() {
        assert!(PageSet::parse("3-1").is_empty());
    }

    #[test]
    fn test_parse_malformed_token_dropped() {
        assert_eq!(pages(&PageSet::parse("x,2")), vec![2]);
        assert_eq!(pages(&PageSet::parse("1-x,4,-2,,7")), vec![4, 7]);
    }

    #[test]
    fn test_parse_empty_and_whitespace() {
        assert!(PageSet::parse("").is_empty());
        assert!(PageSet::parse("   ").is_empty());
        assert_eq!(pages(&PageSet::parse(" 1 - 2 , 4 ")), vec![1, 2, 4]);
    }

    #[test]
    fn test_compact_format() {
        let set: PageSet = [1, 2, 3, 5].into_iter().collect();
        assert_eq!(set.to_compact_string(), "1-3, 5");

        let single: PageSet = [7].into_iter().collect();
        assert_eq!(single.to_compact_string(), "7");

        assert_eq!(PageSet::new().to_compact_string(), "");
    }

    #[test]
    fn test_compact_format_is_idempotent() {
        for input in ["1-3,5,8-10", "2", "4,6,8", "1-2,3-4"] {
            let once = PageSet::parse(input).to_compact_string();
            let twice = PageSet::parse(&once).to_compact_string();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_within_total() {
        let set = PageSet::parse("0,2,5,9");
        assert_eq!(pages(&set.within(5)), vec![2, 5]);
    }
}
