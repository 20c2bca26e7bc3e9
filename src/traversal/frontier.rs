use std::collections::{HashMap, HashSet};

/// A page waiting to be fetched
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierItem {
    /// Normalized absolute URL
    pub url: String,
    pub depth: u32,
    /// Page the link was found on; `None` for the start URL
    pub parent_url: Option<String>,
    /// Scorer output, when a scorer is configured
    pub score: Option<f64>,
}

impl FrontierItem {
    pub fn start(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
            parent_url: None,
            score: None,
        }
    }
}

/// Pending work of one run, in the order a strategy wants it fetched
pub(crate) trait Frontier: Send {
    /// Removes the items of the next round, at most `limit` of them
    fn next_round(&mut self, limit: usize) -> Vec<FrontierItem>;

    /// Adds the links discovered on one page, in discovery order
    fn extend(&mut self, items: Vec<FrontierItem>);

    fn len(&self) -> usize;
}

/// Visited set and first-discovery depth map of one run
///
/// A URL is marked when it is enqueued, not when it is fetched, so a link
/// found on two sibling pages is enqueued once. Redirect targets are marked
/// too. The depth recorded first is never overwritten.
#[derive(Debug, Default)]
pub(crate) struct VisitTracker {
    visited: HashSet<String>,
    depths: HashMap<String, u32>,
}

impl VisitTracker {
    pub(crate) fn contains(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Marks a URL as seen at `depth`; false if it was already known
    pub(crate) fn insert(&mut self, url: &str, depth: u32) -> bool {
        if !self.visited.insert(url.to_string()) {
            return false;
        }
        self.depths.entry(url.to_string()).or_insert(depth);
        true
    }

    pub(crate) fn depth_of(&self, url: &str) -> Option<u32> {
        self.depths.get(url).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_once() {
        let mut tracker = VisitTracker::default();
        assert!(tracker.insert("https://x.com/a", 1));
        assert!(!tracker.insert("https://x.com/a", 1));
        assert!(tracker.contains("https://x.com/a"));
        assert!(!tracker.contains("https://x.com/b"));
    }

    #[test]
    fn test_first_depth_wins() {
        let mut tracker = VisitTracker::default();
        tracker.insert("https://x.com/a", 3);
        tracker.insert("https://x.com/a", 1);
        assert_eq!(tracker.depth_of("https://x.com/a"), Some(3));
    }
}
