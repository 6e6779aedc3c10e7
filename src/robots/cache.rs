//! Per-origin robots.txt cache
//!
//! Policies are fetched once per origin and kept for the lifetime of the
//! crawl; nothing is ever expired or refetched.

use crate::robots::ParsedRobots;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RobotsCache {
    policies: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached policy for an origin (`https://example.com`)
    pub fn get(&self, origin: &str) -> Option<&ParsedRobots> {
        self.policies.get(origin)
    }

    /// Stores the policy for an origin unless one is already cached
    ///
    /// Returns the policy that is cached after the call.
    pub fn insert(&mut self, origin: &str, robots: ParsedRobots) -> &ParsedRobots {
        self.policies.entry(origin.to_string()).or_insert(robots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache = RobotsCache::new();
        assert!(cache.get("https://x.com").is_none());

        cache.insert("https://x.com", ParsedRobots::from_content("User-agent: *\nDisallow: /a"));
        assert!(cache.get("https://api.x.com").is_none());

        let robots = cache.get("https://x.com").unwrap();
        assert!(!robots.is_allowed("/a", "TestBot"));
    }

    #[test]
    fn test_first_policy_is_kept() {
        let mut cache = RobotsCache::new();
        cache.insert("https://x.com", ParsedRobots::from_content("User-agent: *\nDisallow: /a"));
        let kept = cache.insert("https://x.com", ParsedRobots::allow_all());
        assert!(!kept.is_allowed("/a", "TestBot"));
    }
}
