//! Robots.txt parser implementation
//!
//! Allow/disallow decisions are delegated to the robotstxt crate. Crawl-delay
//! and the list of literal disallowed paths are read from a small group parser
//! of our own, since robotstxt exposes neither.

use robotstxt::DefaultMatcher;

/// One `User-agent` group of a robots.txt file
#[derive(Debug, Clone, Default, PartialEq)]
struct Group {
    agents: Vec<String>,
    disallow: Vec<String>,
    crawl_delay: Option<f64>,
}

impl Group {
    fn is_wildcard(&self) -> bool {
        self.agents.iter().any(|a| a == "*")
    }

    fn names(&self, token: &str) -> bool {
        self.agents.iter().any(|a| a != "*" && a == token)
    }
}

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = allow all, false = parse content)
    allow_all: bool,
    groups: Vec<Group>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
            groups: parse_groups(content),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
            groups: Vec::new(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The full URL or path to check (e.g., "/page.html")
    /// * `user_agent` - The user agent string; only its product token is matched
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, &product_token(user_agent), url)
    }

    /// Gets the crawl delay, in seconds, for a specific user agent
    ///
    /// A group naming the agent wins over the `*` group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        self.applicable_groups(user_agent)
            .iter()
            .find_map(|group| group.crawl_delay)
    }

    /// Lists the literal `Disallow` paths that apply to the user agent
    ///
    /// Wildcard (`*`) and anchored (`$`) rules are skipped since they do not
    /// name a concrete resource.
    pub fn disallowed_paths(&self, user_agent: &str) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for group in self.applicable_groups(user_agent) {
            for path in &group.disallow {
                if path.starts_with('/')
                    && !path.contains('*')
                    && !path.contains('$')
                    && !paths.contains(path)
                {
                    paths.push(path.clone());
                }
            }
        }
        paths
    }

    fn applicable_groups(&self, user_agent: &str) -> Vec<&Group> {
        if self.allow_all {
            return Vec::new();
        }

        let token = product_token(user_agent).to_lowercase();
        let specific: Vec<&Group> = self.groups.iter().filter(|g| g.names(&token)).collect();
        if !specific.is_empty() {
            return specific;
        }

        self.groups.iter().filter(|g| g.is_wildcard()).collect()
    }
}

/// Returns the product token of a user agent string (`Mozilla/5.0 (...)` -> `Mozilla`)
pub fn product_token(user_agent: &str) -> String {
    user_agent
        .trim()
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or("")
        .to_string()
}

fn parse_groups(content: &str) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut current: Option<Group> = None;
    let mut last_was_agent = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        if key == "user-agent" {
            // Consecutive User-agent lines share one group
            if !last_was_agent {
                if let Some(group) = current.take() {
                    groups.push(group);
                }
                current = Some(Group::default());
            }
            if let Some(group) = current.as_mut() {
                group.agents.push(value.to_lowercase());
            }
            last_was_agent = true;
            continue;
        }

        last_was_agent = false;
        let Some(group) = current.as_mut() else {
            continue;
        };

        match key.as_str() {
            "disallow" if !value.is_empty() => group.disallow.push(value.to_string()),
            "crawl-delay" => {
                if let Ok(delay) = value.parse::<f64>() {
                    if delay.is_finite() && delay >= 0.0 {
                        group.crawl_delay = Some(delay);
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(group) = current {
        groups.push(group);
    }

    groups
}
