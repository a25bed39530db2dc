//! robots.txt parsing and rule evaluation
//!
//! Rules are grouped per lowercase user-agent token. Evaluation picks the
//! group for the bot (or `*`), then compares the longest matching `Allow`
//! pattern against the longest matching `Disallow` pattern.

use crate::robots::matcher::matches_path_pattern;
use std::collections::HashMap;

/// Allow/Disallow path patterns for one user-agent group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRules {
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
}

/// Parsed robots.txt rules keyed by lowercase agent token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsPolicy {
    rules: HashMap<String, AgentRules>,
}

impl RobotsPolicy {
    /// Parses raw robots.txt content
    ///
    /// Parsing never fails: unknown or malformed lines are ignored, and a
    /// line that is not a recognised directive closes the current group.
    pub fn parse(content: &str) -> Self {
        let mut rules: HashMap<String, AgentRules> = HashMap::new();
        rules.insert("*".to_string(), AgentRules::default());

        let mut current_agents: Vec<String> = Vec::new();
        // Set once an Allow/Disallow line has been seen for the current group;
        // the next User-agent line then opens a fresh group.
        let mut group_has_rules = false;

        for raw_line in content.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                current_agents.clear();
                continue;
            };

            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if group_has_rules {
                        current_agents.clear();
                        group_has_rules = false;
                    }
                    let agent = value.to_lowercase();
                    if agent.is_empty() {
                        continue;
                    }
                    rules.entry(agent.clone()).or_default();
                    current_agents.push(agent);
                }
                "allow" | "disallow" => {
                    group_has_rules = true;
                    if value.is_empty() {
                        continue;
                    }
                    for agent in &current_agents {
                        if let Some(entry) = rules.get_mut(agent) {
                            if key == "allow" {
                                entry.allow.push(value.to_string());
                            } else {
                                entry.disallow.push(value.to_string());
                            }
                        }
                    }
                }
                "sitemap" | "crawl-delay" => {}
                _ => current_agents.clear(),
            }
        }

        Self { rules }
    }

    /// Returns the rules recorded for an agent token
    pub fn agent_rules(&self, agent: &str) -> Option<&AgentRules> {
        self.rules.get(&agent.to_lowercase())
    }

    /// Picks the rule group that applies to `bot_name`
    ///
    /// A non-wildcard agent token that is a case-insensitive substring of the
    /// bot name wins; otherwise the `*` group applies. When several tokens
    /// match, the longest one is chosen so the result does not depend on map
    /// iteration order.
    fn rules_for(&self, bot_name: &str) -> Option<&AgentRules> {
        let bot = bot_name.to_lowercase();
        self.rules
            .iter()
            .filter(|(agent, _)| agent.as_str() != "*" && bot.contains(agent.as_str()))
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(_, rules)| rules)
            .or_else(|| self.rules.get("*"))
    }

    /// Checks if a URL path may be fetched by `bot_name`
    ///
    /// The longest matching pattern decides: a Disallow at least as long as
    /// the longest matching Allow denies; no matching Disallow allows.
    pub fn is_allowed(&self, path: &str, bot_name: &str) -> bool {
        let path = if path.is_empty() { "/" } else { path };

        let Some(rules) = self.rules_for(bot_name) else {
            return true;
        };

        let longest = |patterns: &[String]| {
            patterns
                .iter()
                .filter(|p| matches_path_pattern(p, path))
                .map(String::len)
                .max()
        };

        match (longest(&rules.allow), longest(&rules.disallow)) {
            (_, None) => true,
            (Some(allow), Some(disallow)) => allow > disallow,
            (None, Some(_)) => false,
        }
    }
}
