use crate::config::{FilterConfig, FilterMode};
use crate::model::ApplicationIndex;
use log::warn;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str};
use regex::Regex;

/// Names containing `query`, ignoring case, in index order. The iterator
/// is lazy and can be cloned to restart it.
pub fn filter<'a>(index: &'a ApplicationIndex, query: &str) -> impl Iterator<Item = &'a str> + Clone + use<'a> {
    let needle = query.to_lowercase();
    index
        .names()
        .filter(move |name| name.to_lowercase().contains(&needle))
}

/// Query filter with the configured mode and blacklist applied.
pub struct Filter {
    mode: FilterMode,
    blacklist: Vec<Regex>,
    matcher: Matcher,
}

impl Filter {
    pub fn new(config: &FilterConfig) -> Self {
        let blacklist = config
            .blacklist
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!("Ignoring invalid blacklist pattern {:?}: {}", pattern, err);
                    None
                }
            })
            .collect();

        Self {
            mode: config.mode,
            blacklist,
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    fn allowed(&self, name: &str) -> bool {
        !self.blacklist.iter().any(|re| re.is_match(name))
    }

    pub fn apply<'a>(&mut self, index: &'a ApplicationIndex, query: &str) -> Vec<&'a str> {
        match self.mode {
            FilterMode::Substring => filter(index, query).filter(|n| self.allowed(n)).collect(),
            FilterMode::Fuzzy => self.rank(index, query),
        }
    }

    /// Best score first; equal scores keep index order.
    fn rank<'a>(&mut self, index: &'a ApplicationIndex, query: &str) -> Vec<&'a str> {
        if query.is_empty() {
            return index.names().filter(|n| self.allowed(n)).collect();
        }

        let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
        let mut buf = Vec::new();
        let mut scored: Vec<(u32, &'a str)> = Vec::new();

        for name in index.names() {
            if !self.allowed(name) {
                continue;
            }
            let haystack = Utf32Str::new(name, &mut buf);
            if let Some(score) = pattern.score(haystack, &mut self.matcher) {
                scored.push((score, name));
            }
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, name)| name).collect()
    }
}
