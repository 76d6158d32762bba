use crate::error::ConfigurationError;
use crate::routes::{QueryVars, RouteRule, RouteTarget};
use regex::Regex;

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: RouteRule,
    regex: Regex,
    target: RouteTarget,
}

/// Result of matching a path against a `RouteTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub order: usize,
    pub vars: QueryVars,
}

/// Compiled, ordered route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<CompiledRule>,
}

impl RouteTable {
    /// Compile every rule, sorted by `order`.
    ///
    /// # Returns
    /// * `Err(MalformedRoute)` for a pattern that is not a valid regex, a
    ///   malformed target or a target referring to a missing capture group
    pub fn compile(mut rules: Vec<RouteRule>) -> Result<Self, ConfigurationError> {
        rules.sort_by_key(|rule| rule.order);

        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let malformed = |reason: String| ConfigurationError::MalformedRoute {
                order: rule.order,
                pattern: rule.pattern.clone(),
                reason,
            };

            let anchored = if rule.pattern.starts_with('^') {
                rule.pattern.clone()
            } else {
                format!("^{}", rule.pattern)
            };
            let regex = Regex::new(&anchored).map_err(|e| malformed(e.to_string()))?;
            let target = RouteTarget::parse(&rule.target).map_err(malformed)?;

            let groups = regex.captures_len() - 1;
            if target.max_capture() > groups {
                return Err(malformed(format!(
                    "target refers to $matches[{}] but the pattern has {} groups",
                    target.max_capture(),
                    groups
                )));
            }

            compiled.push(CompiledRule {
                rule,
                regex,
                target,
            });
        }

        Ok(Self { rules: compiled })
    }

    /// Match a normalized site-relative path (no leading slash). First
    /// matching rule wins.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        self.rules.iter().find_map(|compiled| {
            compiled.regex.captures(path).map(|captures| RouteMatch {
                order: compiled.rule.order,
                vars: compiled.target.expand(&captures),
            })
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &RouteRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
