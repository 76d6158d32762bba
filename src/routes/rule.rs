use regex::Captures;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query variables produced by a route match (e.g., `pagename=about/team`).
pub type QueryVars = BTreeMap<String, String>;

/// One pattern-to-query mapping of a route table.
///
/// Patterns are anchored at the start of the site-relative path; a leading
/// `^` is optional. Rules are tried in ascending `order`, first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub pattern: String,
    pub target: String,
    #[serde(default)]
    pub order: usize,
}

impl RouteRule {
    pub fn new(pattern: &str, target: &str, order: usize) -> Self {
        Self {
            pattern: pattern.to_string(),
            target: target.to_string(),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetValue {
    Literal(String),
    Capture(usize),
}

/// Parsed query template of a rule: `index.php?name=$matches[1]&page=$matches[2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    params: Vec<(String, TargetValue)>,
}

impl RouteTarget {
    /// Parse a query template. The `index.php?` prefix is optional.
    ///
    /// # Returns
    /// * `Err(reason)` for a parameter without a name or a malformed
    ///   `$matches[...]` reference
    pub fn parse(template: &str) -> Result<Self, String> {
        let query = template
            .trim()
            .strip_prefix("index.php")
            .unwrap_or(template.trim());
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut params = Vec::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            if name.is_empty() {
                return Err(format!("parameter without a name in '{}'", pair));
            }

            let value = match value.strip_prefix("$matches[") {
                Some(rest) => {
                    let index = rest
                        .strip_suffix(']')
                        .and_then(|digits| digits.parse::<usize>().ok())
                        .ok_or_else(|| format!("malformed capture reference '{}'", value))?;
                    TargetValue::Capture(index)
                }
                None => TargetValue::Literal(value.to_string()),
            };
            params.push((name.to_string(), value));
        }

        Ok(Self { params })
    }

    /// Highest `$matches[N]` index the template refers to.
    pub fn max_capture(&self) -> usize {
        self.params
            .iter()
            .filter_map(|(_, value)| match value {
                TargetValue::Capture(index) => Some(*index),
                TargetValue::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Fill the template from a match. Empty values are dropped.
    pub fn expand(&self, captures: &Captures<'_>) -> QueryVars {
        let mut vars = QueryVars::new();
        for (name, value) in &self.params {
            let value = match value {
                TargetValue::Literal(literal) => literal.as_str(),
                TargetValue::Capture(index) => captures.get(*index).map_or("", |m| m.as_str()),
            };
            if !value.is_empty() {
                vars.insert(name.clone(), value.to_string());
            }
        }
        vars
    }
}
