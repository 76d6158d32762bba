use crate::content::{ContentTypes, TypeKind};
use crate::routes::RouteRule;

/// Source of the monolingual base route table.
pub trait RouteProvider: Send + Sync {
    fn base_rules(&self) -> Vec<RouteRule>;
}

impl RouteProvider for Vec<RouteRule> {
    fn base_rules(&self) -> Vec<RouteRule> {
        self.clone()
    }
}

/// Conventional route set for a content type registry.
///
/// Order: type archives, prefixed items, root feeds and pagination, then the
/// catch-alls of root types (non-hierarchical before hierarchical, so a
/// single segment is read as a post before a page).
#[derive(Debug, Clone)]
pub struct StandardRoutes {
    types: ContentTypes,
    pagination_base: String,
    feed_names: Vec<String>,
}

impl StandardRoutes {
    pub fn new(types: &ContentTypes, pagination_base: &str, feed_names: &[String]) -> Self {
        Self {
            types: types.clone(),
            pagination_base: pagination_base.to_string(),
            feed_names: feed_names.to_vec(),
        }
    }

    fn feeds(&self) -> String {
        let names: Vec<String> = self.feed_names.iter().map(|name| regex::escape(name)).collect();
        format!("({})", names.join("|"))
    }
}

impl RouteProvider for StandardRoutes {
    fn base_rules(&self) -> Vec<RouteRule> {
        let feeds = self.feeds();
        let pg = regex::escape(&self.pagination_base);
        let mut patterns: Vec<(String, String)> = Vec::new();

        for def in self.types.iter().filter(|def| def.kind == TypeKind::PostType) {
            let Some(archive) = def.archive_slug.as_deref().filter(|s| !s.is_empty()) else {
                continue;
            };
            let archive = regex::escape(archive);
            let name = &def.name;
            patterns.push((
                format!("{}/feed/{}/?$", archive, feeds),
                format!("post_type={}&feed=$matches[1]", name),
            ));
            patterns.push((
                format!("{}/{}/?$", archive, feeds),
                format!("post_type={}&feed=$matches[1]", name),
            ));
            patterns.push((
                format!("{}/{}/([0-9]{{1,}})/?$", archive, pg),
                format!("post_type={}&paged=$matches[1]", name),
            ));
            patterns.push((format!("{}/?$", archive), format!("post_type={}", name)));
        }

        for def in self.types.iter().filter(|def| !def.is_root_type()) {
            let Some(rewrite) = def.rewrite_slug.as_deref().filter(|s| !s.is_empty()) else {
                continue;
            };
            let prefix = regex::escape(rewrite);
            let item = if def.hierarchical { "(.+?)" } else { "([^/]+)" };
            let var = &def.query_var;
            patterns.push((
                format!("{}/{}/feed/{}/?$", prefix, item, feeds),
                format!("{}=$matches[1]&feed=$matches[2]", var),
            ));
            patterns.push((
                format!("{}/{}/{}/?$", prefix, item, feeds),
                format!("{}=$matches[1]&feed=$matches[2]", var),
            ));
            patterns.push((
                format!("{}/{}/{}/?([0-9]{{1,}})/?$", prefix, item, pg),
                format!("{}=$matches[1]&paged=$matches[2]", var),
            ));
            if def.kind == TypeKind::PostType {
                patterns.push((
                    format!("{}/{}(?:/([0-9]+))?/?$", prefix, item),
                    format!("{}=$matches[1]&page=$matches[2]", var),
                ));
            } else {
                patterns.push((format!("{}/{}/?$", prefix, item), format!("{}=$matches[1]", var)));
            }
        }

        patterns.push((format!("feed/{}/?$", feeds), "feed=$matches[1]".to_string()));
        patterns.push((format!("{}/?$", feeds), "feed=$matches[1]".to_string()));
        patterns.push((format!("{}/?([0-9]{{1,}})/?$", pg), "paged=$matches[1]".to_string()));

        let mut roots: Vec<_> = self.types.root_types().collect();
        roots.sort_by_key(|def| def.hierarchical);
        for def in roots {
            let item = if def.hierarchical { "(.?.+?)" } else { "([^/]+)" };
            let var = &def.query_var;
            patterns.push((
                format!("{}/feed/{}/?$", item, feeds),
                format!("{}=$matches[1]&feed=$matches[2]", var),
            ));
            patterns.push((
                format!("{}/{}/?$", item, feeds),
                format!("{}=$matches[1]&feed=$matches[2]", var),
            ));
            patterns.push((
                format!("{}(?:/([0-9]+))?/?$", item),
                format!("{}=$matches[1]&page=$matches[2]", var),
            ));
        }

        patterns
            .into_iter()
            .enumerate()
            .map(|(index, (pattern, target))| RouteRule {
                pattern,
                target,
                order: index + 1,
            })
            .collect()
    }
}
