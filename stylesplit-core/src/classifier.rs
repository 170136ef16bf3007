use crate::config::ClassifierConfig;
use crate::parser::parse_blocks;
use crate::types::{Block, Bucket};
use std::collections::BTreeSet;

/// One `(markers, bucket)` entry of the ordered rule list.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub bucket: Bucket,
    markers: Vec<String>,
}

impl ClassificationRule {
    pub fn new(bucket: Bucket, markers: Vec<String>) -> Self {
        Self { bucket, markers }
    }

    pub fn matches(&self, header: &str) -> bool {
        self.markers.iter().any(|marker| header.contains(marker.as_str()))
    }
}

/// Routes a block header to a bucket by substring markers.
///
/// Rules are checked in order and the first match wins. A header that no
/// rule matches goes to the fallback bucket, so classification is total.
pub struct StyleClassifier {
    rules: Vec<ClassificationRule>,
    grouping_prefixes: Vec<String>,
    fallback: Bucket,
}

impl Default for StyleClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl StyleClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            rules: config
                .rules
                .iter()
                .map(|rule| ClassificationRule::new(rule.bucket, rule.markers.clone()))
                .collect(),
            grouping_prefixes: config.grouping_prefixes.clone(),
            fallback: config.fallback,
        }
    }

    pub fn fallback(&self) -> Bucket {
        self.fallback
    }

    pub fn classify_header(&self, header: &str) -> Bucket {
        self.rules
            .iter()
            .find(|rule| rule.matches(header))
            .map(|rule| rule.bucket)
            .unwrap_or(self.fallback)
    }

    /// Grouping rules (e.g. `@media`) wrap other rules and are classified by
    /// what they contain rather than by their own header.
    pub fn is_grouping(&self, header: &str) -> bool {
        self.grouping_prefixes
            .iter()
            .any(|prefix| header.starts_with(prefix.as_str()))
    }

    /// Bucket for a whole top-level block.
    ///
    /// A grouping rule lands in a page bucket only when every nested rule
    /// agrees on that bucket. Mixed or empty groups go to the fallback, since
    /// a grouping rule is never split.
    pub fn classify_block(&self, block: &Block) -> Bucket {
        if !self.is_grouping(&block.header) {
            return self.classify_header(&block.header);
        }

        let inner: BTreeSet<Bucket> = parse_blocks(&block.body)
            .iter()
            .map(|nested| self.classify_header(&nested.header))
            .collect();

        let mut buckets = inner.into_iter();
        match (buckets.next(), buckets.next()) {
            (Some(only), None) => only,
            _ => self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> StyleClassifier {
        StyleClassifier::default()
    }

    #[test]
    fn test_section_markers() {
        let c = classifier();
        assert_eq!(c.classify_header(".about-hero"), Bucket::About);
        assert_eq!(c.classify_header(".connect-card:hover"), Bucket::Connect);
        assert_eq!(c.classify_header(".groups-grid > li"), Bucket::Groups);
        assert_eq!(c.classify_header(".watch-player iframe"), Bucket::Watch);
        assert_eq!(c.classify_header(".events-list"), Bucket::Events);
        for header in [".welcome-banner", ".latest-sermon", ".next-steps", ".hero-title", ".video-frame"] {
            assert_eq!(c.classify_header(header), Bucket::Home, "{header}");
        }
    }

    #[test]
    fn test_section_marker_ignores_surrounding_text() {
        let c = classifier();
        assert_eq!(c.classify_header("main .page-content .about-story h1"), Bucket::About);
        assert_eq!(c.classify_header("body.dark .connect-form input"), Bucket::Connect);
    }

    #[test]
    fn test_priority_follows_rule_order() {
        let c = classifier();
        // about is checked before connect
        assert_eq!(c.classify_header(".connect-card, .about-card"), Bucket::About);
        // watch is checked before home
        assert_eq!(c.classify_header(".hero-title .watch-link"), Bucket::Watch);
    }

    #[test]
    fn test_global_markers() {
        let c = classifier();
        for header in ["html", "body", ".app-shell", ".site-header", ".nav-links a", ".brand", ".sr-only"] {
            assert_eq!(c.classify_header(header), Bucket::Globals, "{header}");
        }
        assert_eq!(c.classify_header("@keyframes fade-in"), Bucket::Globals);
    }

    #[test]
    fn test_unmatched_header_falls_back() {
        let c = classifier();
        assert_eq!(c.classify_header(".totally-unknown"), Bucket::Globals);
        assert_eq!(c.classify_header(""), Bucket::Globals);
    }

    #[test]
    fn test_grouping_with_single_inner_bucket() {
        let c = classifier();
        let block = Block::new(
            "@media (max-width: 700px)",
            "\n.about-hero { padding: 0; }\n.about-story { gap: 1rem; }\n",
        );
        assert_eq!(c.classify_block(&block), Bucket::About);
    }

    #[test]
    fn test_grouping_with_mixed_inner_buckets_falls_back() {
        let c = classifier();
        let block = Block::new(
            "@media (min-width: 600px)",
            "\n.about-hero { color: red; }\n.connect-card { color: blue; }\n",
        );
        assert_eq!(c.classify_block(&block), Bucket::Globals);
    }

    #[test]
    fn test_empty_grouping_falls_back() {
        let c = classifier();
        assert_eq!(c.classify_block(&Block::new("@media print", "  ")), Bucket::Globals);
    }

    #[test]
    fn test_grouping_header_markers_are_ignored() {
        // The header of a grouping rule never decides its bucket.
        let c = classifier();
        let block = Block::new("@media (prefers-reduced-motion: reduce)", ".events-card { transition: none; }");
        assert_eq!(c.classify_block(&block), Bucket::Events);
    }

    #[test]
    fn test_non_grouping_at_rule_uses_header() {
        let c = classifier();
        let block = Block::new("@supports (display: grid)", ".about-grid { display: grid; }");
        assert_eq!(c.classify_block(&block), Bucket::Globals);
    }

    #[test]
    fn test_custom_rules() {
        let config = ClassifierConfig {
            rules: vec![crate::config::ClassificationRuleConfig {
                bucket: Bucket::Groups,
                markers: vec!["[data-group]".to_string()],
            }],
            grouping_prefixes: vec!["@media".to_string(), "@supports".to_string()],
            fallback: Bucket::Globals,
        };
        let c = StyleClassifier::new(&config);
        assert_eq!(c.classify_header("li[data-group]"), Bucket::Groups);
        assert_eq!(c.classify_header(".about-hero"), Bucket::Globals);
        let block = Block::new("@supports (gap: 1px)", "ul[data-group] { gap: 1px; }");
        assert_eq!(c.classify_block(&block), Bucket::Groups);
    }
}
