use crate::core::constants::ATTRIBUTION_SEPARATOR;
use crate::prelude::HashSet;

/// Splits a layer's attribution into trimmed, non-empty fragments.
///
/// Both `,` and `|` separate fragments, anywhere in the string, so
/// `"a|b,c"` yields three fragments. Leaflet's attribution control instead
/// splits on `|` alone when one is present and only falls back to `,`
/// otherwise, which would keep `"b,c"` whole.
pub fn fragments(attribution: &str) -> impl Iterator<Item = &str> {
    attribution
        .split([',', '|'])
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
}

/// Deduplicated attribution fragments of every active layer, in first-seen
/// order. Fragments compare by exact (case-sensitive) string equality.
#[derive(Debug, Clone, Default)]
pub struct AttributionRegistry {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl AttributionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every fragment of `attribution` not seen yet.
    /// Returns `true` if anything was added.
    pub fn add(&mut self, attribution: &str) -> bool {
        let mut changed = false;
        for fragment in fragments(attribution) {
            if self.seen.insert(fragment.to_string()) {
                self.entries.push(fragment.to_string());
                changed = true;
            }
        }
        changed
    }

    /// Rebuild from scratch out of the given attributions, in order
    pub fn rebuild<'a, I>(&mut self, attributions: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.clear();
        for attribution in attributions {
            self.add(attribution);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.seen.contains(fragment)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display text: fragments joined with `", "`
    pub fn render(&self) -> String {
        self.entries.join(ATTRIBUTION_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments() {
        let parts: Vec<_> = fragments(" foo | bar,baz ,, ").collect();
        assert_eq!(parts, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_mixed_separators() {
        let parts: Vec<_> = fragments("a|b,c").collect();
        assert_eq!(parts, vec!["a", "b", "c"]);

        let mut registry = AttributionRegistry::new();
        registry.add("a|b,c");
        registry.add("c");
        assert_eq!(registry.render(), "a, b, c");
    }

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let mut registry = AttributionRegistry::new();
        assert!(registry.add("foo|bar"));
        assert!(!registry.add("bar"));
        assert!(registry.add("bar,stool"));

        assert_eq!(registry.entries(), ["foo", "bar", "stool"]);
        assert_eq!(registry.render(), "foo, bar, stool");
    }

    #[test]
    fn test_case_sensitive() {
        let mut registry = AttributionRegistry::new();
        registry.add("OSM");
        registry.add("osm");
        assert_eq!(registry.render(), "OSM, osm");
    }

    #[test]
    fn test_rebuild_drops_unheld_fragments() {
        let mut registry = AttributionRegistry::new();
        registry.add("foo|bar");
        registry.add("bar,stool");

        registry.rebuild(["foo|bar"]);
        assert_eq!(registry.render(), "foo, bar");
        assert!(!registry.contains("stool"));
    }

    #[test]
    fn test_empty() {
        let mut registry = AttributionRegistry::new();
        assert!(!registry.add("  ,|"));
        assert!(registry.is_empty());
        assert_eq!(registry.render(), "");
    }
}
