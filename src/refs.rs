//! Reference collector.
//!
//! Append-only. Every list keeps first-seen order and drops repeats.

use std::hash::Hash;

use rustc_hash::FxHashSet;

/// Insertion-ordered set.
#[derive(Debug, Clone)]
struct OrderedSet<T> {
    items: Vec<T>,
    seen: FxHashSet<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: FxHashSet::default(),
        }
    }
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    fn insert(&mut self, item: T) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }

    fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Side-channel data gathered while parsing one document.
#[derive(Debug, Default, Clone)]
pub struct References {
    post_ids: OrderedSet<u64>,
    wiki_pages: OrderedSet<String>,
    mentions: OrderedSet<String>,
    qtags: OrderedSet<String>,
    thumbs: usize,
}

impl References {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a `thumb #N` and register its id unless the cap is
    /// reached. Returns whether the thumbnail is realized.
    pub fn add_thumb(&mut self, post_id: u64, max_thumbs: Option<usize>) -> bool {
        if max_thumbs.is_some_and(|max| self.thumbs >= max) {
            return false;
        }
        self.thumbs += 1;
        self.post_ids.insert(post_id);
        true
    }

    pub fn add_wiki_page(&mut self, title: &str) {
        self.wiki_pages.insert(title.to_owned());
    }

    pub fn add_mention(&mut self, name: &str) {
        self.mentions.insert(name.to_owned());
    }

    /// Qtags are stored lower-cased.
    pub fn add_qtag(&mut self, tag: &str) {
        self.qtags.insert(tag.to_lowercase());
    }

    pub fn post_ids(&self) -> &[u64] {
        &self.post_ids.items
    }

    pub fn wiki_pages(&self) -> &[String] {
        &self.wiki_pages.items
    }

    pub fn mentions(&self) -> &[String] {
        &self.mentions.items
    }

    pub fn qtags(&self) -> &[String] {
        &self.qtags.items
    }

    /// Split into `(post_ids, wiki_pages, mentions, qtags)`.
    pub fn into_parts(self) -> (Vec<u64>, Vec<String>, Vec<String>, Vec<String>) {
        (
            self.post_ids.into_vec(),
            self.wiki_pages.into_vec(),
            self.mentions.into_vec(),
            self.qtags.into_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_order() {
        let mut refs = References::new();
        refs.add_mention("bob");
        refs.add_mention("alice");
        refs.add_mention("bob");
        assert_eq!(refs.mentions(), ["bob", "alice"]);
    }

    #[test]
    fn test_thumb_cap() {
        let mut refs = References::new();
        assert!(refs.add_thumb(1, Some(1)));
        assert!(!refs.add_thumb(2, Some(1)));
        assert_eq!(refs.post_ids(), [1]);
    }

    #[test]
    fn test_thumb_cap_counts_repeats() {
        let mut refs = References::new();
        assert!(refs.add_thumb(1, Some(2)));
        assert!(refs.add_thumb(1, Some(2)));
        assert!(!refs.add_thumb(2, Some(2)));
        assert_eq!(refs.post_ids(), [1]);
    }

    #[test]
    fn test_uncapped_thumbs() {
        let mut refs = References::new();
        for id in [3, 1, 3, 2] {
            assert!(refs.add_thumb(id, None));
        }
        assert_eq!(refs.post_ids(), [3, 1, 2]);
    }

    #[test]
    fn test_qtags_lowercased() {
        let mut refs = References::new();
        refs.add_qtag("Fluffy");
        refs.add_qtag("fluffy");
        refs.add_wiki_page("touhou");
        let (_, wiki, _, qtags) = refs.into_parts();
        assert_eq!(qtags, ["fluffy"]);
        assert_eq!(wiki, ["touhou"]);
    }
}
