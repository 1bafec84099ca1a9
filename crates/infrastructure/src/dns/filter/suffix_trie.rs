use compact_str::CompactString;
use ferrous_fanmerge_domain::validators::normalize_domain;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::HashMap;

/// A node in the reversed-label suffix trie.
#[derive(Default)]
struct TrieNode {
    children: HashMap<CompactString, TrieNode, FxBuildHasher>,
    /// A domain inserted into the set ends at this node.
    terminal: bool,
}

/// Set of domains where membership covers the domain and everything below it.
///
/// Domains are stored as reversed label paths:
/// `corp.example.org` → ["org", "example", "corp"].
///
/// Lookup for `host.corp.example.org` walks org → example → corp, finds
/// `corp` terminal and reports a match. `example.org` alone does not match.
#[derive(Default)]
pub struct SuffixTrie {
    root: TrieNode,
    len: usize,
}

impl SuffixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `domain`; case and trailing dot are ignored. The root name covers everything.
    pub fn insert(&mut self, domain: &str) {
        let domain = normalize_domain(domain);
        let mut node = &mut self.root;
        if !domain.is_empty() {
            for label in domain.split('.').rev() {
                node = node.children.entry(CompactString::new(label)).or_default();
            }
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    /// True when `domain` or one of its parents was inserted.
    pub fn contains(&self, domain: &str) -> bool {
        if self.root.terminal {
            return true;
        }
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return false;
        }

        let labels: SmallVec<[&str; 8]> = domain.split('.').rev().collect();
        let mut node = &self.root;
        for label in labels {
            match node.children.get(label) {
                Some(child) if child.terminal => return true,
                Some(child) => node = child,
                None => return false,
            }
        }
        false
    }
}
