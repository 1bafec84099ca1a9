use super::suffix_trie::SuffixTrie;
use ferrous_fanmerge_domain::validators::is_subdomain_of;

/// Decides which queries are fanned out.
///
/// A name qualifies when it sits at or below the `from` zone and is not at or
/// below any excluded domain.
pub struct EligibilityFilter {
    from: String,
    except: SuffixTrie,
}

impl EligibilityFilter {
    pub fn new<S: AsRef<str>>(from: &str, except: &[S]) -> Self {
        let mut trie = SuffixTrie::new();
        for domain in except {
            trie.insert(domain.as_ref());
        }
        Self {
            from: from.to_string(),
            except: trie,
        }
    }

    /// Filter that accepts every name.
    pub fn allow_all() -> Self {
        Self::new::<&str>(".", &[])
    }

    pub fn matches(&self, name: &str) -> bool {
        is_subdomain_of(name, &self.from) && !self.except.contains(name)
    }
}
