pub mod eligibility;
pub mod suffix_trie;

pub use eligibility::EligibilityFilter;
pub use suffix_trie::SuffixTrie;
