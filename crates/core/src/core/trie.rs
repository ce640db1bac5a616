//! Character trie and greedy longest-match splitting.
//!
//! WordPiece splits a word by repeatedly taking the longest vocabulary entry
//! starting at the current position. Entries that continue a word carry a
//! prefix marker (`##` by default), so lookups at non-initial positions walk
//! the marker first and then the characters.

use ahash::AHashMap;
use compact_str::CompactString;

/// Trie node keyed by character.
#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: AHashMap<char, TrieNode>,
    terminal: bool,
}

/// Trie over vocabulary entries for fast prefix lookup.
#[derive(Debug, Clone, Default)]
pub struct VocabTrie {
    root: TrieNode,
    len: usize,
}

impl VocabTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie from an iterator of tokens.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut trie = Self::new();
        for token in tokens {
            trie.insert(token);
        }
        trie
    }

    /// Insert a token string into the trie.
    pub fn insert(&mut self, token: &str) {
        let mut node = &mut self.root;
        for ch in token.chars() {
            node = node.children.entry(ch).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.walk(&self.root, token).is_some_and(|node| node.terminal)
    }

    /// Number of distinct tokens stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn walk<'a>(&'a self, from: &'a TrieNode, text: &str) -> Option<&'a TrieNode> {
        let mut node = from;
        for ch in text.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    /// Length in chars of the longest entry `prefix + chars[pos..pos+n]`.
    ///
    /// Returns None if no entry with at least one character of `chars`
    /// matches.
    pub fn longest_match(&self, chars: &[char], pos: usize, prefix: &str) -> Option<usize> {
        let mut node = self.walk(&self.root, prefix)?;
        let mut best = None;

        for (offset, ch) in chars[pos..].iter().enumerate() {
            match node.children.get(ch) {
                Some(child) => {
                    node = child;
                    if node.terminal {
                        best = Some(offset + 1);
                    }
                }
                None => break,
            }
        }

        best
    }
}

/// Split a word into subword units by greedy longest match.
///
/// Units after the first carry `continuation_prefix`. If some position has
/// no match at all the whole word is unsplittable and the result is a single
/// `unk` unit. An empty word yields no units.
pub fn split_longest_match(
    word: &str,
    trie: &VocabTrie,
    continuation_prefix: &str,
    unk: &str,
) -> Vec<CompactString> {
    let chars: Vec<char> = word.chars().collect();
    let mut units = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let prefix = if pos == 0 { "" } else { continuation_prefix };

        match trie.longest_match(&chars, pos, prefix) {
            Some(len) => {
                let mut unit = CompactString::new(prefix);
                unit.extend(chars[pos..pos + len].iter().copied());
                units.push(unit);
                pos += len;
            }
            None => return vec![CompactString::new(unk)],
        }
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie(tokens: &[&str]) -> VocabTrie {
        VocabTrie::from_tokens(tokens.iter().copied())
    }

    #[test]
    fn test_insert_contains() {
        let trie = trie(&["un", "##able", "u"]);

        assert!(trie.contains("un"));
        assert!(trie.contains("u"));
        assert!(trie.contains("##able"));
        assert!(!trie.contains("##abl"));
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn test_longest_match_prefers_longer() {
        let trie = trie(&["h", "he", "hell", "##o"]);
        let chars: Vec<char> = "hello".chars().collect();

        assert_eq!(trie.longest_match(&chars, 0, ""), Some(4));
        assert_eq!(trie.longest_match(&chars, 4, "##"), Some(1));
        assert_eq!(trie.longest_match(&chars, 1, "##"), None);
    }

    #[test]
    fn test_split_word() {
        let trie = trie(&["un", "##happi", "##ness", "##h", "happiness"]);

        let units = split_longest_match("unhappiness", &trie, "##", "[UNK]");
        assert_eq!(units, vec!["un", "##happi", "##ness"]);
    }

    #[test]
    fn test_split_is_all_or_nothing() {
        let trie = trie(&["un", "##happy"]);

        let units = split_longest_match("unhappiness", &trie, "##", "[UNK]");
        assert_eq!(units, vec!["[UNK]"]);
    }

    #[test]
    fn test_split_multibyte_chars() {
        let trie = trie(&["é", "##t", "##é"]);

        let units = split_longest_match("été", &trie, "##", "[UNK]");
        assert_eq!(units, vec!["é", "##t", "##é"]);
    }

    #[test]
    fn test_split_empty_word() {
        let trie = trie(&["a"]);
        assert!(split_longest_match("", &trie, "##", "[UNK]").is_empty());
    }
}
