//! Prefix trie used for longest-match scanning.
//!
//! The tokenizer walks it one character at a time to match multi-character
//! operators, and [`crate::time`] uses it to split format strings into the
//! longest known directives.

use std::collections::HashMap;

/// Result of looking up a key or a single step in a trie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrieResult {
    /// Key not found in trie
    Failed,
    /// Key is a prefix of an existing key
    Prefix,
    /// Key exists in trie
    Exists,
}

/// A trie (prefix tree) keyed by `char`s, generic over the stored value.
///
/// ```
/// use sqlweave::trie::{Trie, TrieResult};
///
/// let mut trie = Trie::new();
/// trie.insert("<=", 1);
/// trie.insert("<=>", 2);
///
/// assert_eq!(trie.in_trie("<=>"), (TrieResult::Exists, Some(&2)));
/// assert_eq!(trie.in_trie("<").0, TrieResult::Prefix);
/// ```
#[derive(Debug, Clone)]
pub struct Trie<V> {
    children: HashMap<char, Trie<V>>,
    value: Option<V>,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            value: None,
        }
    }

    pub fn insert(&mut self, key: &str, value: V) {
        let mut current = self;
        for ch in key.chars() {
            current = current.children.entry(ch).or_default();
        }
        current.value = Some(value);
    }

    /// Value stored under exactly `key`
    pub fn get(&self, key: &str) -> Option<&V> {
        let mut current = self;
        for ch in key.chars() {
            current = current.children.get(&ch)?;
        }
        current.value.as_ref()
    }

    pub fn in_trie(&self, key: &str) -> (TrieResult, Option<&V>) {
        if key.is_empty() {
            return (TrieResult::Failed, None);
        }
        let mut current = self;
        for ch in key.chars() {
            match current.children.get(&ch) {
                Some(child) => current = child,
                None => return (TrieResult::Failed, None),
            }
        }
        match &current.value {
            Some(v) => (TrieResult::Exists, Some(v)),
            None => (TrieResult::Prefix, None),
        }
    }

    /// Follow one character from this node, returning the subtrie reached.
    pub fn in_trie_char(&self, ch: char) -> (TrieResult, Option<&Trie<V>>) {
        match self.children.get(&ch) {
            Some(child) if child.value.is_some() => (TrieResult::Exists, Some(child)),
            Some(child) => (TrieResult::Prefix, Some(child)),
            None => (TrieResult::Failed, None),
        }
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.value.is_none()
    }

    /// Length in chars of the longest key that prefixes `input`, with its value.
    pub fn longest_match(&self, input: &[char]) -> Option<(usize, &V)> {
        let mut node = self;
        let mut best = None;
        for (i, ch) in input.iter().enumerate() {
            match node.children.get(ch) {
                Some(child) => {
                    if let Some(v) = &child.value {
                        best = Some((i + 1, v));
                    }
                    node = child;
                }
                None => break,
            }
        }
        best
    }
}

/// Build a trie from `(key, value)` pairs
pub fn new_trie<V, K, I>(entries: I) -> Trie<V>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
{
    let mut trie = Trie::new();
    for (key, value) in entries {
        trie.insert(key.as_ref(), value);
    }
    trie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_prefixes() {
        let trie = new_trie([("bla", ()), ("blab", ())]);
        assert_eq!(trie.in_trie("bla").0, TrieResult::Exists);
        assert_eq!(trie.in_trie("blab").0, TrieResult::Exists);
        assert_eq!(trie.in_trie("bl").0, TrieResult::Prefix);
        assert_eq!(trie.in_trie("bob").0, TrieResult::Failed);
        assert_eq!(trie.in_trie("").0, TrieResult::Failed);
    }

    #[test]
    fn test_get_value() {
        let trie = new_trie([("foo", 42), ("bar", 100)]);
        assert_eq!(trie.get("foo"), Some(&42));
        assert_eq!(trie.get("fo"), None);
    }

    #[test]
    fn test_in_trie_char_walk() {
        let trie = new_trie([("cat", ()), ("car", ())]);
        let (result, sub) = trie.in_trie_char('c');
        assert_eq!(result, TrieResult::Prefix);
        let (result, sub) = sub.unwrap().in_trie_char('a');
        assert_eq!(result, TrieResult::Prefix);
        let (result, _) = sub.unwrap().in_trie_char('t');
        assert_eq!(result, TrieResult::Exists);
        assert_eq!(trie.in_trie_char('d').0, TrieResult::Failed);
    }

    #[test]
    fn test_longest_match() {
        let trie = new_trie([("yy", 2), ("yyyy", 4), ("y", 1)]);
        let input: Vec<char> = "yyyyy-MM".chars().collect();
        assert_eq!(trie.longest_match(&input), Some((4, &4)));
        let input: Vec<char> = "-MM".chars().collect();
        assert_eq!(trie.longest_match(&input), None);
    }
}
