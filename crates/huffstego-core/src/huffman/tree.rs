//! Symbol frequencies and Huffman tree construction.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{Result, StegoError};

/// Occurrence counts per symbol, kept in first-occurrence order.
///
/// The order matters: it is the insertion order used to break ties between
/// equal weights when the tree is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(char, u64)>,
    index: HashMap<char, usize>,
}

impl FrequencyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every character of `text`.
    pub fn from_text(text: &str) -> Self {
        let mut table = Self::new();
        for c in text.chars() {
            table.add(c, 1);
        }
        table
    }

    /// Add `count` occurrences of `symbol`, registering it if new.
    pub fn add(&mut self, symbol: char, count: u64) {
        match self.index.get(&symbol) {
            Some(&i) => self.entries[i].1 = self.entries[i].1.saturating_add(count),
            None => {
                self.index.insert(symbol, self.entries.len());
                self.entries.push((symbol, count));
            }
        }
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of counted symbols.
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, &(_, n)| acc.saturating_add(n))
    }

    /// Iterate `(symbol, count)` in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.entries.iter().copied()
    }
}

#[cfg(test)]
impl FrequencyTable {
    /// Count for `symbol`, zero when absent.
    fn get(&self, symbol: char) -> u64 {
        self.index
            .get(&symbol)
            .map(|&i| self.entries[i].1)
            .unwrap_or(0)
    }
}

/// A node of a Huffman tree.
///
/// Children are owned exclusively by their parent; internal nodes always
/// have exactly two of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf {
        symbol: char,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    pub fn weight(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { weight, .. } | HuffmanNode::Internal { weight, .. } => *weight,
        }
    }
}

#[cfg(test)]
impl HuffmanNode {
    fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }

    /// Number of leaves below (and including) this node.
    fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                HuffmanNode::Leaf { .. } => count += 1,
                HuffmanNode::Internal { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        count
    }
}

/// Heap entry ordering nodes by `(weight, age)`.
///
/// `BinaryHeap` is a max-heap, so the ordering is inverted on weight: the
/// lightest node is "greatest". Among equal weights the most recently
/// inserted node (highest sequence number) is popped first.
struct Queued {
    weight: u64,
    seq: u64,
    node: HuffmanNode,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Build a Huffman tree from symbol frequencies.
///
/// Leaves are queued in first-occurrence order and every merged node gets
/// the next sequence number. The two nodes popped in each round are merged
/// with the first (lighter, or younger on a tie) as the right child and the
/// second as the left child, so the same frequencies always produce the
/// same tree.
///
/// # Errors
///
/// Returns `StegoError::Validation` if `frequencies` is empty.
///
/// # Example
/// ```
/// use huffstego_core::huffman::{build_tree, FrequencyTable};
///
/// let root = build_tree(&FrequencyTable::from_text("aaab")).unwrap();
/// assert_eq!(root.weight(), 4);
/// ```
pub fn build_tree(frequencies: &FrequencyTable) -> Result<HuffmanNode> {
    let mut heap: BinaryHeap<Queued> = frequencies
        .iter()
        .enumerate()
        .map(|(i, (symbol, weight))| Queued {
            weight,
            seq: i as u64,
            node: HuffmanNode::Leaf { symbol, weight },
        })
        .collect();
    let mut next_seq = heap.len() as u64;

    loop {
        let first = heap.pop().ok_or_else(|| {
            StegoError::Validation("cannot build a Huffman tree without symbols".to_string())
        })?;
        let Some(second) = heap.pop() else {
            return Ok(first.node);
        };

        let weight = first.weight.saturating_add(second.weight);
        heap.push(Queued {
            weight,
            seq: next_seq,
            node: HuffmanNode::Internal {
                weight,
                left: Box::new(second.node),
                right: Box::new(first.node),
            },
        });
        next_seq += 1;
    }
}
