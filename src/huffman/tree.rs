use std::{cmp::Reverse, collections::BinaryHeap, mem::take};

use crate::{HuffError, Result};

use super::{CodeEntry, CodeTable, FrequencyTable, K_NUM_SYMBOLS, MAX_CODE_LEN};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeNode {
    Leaf { symbol: u8, frequency: u64 },
    /// Children are indices into the tree arena.
    Internal { frequency: u64, left: usize, right: usize },
}

impl TreeNode {
    pub fn frequency(&self) -> u64 {
        match self {
            TreeNode::Leaf { frequency, .. } => *frequency,
            TreeNode::Internal { frequency, .. } => *frequency,
        }
    }
}

/// Entry of the priority queue: a node of the arena plus its creation number.
#[derive(Debug, Clone, Copy)]
struct HeapNode {
    frequency: u64,
    sequence: u64,
    node: usize,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.frequency == other.frequency {
            return self.sequence.cmp(&other.sequence);
        }
        self.frequency.cmp(&other.frequency)
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for HeapNode {}

impl PartialEq for HeapNode {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency && self.sequence == other.sequence
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<TreeNode>,
    root: usize,
}

impl HuffmanTree {
    pub fn root(&self) -> &TreeNode {
        &self.nodes[self.root]
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, TreeNode::Leaf { .. })).count()
    }

    /// Assigns the codes walking the tree depth first: a left edge appends a
    /// 0, a right edge a 1. A tree made of a single leaf gets the 1-bit code 0.
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut table = CodeTable::default();

        if let TreeNode::Leaf { symbol, .. } = self.nodes[self.root] {
            table.insert(CodeEntry::new(symbol, 0, 1))?;
            return Ok(table);
        }

        let mut stack = vec![(self.root, 0u32, 0u32)];

        while let Some((index, code, len)) = stack.pop() {
            match self.nodes[index] {
                TreeNode::Leaf { symbol, .. } => {
                    table.insert(CodeEntry::new(symbol, code, len))?;
                }
                TreeNode::Internal { left, right, .. } => {
                    if len == MAX_CODE_LEN {
                        return Err(HuffError::CodeTooLong {
                            symbol: self.first_symbol_below(index),
                            max: MAX_CODE_LEN,
                        });
                    }
                    // right first so that the left subtree is visited first
                    stack.push((right, (code << 1) | 1, len + 1));
                    stack.push((left, code << 1, len + 1));
                }
            }
        }

        Ok(table)
    }

    fn first_symbol_below(&self, mut index: usize) -> u8 {
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { symbol, .. } => return symbol,
                TreeNode::Internal { left, .. } => index = left,
            }
        }
    }
}

/// Builds Huffman trees. Ties between nodes of equal frequency go to the node
/// created first; the creation counter lives in the builder.
#[derive(Default, Debug)]
pub struct HuffmanTreeBuilder {
    sequence: u64,
    nodes: Vec<TreeNode>,
    freq_tree: BinaryHeap<Reverse<HeapNode>>,
}

impl HuffmanTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_node(&mut self, node: TreeNode) {
        let index = self.nodes.len();
        self.nodes.push(node);

        self.freq_tree.push(Reverse(HeapNode {
            frequency: node.frequency(),
            sequence: self.sequence,
            node: index,
        }));
        self.sequence += 1;
    }

    /// Returns `None` when there is no symbol to build a tree from.
    pub fn build(&mut self, freq: &FrequencyTable) -> Option<HuffmanTree> {
        self.nodes = Vec::with_capacity(2 * freq.len());
        self.freq_tree.clear();

        let mut leaves: Vec<_> = freq.iter().collect();
        leaves.sort_unstable_by_key(|&(symbol, _)| symbol);

        for (symbol, frequency) in leaves {
            self.push_node(TreeNode::Leaf { symbol, frequency });
        }

        while self.freq_tree.len() > 1 {
            let Reverse(left) = self.freq_tree.pop()?;
            let Reverse(right) = self.freq_tree.pop()?;

            self.push_node(TreeNode::Internal {
                frequency: left.frequency + right.frequency,
                left: left.node,
                right: right.node,
            });
        }

        let Reverse(root) = self.freq_tree.pop()?;

        Some(HuffmanTree {
            nodes: std::mem::take(&mut self.nodes),
            root: root.node,
        })
    }
}

/// Optimal code lengths of at most `max_len` bits, computed with package-merge.
/// Returned as `(symbol, length)` pairs sorted by symbol.
pub fn limited_code_lengths(freq: &FrequencyTable, max_len: u32) -> Vec<(u8, u32)> {
    let mut leaves: Vec<_> = freq.iter().collect();
    leaves.sort_unstable_by_key(|&(symbol, _)| symbol);

    let mut lengths = [0u32; K_NUM_SYMBOLS];

    if leaves.len() <= 1 {
        return leaves.into_iter().map(|(symbol, _)| (symbol, 1)).collect();
    }

    let max_len = max_len as usize;
    let mut bags = vec![Vec::<(u64, Vec<u8>)>::new(); max_len];
    for bag in bags.iter_mut() {
        bag.extend(leaves.iter().map(|&(symbol, frequency)| (frequency, vec![symbol])));
    }

    // merge consecutive pairs of each bag into packages one bit shorter
    for i in 0..max_len - 1 {
        bags[i].sort();

        let mut j = 0;
        while j + 1 < bags[i].len() {
            let frequency = bags[i][j].0 + bags[i][j + 1].0;
            let mut symbols = take(&mut bags[i][j].1);
            symbols.extend_from_slice(&bags[i][j + 1].1);

            bags[i + 1].push((frequency, symbols));
            j += 2;
        }
    }
    bags[max_len - 1].sort();

    // every occurrence of a symbol in the cheapest 2n - 2 groups costs one bit
    for (_, symbols) in bags[max_len - 1].iter().take(2 * leaves.len() - 2) {
        for &symbol in symbols {
            lengths[symbol as usize] += 1;
        }
    }

    leaves
        .into_iter()
        .map(|(symbol, _)| (symbol, lengths[symbol as usize]))
        .collect()
}

/// Canonical codes for the given lengths: entries sorted by (length, symbol)
/// get consecutive codes, shifted left whenever the length grows.
pub fn canonical_table(lengths: &[(u8, u32)]) -> Result<CodeTable> {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable_by_key(|&(symbol, length)| (length, symbol));

    let mut table = CodeTable::default();
    let mut code = 0u32;
    let mut prev_len = sorted.first().map_or(0, |&(_, length)| length);

    for (symbol, length) in sorted {
        code <<= length - prev_len;
        table.insert(CodeEntry::new(symbol, code, length))?;
        code = code.wrapping_add(1);
        prev_len = length;
    }

    Ok(table)
}
