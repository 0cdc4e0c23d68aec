//! Code words and the symbol → code table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::tree::{FrequencyTable, HuffmanNode};
use crate::bits::{format_bits, parse_bits};
use crate::error::{Result, StegoError};

/// A non-empty code word.
///
/// Serializes as its `"0101"` text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code(Vec<bool>);

impl Code {
    /// Wrap a bit sequence as a code word.
    ///
    /// # Errors
    ///
    /// Returns `StegoError::Validation` if `bits` is empty.
    pub fn new(bits: Vec<bool>) -> Result<Self> {
        if bits.is_empty() {
            return Err(StegoError::Validation("code words cannot be empty".to_string()));
        }
        Ok(Self(bits))
    }

    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a constructed code.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` is a prefix of `other` (equal codes count).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_bits(&self.0))
    }
}

impl FromStr for Code {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(parse_bits(s)?)
    }
}

impl TryFrom<String> for Code {
    type Error = StegoError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.to_string()
    }
}

/// Mapping from symbol to its code word.
///
/// Entries are kept sorted by symbol so iteration (and therefore the
/// serialized form) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeTable {
    codes: BTreeMap<char, Code>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(symbol, code)` pairs and check it is usable.
    ///
    /// # Errors
    ///
    /// Returns `StegoError::Validation` for a repeated symbol or a set of
    /// codes that is not prefix-free.
    pub fn from_codes<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (char, Code)>,
    {
        let mut table = Self::new();
        for (symbol, code) in pairs {
            if table.codes.insert(symbol, code).is_some() {
                return Err(StegoError::Validation(format!(
                    "symbol {symbol:?} appears twice in code table"
                )));
            }
        }
        table.validate()?;
        Ok(table)
    }

    /// Insert or replace a code without validation.
    pub fn insert(&mut self, symbol: char, code: Code) -> Option<Code> {
        self.codes.insert(symbol, code)
    }

    pub fn get(&self, symbol: char) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Code)> + '_ {
        self.codes.iter().map(|(&s, c)| (s, c))
    }

    /// Length of the longest code word, zero for an empty table.
    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    /// Exact number of bits `frequencies` encodes to under this table.
    ///
    /// Symbols missing from the table contribute nothing.
    pub fn encoded_len(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter()
            .filter_map(|(symbol, count)| self.get(symbol).map(|c| c.len() as u64 * count))
            .sum()
    }

    /// True if no code is a prefix of (or equal to) another.
    pub fn is_prefix_free(&self) -> bool {
        // After sorting, a code that prefixes any other also prefixes its
        // immediate successor.
        let mut codes: Vec<&Code> = self.codes.values().collect();
        codes.sort();
        codes.windows(2).all(|w| !w[0].is_prefix_of(w[1]))
    }

    /// Check the table can drive an unambiguous decode.
    pub fn validate(&self) -> Result<()> {
        if !self.is_prefix_free() {
            return Err(StegoError::Validation(
                "code table is not prefix-free".to_string(),
            ));
        }
        Ok(())
    }
}

/// Assign codes by walking the tree: `0` on left edges, `1` on right edges.
///
/// A tree that is a single leaf gets the one-bit placeholder code `"0"`, so
/// the table is never empty.
pub fn derive_codes(root: &HuffmanNode) -> CodeTable {
    let mut table = CodeTable::new();
    let mut stack: Vec<(&HuffmanNode, Vec<bool>)> = vec![(root, Vec::new())];

    while let Some((node, path)) = stack.pop() {
        match node {
            HuffmanNode::Leaf { symbol, .. } => {
                let bits = if path.is_empty() { vec![false] } else { path };
                table.insert(*symbol, Code(bits));
            }
            HuffmanNode::Internal { left, right, .. } => {
                let mut right_path = path.clone();
                right_path.push(true);
                stack.push((&**right, right_path));

                let mut left_path = path;
                left_path.push(false);
                stack.push((&**left, left_path));
            }
        }
    }

    table
}
