use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use super::{environment::Environment, hash_key::{HashKey, NotHashable}, values::Value};
use crate::parser::astnode::BlockStatement;

/// A closure: parameters, a shared handle to the body, and the environment
/// that was active where the function literal was evaluated.
#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Rc<BlockStatement>,
    pub env: Environment,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) {}", self.parameters.iter().join(", "), self.body)
    }
}

#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

/// Entries of a `Hash` value, kept in insertion order.
///
/// Entries are bucketed by `HashKey`; inside a bucket the original key is
/// compared, so two strings whose FNV hashes collide stay separate entries.
#[derive(Debug, Clone, Default)]
pub struct HashObject {
    pairs: Vec<HashPair>,
    buckets: FxHashMap<HashKey, Vec<usize>>,
}

impl HashObject {
    fn position(&self, hash_key: &HashKey, key: &Value) -> Option<usize> {
        self.buckets
            .get(hash_key)?
            .iter()
            .copied()
            .find(|idx| self.pairs[*idx].key == *key)
    }

    /// Inserts or overwrites the entry for `key`.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), NotHashable> {
        let hash_key = key.hash_key()?;
        match self.position(&hash_key, &key) {
            Some(idx) => self.pairs[idx].value = value,
            None => {
                self.buckets.entry(hash_key).or_default().push(self.pairs.len());
                self.pairs.push(HashPair { key, value });
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &Value) -> Result<Option<&Value>, NotHashable> {
        let hash_key = key.hash_key()?;
        Ok(self.position(&hash_key, key).map(|idx| &self.pairs[idx].value))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HashPair> {
        self.pairs.iter()
    }

    /// Places `key` in the bucket of `hash_key` regardless of its real hash.
    #[cfg(test)]
    fn insert_with_key(&mut self, hash_key: HashKey, key: Value, value: Value) {
        match self.position(&hash_key, &key) {
            Some(idx) => self.pairs[idx].value = value,
            None => {
                self.buckets.entry(hash_key).or_default().push(self.pairs.len());
                self.pairs.push(HashPair { key, value });
            }
        }
    }
}
