//! Content-derived keys for using values inside a `Hash`.
//!
//! Only integers, booleans and strings are hashable. A key is the pair of the
//! value's type tag and a 64-bit number derived from its content, never from
//! its address, so two separately built `"foo"` strings land on the same key.
//!
//! String keys use 64-bit FNV-1a with the standard offset basis, so the same
//! text hashes identically across runs. Distinct strings can still collide;
//! `HashObject` keeps colliding entries apart by comparing the original key
//! on every lookup.

use thiserror::Error;

use super::values::{type_of, Type, Value};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct HashKey {
    pub ty: Type,
    pub value: u64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("unusable as hash key: {0}")]
pub struct NotHashable(pub Type);

pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

impl Value {
    pub fn is_hashable(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Boolean(_) | Value::String(_))
    }

    pub fn hash_key(&self) -> Result<HashKey, NotHashable> {
        let value = match self {
            Value::Integer(v) => *v as u64,
            Value::Boolean(v) => u64::from(*v),
            Value::String(s) => fnv1a(s.as_bytes()),
            other => return Err(NotHashable(type_of(other))),
        };
        Ok(HashKey { ty: type_of(self), value })
    }
}
