//! Function metadata table
//!
//! CALL refers to functions by their index in this table rather than by code
//! address, so a front-end can emit `call i` before it knows where function
//! `i` will live and fill the address in later.

use crate::error::RuntimeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shape and entry point of one callable function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMeta {
    /// Function name (for tracing and error messages)
    pub name: String,
    /// Number of arguments taken from the operand stack
    #[serde(alias = "args")]
    pub arg_count: usize,
    /// Number of additional zero-initialized locals
    #[serde(alias = "locals")]
    pub local_count: usize,
    /// Code address of the first instruction
    pub address: usize,
}

impl FunctionMeta {
    pub fn new(name: impl Into<String>, arg_count: usize, local_count: usize, address: usize) -> Self {
        Self {
            name: name.into(),
            arg_count,
            local_count,
            address,
        }
    }

    /// Slots in a frame for this function: arguments first, then locals
    pub fn frame_size(&self) -> usize {
        self.arg_count + self.local_count
    }
}

/// Immutable, index-addressed sequence of function descriptors
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionTable {
    functions: Vec<Arc<FunctionMeta>>,
}

impl FunctionTable {
    pub fn new(functions: Vec<FunctionMeta>) -> Self {
        Self {
            functions: functions.into_iter().map(Arc::new).collect(),
        }
    }

    /// Resolve a CALL operand. `ip` is the address of the calling instruction.
    pub fn get(&self, index: i32, ip: usize) -> Result<&Arc<FunctionMeta>, RuntimeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.functions.get(i))
            .ok_or(RuntimeError::InvalidFunctionIndex { index, ip })
    }

    /// Look up a function without fault reporting
    pub fn lookup(&self, index: i32) -> Option<&FunctionMeta> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.functions.get(i))
            .map(|f| f.as_ref())
    }

    /// The entry function (index 0)
    pub fn entry(&self) -> Option<&Arc<FunctionMeta>> {
        self.functions.first()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionMeta> {
        self.functions.iter().map(|f| f.as_ref())
    }
}
