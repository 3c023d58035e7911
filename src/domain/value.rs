// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Scalar Values
//!
//! Rows coming out of a source database and attributes going into the target
//! store are plain maps of field name to `Value`. Nothing here knows about
//! Oracle, CSV or JSON; the adapters convert into this shape.

use crate::domain::errors::{ImportError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Insertion-ordered field map used for mapped attributes and stored records.
pub type Attributes = IndexMap<String, Value>;

/// A single scalar cell.
///
/// `untagged` lets plain JSON/YAML scalars (`1`, `"a"`, `null`) deserialize
/// straight into the matching variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// `Null` and the empty string count as "unset". Zero and `false` are
    /// real values.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts the value into an identifier usable as a lookup key.
    ///
    /// Numeric text is normalised to `Int` so that `"7"` read from a CSV file
    /// and `7` read from a database column identify the same row.
    pub fn to_key(&self) -> Result<RecordKey> {
        match self {
            Value::Int(i) => Ok(RecordKey::Int(*i)),
            Value::Float(f)
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 =>
            {
                Ok(RecordKey::Int(*f as i64))
            }
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ImportError::InvalidIdentifier("empty string".to_string()));
                }
                Ok(trimmed
                    .parse::<i64>()
                    .map(RecordKey::Int)
                    .unwrap_or_else(|_| RecordKey::Text(trimmed.to_string())))
            }
            other => Err(ImportError::InvalidIdentifier(other.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Identifier of a source row or of a target record.
///
/// Only the hashable subset of `Value` is allowed here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Int(i) => write!(f, "{}", i),
            RecordKey::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<RecordKey> for Value {
    fn from(key: RecordKey) -> Self {
        match key {
            RecordKey::Int(i) => Value::Int(i),
            RecordKey::Text(s) => Value::Text(s),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(i: i64) -> Self {
        RecordKey::Int(i)
    }
}
