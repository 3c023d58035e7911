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

//! # Target Store Port
//!
//! The persistence side of an import. Implementations own the records and
//! assign their identifiers; the engine only ever sees `Record` snapshots.

use crate::domain::entity::EntityType;
use crate::domain::errors::Result;
use crate::domain::record::Record;
use crate::domain::value::{Attributes, RecordKey, Value};

/// `TargetStore` finds, creates and updates records of registered entity types.
///
/// Methods take `&self`: adapters that mutate shared state use interior
/// mutability so the store can sit behind an `Arc` like the other ports.
pub trait TargetStore: Send + Sync {
    /// Returns the single record whose `field` equals `value`, if any.
    ///
    /// More than one match violates the natural key contract; adapters may
    /// return any of them.
    fn find_one(&self, entity_type: &EntityType, field: &str, value: &Value)
        -> Result<Option<Record>>;

    fn find_by_id(&self, entity_type: &EntityType, id: &RecordKey) -> Result<Option<Record>>;

    /// Creates a record and returns it with its assigned id.
    fn create(&self, entity_type: &EntityType, attributes: Attributes) -> Result<Record>;

    /// Overwrites the given attributes of an existing record and returns the
    /// updated snapshot. Attributes not listed are left as they are.
    fn update(&self, entity_type: &EntityType, id: &RecordKey, attributes: Attributes)
        -> Result<Record>;
}
