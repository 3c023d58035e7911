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

//! # Row Source Port
//!
//! In Hexagonal Architecture, a **Port** is a contract the application
//! relies on without knowing who fulfils it.
//!
//! This Port defines what it means to "read a source table". It doesn't care
//! IF the rows come from Oracle, a directory of CSV files or a mock in a
//! test.

use crate::domain::errors::Result;
use crate::domain::row::Row;
use crate::domain::table_spec::SourceLocation;

/// `RowSource` fetches every row of one source table.
pub trait RowSource: Send + Sync {
    /// Returns the rows of `location` in a reproducible order.
    ///
    /// Every row must carry an `id` field plus whatever fields the table's
    /// spec refers to.
    fn fetch_rows(&self, location: &SourceLocation) -> Result<Vec<Row>>;
}
