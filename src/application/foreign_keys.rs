//! Rewrites the foreign key columns of a row from source identifiers to the
//! identifiers the referenced records received in the target store.

use crate::domain::errors::{ImportError, Result};
use crate::domain::identity_map::IdentityMapper;
use crate::domain::row::Row;
use crate::domain::table_spec::{KeyResolution, TableSpec};
use crate::ports::import_observer::ImportObserver;
use crate::ports::target_store::TargetStore;

/// Borrowed view over the state needed to resolve one row's foreign keys.
pub struct ForeignKeyResolver<'a> {
    identity: &'a IdentityMapper,
    store: &'a dyn TargetStore,
    observer: &'a dyn ImportObserver,
}

impl<'a> ForeignKeyResolver<'a> {
    pub fn new(
        identity: &'a IdentityMapper,
        store: &'a dyn TargetStore,
        observer: &'a dyn ImportObserver,
    ) -> Self {
        Self {
            identity,
            store,
            observer,
        }
    }

    /// Returns a copy of `row` with every declared foreign key rewritten.
    ///
    /// The first key that cannot be resolved aborts the whole row; fields that
    /// are not foreign keys are returned untouched.
    pub fn resolve(&self, spec: &TableSpec, row: &Row) -> Result<Row> {
        let mut resolved = row.clone();

        for fk in spec.foreign_keys() {
            let source_id = match fk.resolution {
                KeyResolution::OwnId => row.id(spec.name())?,
                KeyResolution::FieldValue => match row.get(&fk.field) {
                    None => {
                        return Err(ImportError::MissingField {
                            table: spec.name().to_string(),
                            field: fk.field.clone(),
                        })
                    }
                    // Optional relation, nothing to point at.
                    Some(value) if value.is_null() => continue,
                    Some(value) => value.to_key()?,
                },
            };

            let target_id = self
                .identity
                .resolve(&fk.entity_type, &source_id)
                .map_err(|e| ImportError::ForeignKeyFailed {
                    field: fk.field.clone(),
                    source: Box::new(e),
                })?;

            // Mappings can outlive their records (store-side deletes, a
            // previous run that failed half way), so check the store too.
            if self.store.find_by_id(&fk.entity_type, target_id)?.is_none() {
                return Err(ImportError::DanglingForeignKey {
                    field: fk.field.clone(),
                    entity_type: fk.entity_type.to_string(),
                    target_id: target_id.to_string(),
                });
            }

            resolved.set(fk.field.clone(), target_id.clone());
            self.observer
                .foreign_key_rewritten(spec.name(), &fk.field, &fk.entity_type, target_id);
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{EntityRegistry, EntityType};
    use crate::domain::table_spec::SourceLocation;
    use crate::domain::value::{Attributes, RecordKey, Value};
    use crate::infrastructure::store::memory::InMemoryTargetStore;
    use crate::ports::import_observer::NoopObserver;

    struct Fixture {
        author: EntityType,
        store: InMemoryTargetStore,
        identity: IdentityMapper,
    }

    /// One author imported from source id 1, stored under target id 100.
    fn fixture() -> Fixture {
        let registry = EntityRegistry::from_names(["Author"]).unwrap();
        let author = registry.resolve("Author").unwrap();
        let store = InMemoryTargetStore::with_first_id(100);
        let created = store.create(&author, Attributes::new()).unwrap();
        let mut identity = IdentityMapper::new();
        identity
            .record(&author, RecordKey::Int(1), created.id)
            .unwrap();
        Fixture {
            author,
            store,
            identity,
        }
    }

    #[test]
    fn test_own_id_resolution_uses_row_id() {
        let fx = fixture();
        let spec = TableSpec::builder(SourceLocation::new("src", "author_bios"))
            .foreign_key("author_id", fx.author.clone())
            .build()
            .unwrap();
        // The column value is ignored: the lookup key is the row's own id.
        let row: Row = [("id", Value::Int(1)), ("author_id", Value::Int(55))]
            .into_iter()
            .collect();

        let resolver = ForeignKeyResolver::new(&fx.identity, &fx.store, &NoopObserver);
        let resolved = resolver.resolve(&spec, &row).unwrap();
        assert_eq!(resolved.get("author_id"), Some(&Value::Int(100)));
        assert_eq!(resolved.get("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_field_value_resolution_uses_column() {
        let fx = fixture();
        let spec = TableSpec::builder(SourceLocation::new("src", "books"))
            .foreign_key_with("author_id", fx.author.clone(), KeyResolution::FieldValue)
            .build()
            .unwrap();
        let row: Row = [("id", Value::Int(9)), ("author_id", Value::from("1"))]
            .into_iter()
            .collect();

        let resolver = ForeignKeyResolver::new(&fx.identity, &fx.store, &NoopObserver);
        let resolved = resolver.resolve(&spec, &row).unwrap();
        assert_eq!(resolved.get("author_id"), Some(&Value::Int(100)));
    }

    #[test]
    fn test_field_value_null_is_left_alone() {
        let fx = fixture();
        let spec = TableSpec::builder(SourceLocation::new("src", "books"))
            .foreign_key_with("author_id", fx.author.clone(), KeyResolution::FieldValue)
            .build()
            .unwrap();
        let row: Row = [("id", Value::Int(9)), ("author_id", Value::Null)]
            .into_iter()
            .collect();

        let resolver = ForeignKeyResolver::new(&fx.identity, &fx.store, &NoopObserver);
        assert_eq!(resolver.resolve(&spec, &row).unwrap(), row);
    }

    #[test]
    fn test_removed_target_is_dangling() {
        let fx = fixture();
        fx.store.remove(&fx.author, &RecordKey::Int(100)).unwrap();
        let spec = TableSpec::builder(SourceLocation::new("src", "author_bios"))
            .foreign_key("author_id", fx.author.clone())
            .build()
            .unwrap();
        let row: Row = [("id", Value::Int(1)), ("author_id", Value::Int(1))]
            .into_iter()
            .collect();

        let resolver = ForeignKeyResolver::new(&fx.identity, &fx.store, &NoopObserver);
        assert!(matches!(
            resolver.resolve(&spec, &row),
            Err(ImportError::DanglingForeignKey { field, target_id, .. })
                if field == "author_id" && target_id == "100"
        ));
    }

    #[test]
    fn test_unmapped_source_id() {
        let fx = fixture();
        let spec = TableSpec::builder(SourceLocation::new("src", "author_bios"))
            .foreign_key("author_id", fx.author.clone())
            .build()
            .unwrap();
        let row: Row = [("id", Value::Int(2)), ("author_id", Value::Int(2))]
            .into_iter()
            .collect();

        let resolver = ForeignKeyResolver::new(&fx.identity, &fx.store, &NoopObserver);
        let err = resolver.resolve(&spec, &row).unwrap_err();
        assert!(matches!(
            &err,
            ImportError::ForeignKeyFailed { field, .. } if field == "author_id"
        ));
        assert!(matches!(
            err.root_cause(),
            ImportError::IdentifierNotFound { source_id, .. } if source_id == "2"
        ));
    }
}
