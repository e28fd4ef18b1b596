//! Integration tests for the repository.

use std::sync::Arc;

use stockroom_core::catalog::{
    AutoTimestamp, DeleteBehavior, EntityDef, FieldDef, FieldType, RelationDef, ScalarType,
    SchemaRegistry, UniqueConstraint,
};
use stockroom_core::{
    Error, Fields, Filter, IntegrityError, Repository, StorageConfig, ValidationError, Value,
};

/// Shelves hold bins; parts sit in bins and are bought from suppliers.
/// A lock pins a bin in place.
fn warehouse_schema() -> SchemaRegistry {
    let shelf = EntityDef::new("Shelf", "id").with_field(FieldDef::string("name", 20));
    let bin = EntityDef::new("Bin", "id")
        .with_field(FieldDef::string("code", 10))
        .with_field(FieldDef::new("shelf", FieldType::reference("Shelf")));
    let part = EntityDef::new("Part", "id")
        .with_field(FieldDef::string("name", 50))
        .with_field(FieldDef::new("bin", FieldType::optional_reference("Bin")))
        .with_field(
            FieldDef::new("updated_at", FieldType::scalar(ScalarType::Timestamp))
                .auto_timestamp(AutoTimestamp::OnUpdate),
        );
    let lock = EntityDef::new("Lock", "id")
        .with_field(FieldDef::new("bin", FieldType::reference("Bin")));
    let supplier = EntityDef::new("Supplier", "id").with_field(FieldDef::string("name", 50));
    let part_supplier = EntityDef::new("Part_Supplier", "id")
        .with_field(FieldDef::new("part", FieldType::reference("Part")))
        .with_field(FieldDef::new("supplier", FieldType::reference("Supplier")));

    SchemaRegistry::new(1)
        .with_entity(shelf)
        .with_entity(bin)
        .with_entity(part)
        .with_entity(lock)
        .with_entity(supplier)
        .with_entity(part_supplier)
        .with_relation(
            RelationDef::one_to_many("Bin", "shelf", "Shelf").with_on_delete(DeleteBehavior::Cascade),
        )
        .with_relation(
            RelationDef::one_to_many("Part", "bin", "Bin").with_on_delete(DeleteBehavior::SetNull),
        )
        .with_relation(RelationDef::one_to_many("Lock", "bin", "Bin"))
        .with_relation(
            RelationDef::one_to_many("Part_Supplier", "part", "Part")
                .with_on_delete(DeleteBehavior::Cascade),
        )
        .with_relation(
            RelationDef::one_to_many("Part_Supplier", "supplier", "Supplier")
                .with_on_delete(DeleteBehavior::Cascade),
        )
        .with_relation(RelationDef::many_to_many(
            "Part.suppliers",
            "Part",
            "Supplier",
            "Part_Supplier",
            "part",
            "supplier",
        ))
        .with_unique(UniqueConstraint::single("Shelf", "name"))
        .with_unique(UniqueConstraint::single("Part", "name"))
        .with_unique(UniqueConstraint::composite(
            "part_supplier_pair_key",
            "Part_Supplier",
            vec!["part".to_string(), "supplier".to_string()],
        ))
}

fn open() -> Repository {
    Repository::open(StorageConfig::temporary(), Arc::new(warehouse_schema())).unwrap()
}

fn create(repo: &Repository, entity: &str, fields: Fields) -> i64 {
    repo.create(entity, fields).unwrap().id()
}

#[test]
fn test_create_and_get() {
    let repo = open();

    let shelf = repo.create("Shelf", Fields::new().set("name", "A1")).unwrap();
    assert_eq!(shelf.entity(), "Shelf");
    assert_eq!(shelf.get_i64("id"), Some(shelf.id()));

    let fetched = repo.get("Shelf", shelf.id()).unwrap().unwrap();
    assert_eq!(fetched, shelf);
    assert!(repo.get("Shelf", shelf.id() + 1000).unwrap().is_none());
}

#[test]
fn test_unknown_entity() {
    let repo = open();

    let err = repo.create("Crate", Fields::new()).unwrap_err();
    assert!(matches!(err, Error::UnknownEntity(name) if name == "Crate"));
}

#[test]
fn test_list_with_filter() {
    let repo = open();
    let shelf = create(&repo, "Shelf", Fields::new().set("name", "A1"));
    let bin = create(&repo, "Bin", Fields::new().set("code", "B").set("shelf", shelf));

    let bolt = create(&repo, "Part", Fields::new().set("name", "bolt").set("bin", bin));
    let nut = create(&repo, "Part", Fields::new().set("name", "nut"));
    let washer = create(&repo, "Part", Fields::new().set("name", "washer").set("bin", bin));

    let all = repo.list("Part", &Filter::all()).unwrap();
    let ids: Vec<i64> = all.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![bolt, nut, washer]);

    let binned = repo.list("Part", &Filter::all().eq("bin", bin)).unwrap();
    assert_eq!(binned.len(), 2);

    let loose = repo.list("Part", &Filter::all().is_null("bin")).unwrap();
    assert_eq!(loose.len(), 1);
    assert_eq!(loose[0].get_str("name"), Some("nut"));

    let not_bolt = repo.list("Part", &Filter::all().ne("name", "bolt")).unwrap();
    assert_eq!(not_bolt.len(), 2);

    assert_eq!(repo.count("Part").unwrap(), 3);
}

#[test]
fn test_list_rejects_unknown_field() {
    let repo = open();

    let err = repo.list("Part", &Filter::all().eq("colour", "red")).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownField { field, .. }) if field == "colour"
    ));
}

#[test]
fn test_update_keeps_unassigned_fields() {
    let repo = open();
    let shelf = create(&repo, "Shelf", Fields::new().set("name", "A1"));
    let bin = create(&repo, "Bin", Fields::new().set("code", "B").set("shelf", shelf));
    let part = repo
        .create("Part", Fields::new().set("name", "bolt").set("bin", bin))
        .unwrap();

    let updated = repo
        .update("Part", part.id(), Fields::new().set("name", "hex bolt"))
        .unwrap();

    assert_eq!(updated.get_str("name"), Some("hex bolt"));
    assert_eq!(updated.get_i64("bin"), Some(bin));
    assert!(updated.get_timestamp("updated_at") >= part.get_timestamp("updated_at"));
    assert_eq!(repo.get("Part", part.id()).unwrap().unwrap(), updated);
}

#[test]
fn test_update_missing_row() {
    let repo = open();

    let err = repo
        .update("Shelf", 42, Fields::new().set("name", "A1"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_update_unique_excludes_self() {
    let repo = open();
    let a = create(&repo, "Shelf", Fields::new().set("name", "A1"));
    create(&repo, "Shelf", Fields::new().set("name", "A2"));

    assert!(repo.update("Shelf", a, Fields::new().set("name", "A1")).is_ok());

    let err = repo
        .update("Shelf", a, Fields::new().set("name", "A2"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UniqueViolation { .. })
    ));
}

#[test]
fn test_unique_value_released_by_update_and_delete() {
    let repo = open();
    let a = create(&repo, "Shelf", Fields::new().set("name", "A1"));

    repo.update("Shelf", a, Fields::new().set("name", "Z9")).unwrap();
    let b = create(&repo, "Shelf", Fields::new().set("name", "A1"));

    repo.delete("Shelf", b).unwrap();
    assert!(repo.create("Shelf", Fields::new().set("name", "A1")).is_ok());
}

#[test]
fn test_foreign_key_must_exist() {
    let repo = open();

    let err = repo
        .create("Bin", Fields::new().set("code", "B").set("shelf", 999i64))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::ForeignKeyViolation { referenced_entity, id: 999, .. })
            if referenced_entity == "Shelf"
    ));
    assert_eq!(repo.count("Bin").unwrap(), 0);
}

#[test]
fn test_read_only_fields() {
    let repo = open();

    let err = repo
        .create("Shelf", Fields::new().set("id", 7i64).set("name", "A1"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::ReadOnlyField { field, .. }) if field == "id"
    ));
}

#[test]
fn test_delete_missing_row() {
    let repo = open();

    let err = repo.delete("Shelf", 1).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_delete_cascades_and_nullifies() {
    let repo = open();
    let shelf = create(&repo, "Shelf", Fields::new().set("name", "A1"));
    let bin_a = create(&repo, "Bin", Fields::new().set("code", "A").set("shelf", shelf));
    let bin_b = create(&repo, "Bin", Fields::new().set("code", "B").set("shelf", shelf));
    let part = create(&repo, "Part", Fields::new().set("name", "bolt").set("bin", bin_a));

    let report = repo.delete("Shelf", shelf).unwrap();

    assert_eq!(report.deleted[0], ("Shelf".to_string(), shelf));
    assert!(report.was_deleted("Bin", bin_a));
    assert!(report.was_deleted("Bin", bin_b));
    assert_eq!(
        report.nullified,
        vec![("Part".to_string(), part, "bin".to_string())]
    );
    assert_eq!(report.affected_count(), 4);

    assert_eq!(repo.count("Bin").unwrap(), 0);
    let part = repo.get("Part", part).unwrap().unwrap();
    assert!(part.is_null("bin"));
}

#[test]
fn test_restrict_inside_cascade_rolls_back() {
    let repo = open();
    let shelf = create(&repo, "Shelf", Fields::new().set("name", "A1"));
    let bin = create(&repo, "Bin", Fields::new().set("code", "A").set("shelf", shelf));
    let part = create(&repo, "Part", Fields::new().set("name", "bolt").set("bin", bin));
    create(&repo, "Lock", Fields::new().set("bin", bin));

    let err = repo.delete("Shelf", shelf).unwrap_err();
    assert!(matches!(
        err,
        Error::Integrity(IntegrityError::RestrictViolation { ref relation, count: 1, .. })
            if relation == "Lock.bin"
    ));

    assert!(repo.get("Shelf", shelf).unwrap().is_some());
    assert!(repo.get("Bin", bin).unwrap().is_some());
    let part = repo.get("Part", part).unwrap().unwrap();
    assert_eq!(part.get_i64("bin"), Some(bin));
    assert!(repo.create("Shelf", Fields::new().set("name", "A1")).is_err());
}

#[test]
fn test_many_to_many_links() {
    let repo = open();
    let bolt = create(&repo, "Part", Fields::new().set("name", "bolt"));
    let acme = create(&repo, "Supplier", Fields::new().set("name", "Acme"));
    let globex = create(&repo, "Supplier", Fields::new().set("name", "Globex"));

    let edge = repo.add_related("Part.suppliers", bolt, acme).unwrap();
    let again = repo.add_related("Part.suppliers", bolt, acme).unwrap();
    assert_eq!(edge.id(), again.id());
    repo.add_related("Part.suppliers", bolt, globex).unwrap();

    let suppliers = repo.related("Part.suppliers", bolt).unwrap();
    let names: Vec<&str> = suppliers.iter().filter_map(|r| r.get_str("name")).collect();
    assert_eq!(names, vec!["Acme", "Globex"]);

    assert_eq!(repo.remove_related("Part.suppliers", bolt, acme).unwrap(), 1);
    assert_eq!(repo.remove_related("Part.suppliers", bolt, acme).unwrap(), 0);
    assert_eq!(repo.related("Part.suppliers", bolt).unwrap().len(), 1);

    repo.delete("Supplier", globex).unwrap();
    assert!(repo.related("Part.suppliers", bolt).unwrap().is_empty());
    assert_eq!(repo.count("Part_Supplier").unwrap(), 0);
}

#[test]
fn test_many_to_many_unknown_relation() {
    let repo = open();
    let bolt = create(&repo, "Part", Fields::new().set("name", "bolt"));

    let err = repo.related("Bin.shelf", bolt).unwrap_err();
    assert!(matches!(err, Error::UnknownRelation(name) if name == "Bin.shelf"));
}

#[test]
fn test_reopen_persists_rows() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(warehouse_schema());

    let shelf = {
        let repo = Repository::open(StorageConfig::new(dir.path()), registry.clone()).unwrap();
        let id = create(&repo, "Shelf", Fields::new().set("name", "A1"));
        repo.flush().unwrap();
        id
    };

    let repo = Repository::open(StorageConfig::new(dir.path()), registry).unwrap();
    let row = repo.get("Shelf", shelf).unwrap().unwrap();
    assert_eq!(row.get("name"), Some(&Value::from("A1")));
    assert!(repo.create("Shelf", Fields::new().set("name", "A1")).is_err());
}

#[test]
fn test_reopen_with_other_schema_fails() {
    let dir = tempfile::tempdir().unwrap();

    {
        let repo =
            Repository::open(StorageConfig::new(dir.path()), Arc::new(warehouse_schema())).unwrap();
        repo.flush().unwrap();
    }

    let other = warehouse_schema()
        .with_entity(EntityDef::new("Crate", "id").with_field(FieldDef::string("label", 10)));
    let Err(err) = Repository::open(StorageConfig::new(dir.path()), Arc::new(other)) else {
        panic!("store opened with a different schema");
    };
    assert!(matches!(err, Error::SchemaMismatch { .. }));
}

#[test]
fn test_invalid_schema_rejected() {
    let broken = SchemaRegistry::new(1).with_entity(
        EntityDef::new("Bin", "id").with_field(FieldDef::new("shelf", FieldType::reference("Shelf"))),
    );

    let Err(err) = Repository::open(StorageConfig::temporary(), Arc::new(broken)) else {
        panic!("store opened with an inconsistent schema");
    };
    assert!(matches!(err, Error::InvalidSchema(_)));
}
