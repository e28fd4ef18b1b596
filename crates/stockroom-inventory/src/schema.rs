//! The catalog schema.
//!
//! Every entity carries an auto-increment `id`. Many-to-many relations
//! are stored in explicit edge entities (`Product_ProductType`,
//! `ProductLine_AttributeValue`) whose foreign keys cascade from both
//! sides.

use stockroom_core::catalog::{
    AutoTimestamp, DefaultValue, DeleteBehavior, EntityDef, FieldDef, FieldType, RelationDef,
    ScalarType, SchemaRegistry, UniqueConstraint,
};

use crate::models::StockStatus;

/// Schema version recorded in the store catalog.
pub const SCHEMA_VERSION: u64 = 1;

/// Build the catalog schema registry.
pub fn inventory_schema() -> SchemaRegistry {
    SchemaRegistry::new(SCHEMA_VERSION)
        .with_entity(attribute())
        .with_entity(attribute_value())
        .with_entity(category())
        .with_entity(seasonal_event())
        .with_entity(product())
        .with_entity(product_type())
        .with_entity(product_product_type())
        .with_entity(product_line())
        .with_entity(product_line_attribute_value())
        .with_entity(product_image())
        .with_entity(stock_control())
        // Foreign keys
        .with_relation(fk("AttributeValue", "attribute", "Attribute", DeleteBehavior::Cascade))
        .with_relation(fk("Category", "parent", "Category", DeleteBehavior::Restrict))
        .with_relation(fk("Product", "category", "Category", DeleteBehavior::SetNull))
        .with_relation(fk(
            "Product",
            "seasonal_event",
            "SeasonalEvent",
            DeleteBehavior::SetNull,
        ))
        .with_relation(fk("ProductType", "parent", "ProductType", DeleteBehavior::Restrict))
        .with_relation(fk("Product_ProductType", "product", "Product", DeleteBehavior::Cascade))
        .with_relation(fk(
            "Product_ProductType",
            "product_type",
            "ProductType",
            DeleteBehavior::Cascade,
        ))
        .with_relation(fk("ProductLine", "product", "Product", DeleteBehavior::Restrict))
        .with_relation(fk(
            "ProductLine_AttributeValue",
            "product_line",
            "ProductLine",
            DeleteBehavior::Cascade,
        ))
        .with_relation(fk(
            "ProductLine_AttributeValue",
            "attribute_value",
            "AttributeValue",
            DeleteBehavior::Cascade,
        ))
        .with_relation(fk("ProductImage", "product_line", "ProductLine", DeleteBehavior::Cascade))
        .with_relation(
            RelationDef::one_to_one("StockControl", "stock_product", "Product")
                .with_on_delete(DeleteBehavior::Cascade),
        )
        // Many-to-many
        .with_relation(RelationDef::many_to_many(
            "Product.product_type",
            "Product",
            "ProductType",
            "Product_ProductType",
            "product",
            "product_type",
        ))
        .with_relation(RelationDef::many_to_many(
            "ProductLine.attribute_values",
            "ProductLine",
            "AttributeValue",
            "ProductLine_AttributeValue",
            "product_line",
            "attribute_value",
        ))
        // Uniqueness
        .with_unique(UniqueConstraint::single("Attribute", "name"))
        .with_unique(UniqueConstraint::single("Category", "name"))
        .with_unique(UniqueConstraint::single("Category", "slug"))
        .with_unique(UniqueConstraint::single("SeasonalEvent", "name"))
        .with_unique(UniqueConstraint::single("Product", "pid"))
        .with_unique(UniqueConstraint::single("Product", "name"))
        .with_unique(UniqueConstraint::single("Product", "slug"))
        .with_unique(UniqueConstraint::single("ProductLine", "sku"))
        .with_unique(UniqueConstraint::single("StockControl", "stock_product"))
        .with_unique(UniqueConstraint::composite(
            "product_producttype_pair_key",
            "Product_ProductType",
            ["product", "product_type"],
        ))
        .with_unique(UniqueConstraint::composite(
            "productline_attributevalue_pair_key",
            "ProductLine_AttributeValue",
            ["product_line", "attribute_value"],
        ))
}

fn fk(entity: &str, field: &str, target: &str, on_delete: DeleteBehavior) -> RelationDef {
    RelationDef::one_to_many(entity, field, target).with_on_delete(on_delete)
}

fn boolean(name: &str, default: bool) -> FieldDef {
    FieldDef::new(name, FieldType::scalar(ScalarType::Bool))
        .with_default(DefaultValue::Bool(default))
}

fn integer(name: &str) -> FieldDef {
    FieldDef::new(name, FieldType::scalar(ScalarType::Int32))
}

fn slug(name: &str, max_length: u32) -> FieldDef {
    FieldDef::new(name, FieldType::scalar(ScalarType::Slug))
        .with_max_length(max_length)
        .allow_blank()
}

fn timestamp(name: &str) -> FieldDef {
    FieldDef::new(name, FieldType::scalar(ScalarType::Timestamp))
}

fn attribute() -> EntityDef {
    EntityDef::new("Attribute", "id")
        .with_field(FieldDef::string("name", 200))
        .with_field(FieldDef::optional_scalar("description", ScalarType::Text))
}

fn attribute_value() -> EntityDef {
    EntityDef::new("AttributeValue", "id")
        .with_field(FieldDef::string("attribute_value", 100))
        .with_field(FieldDef::new("attribute", FieldType::reference("Attribute")))
}

fn category() -> EntityDef {
    EntityDef::new("Category", "id")
        .with_fields([
            FieldDef::string("name", 100),
            slug("slug", 100),
            boolean("is_active", false),
            integer("level").with_default(DefaultValue::Int(100)),
            FieldDef::new("parent", FieldType::optional_reference("Category")),
        ])
        .with_display_names("Inventory Category", "Categories")
}

fn seasonal_event() -> EntityDef {
    EntityDef::new("SeasonalEvent", "id")
        .with_field(FieldDef::string("name", 100))
        .with_field(timestamp("start_date"))
        .with_field(timestamp("end_date"))
}

fn product() -> EntityDef {
    let codes = StockStatus::ALL.iter().map(|s| s.code().to_string()).collect();

    EntityDef::new("Product", "id").with_fields([
        FieldDef::string("pid", 255),
        FieldDef::string("name", 200),
        slug("slug", 220),
        FieldDef::optional_scalar("description", ScalarType::Text),
        boolean("is_digital", false),
        timestamp("created_at").auto_timestamp(AutoTimestamp::OnCreate),
        timestamp("updated_at").auto_timestamp(AutoTimestamp::OnUpdate),
        boolean("is_active", false),
        FieldDef::new("stock_status", FieldType::enum_type("StockStatus", codes))
            .with_max_length(3)
            .with_default(DefaultValue::String(StockStatus::default().code().to_string())),
        FieldDef::new("category", FieldType::optional_reference("Category")),
        FieldDef::new("seasonal_event", FieldType::optional_reference("SeasonalEvent")),
    ])
}

fn product_type() -> EntityDef {
    EntityDef::new("ProductType", "id").with_fields([
        FieldDef::string("name", 100),
        integer("level").with_default(DefaultValue::Int(100)),
        FieldDef::new("parent", FieldType::optional_reference("ProductType")),
    ])
}

fn product_product_type() -> EntityDef {
    EntityDef::new("Product_ProductType", "id")
        .with_field(FieldDef::new("product", FieldType::reference("Product")))
        .with_field(FieldDef::new("product_type", FieldType::reference("ProductType")))
}

fn product_line() -> EntityDef {
    EntityDef::new("ProductLine", "id").with_fields([
        FieldDef::new(
            "price",
            FieldType::scalar(ScalarType::Decimal {
                precision: 5,
                scale: 2,
            }),
        ),
        FieldDef::new("sku", FieldType::scalar(ScalarType::Uuid))
            .with_default(DefaultValue::AutoUuid),
        integer("stock_qty").with_default(DefaultValue::Int(0)),
        boolean("is_active", false),
        integer("order"),
        FieldDef::new("weight", FieldType::scalar(ScalarType::Float64)),
        FieldDef::new("product", FieldType::reference("Product")),
    ])
}

fn product_line_attribute_value() -> EntityDef {
    EntityDef::new("ProductLine_AttributeValue", "id")
        .with_field(FieldDef::new("product_line", FieldType::reference("ProductLine")))
        .with_field(FieldDef::new(
            "attribute_value",
            FieldType::reference("AttributeValue"),
        ))
}

fn product_image() -> EntityDef {
    EntityDef::new("ProductImage", "id").with_fields([
        FieldDef::string("alternative_text", 200),
        FieldDef::new("url", FieldType::scalar(ScalarType::Image)).with_max_length(100),
        integer("order"),
        FieldDef::new("product_line", FieldType::reference("ProductLine")),
    ])
}

fn stock_control() -> EntityDef {
    EntityDef::new("StockControl", "id").with_fields([
        integer("stock_qty"),
        FieldDef::string("name", 100),
        FieldDef::new("stock_product", FieldType::reference("Product")),
    ])
}
