use tempfile::tempdir;
use tradepost_store::{CatalogStore, StoreError};
use tradepost_types::{ChannelId, ProductRecord};

fn record(category: &str, price: u64) -> ProductRecord {
    ProductRecord {
        category: category.to_string(),
        description: "desc".to_string(),
        images: String::new(),
        filename: "asset.zip".to_string(),
        price,
    }
}

#[test]
fn empty_catalog_on_missing_files() {
    let dir = tempdir().unwrap();
    let store = CatalogStore::open(dir.path());
    assert!(store.products().unwrap().is_empty());
    assert!(store.categories().unwrap().is_empty());
    assert_eq!(store.product("Widget").unwrap(), None);
}

#[test]
fn add_then_lookup_product() {
    let dir = tempdir().unwrap();
    let store = CatalogStore::open(dir.path());
    store.add_product("Widget", record("Tools", 100)).unwrap();

    let found = store.product("Widget").unwrap().unwrap();
    assert_eq!(found.price, 100);
    assert_eq!(found.category, "Tools");
}

#[test]
fn add_duplicate_product_fails() {
    let dir = tempdir().unwrap();
    let store = CatalogStore::open(dir.path());
    store.add_product("Widget", record("Tools", 100)).unwrap();
    let err = store.add_product("Widget", record("Tools", 200)).unwrap_err();
    assert!(matches!(err, StoreError::ProductExists(name) if name == "Widget"));
    // Original record untouched.
    assert_eq!(store.product("Widget").unwrap().unwrap().price, 100);
}

#[test]
fn update_requires_existing_product() {
    let dir = tempdir().unwrap();
    let store = CatalogStore::open(dir.path());
    let err = store.update_product("Ghost", record("Tools", 1)).unwrap_err();
    assert!(matches!(err, StoreError::ProductNotFound(_)));

    store.add_product("Widget", record("Tools", 100)).unwrap();
    store.update_product("Widget", record("Tools", 250)).unwrap();
    assert_eq!(store.product("Widget").unwrap().unwrap().price, 250);
}

#[test]
fn remove_product_returns_record() {
    let dir = tempdir().unwrap();
    let store = CatalogStore::open(dir.path());
    store.add_product("Widget", record("Tools", 100)).unwrap();
    let removed = store.remove_product("Widget").unwrap();
    assert_eq!(removed.price, 100);
    assert_eq!(store.product("Widget").unwrap(), None);
    assert!(matches!(
        store.remove_product("Widget").unwrap_err(),
        StoreError::ProductNotFound(_)
    ));
}

#[test]
fn products_in_filters_by_category() {
    let dir = tempdir().unwrap();
    let store = CatalogStore::open(dir.path());
    store.add_product("Hammer", record("Tools", 10)).unwrap();
    store.add_product("Saw", record("Tools", 20)).unwrap();
    store.add_product("Bot", record("Bots", 30)).unwrap();

    let tools = store.products_in("Tools").unwrap();
    assert_eq!(tools.len(), 2);
    assert!(tools.contains_key("Hammer"));
    assert!(tools.contains_key("Saw"));
    assert!(store.products_in("Nothing").unwrap().is_empty());
}

#[test]
fn category_crud() {
    let dir = tempdir().unwrap();
    let store = CatalogStore::open(dir.path());
    store.add_category("Tools", ChannelId::new(111)).unwrap();
    assert!(matches!(
        store.add_category("Tools", ChannelId::new(222)).unwrap_err(),
        StoreError::CategoryExists(_)
    ));

    store.update_category("Tools", ChannelId::new(333)).unwrap();
    assert_eq!(
        store.categories().unwrap().get("Tools"),
        Some(&ChannelId::new(333))
    );

    store.remove_category("Tools").unwrap();
    assert!(matches!(
        store.remove_category("Tools").unwrap_err(),
        StoreError::CategoryNotFound(_)
    ));
    assert!(matches!(
        store.update_category("Tools", ChannelId::new(1)).unwrap_err(),
        StoreError::CategoryNotFound(_)
    ));
}

#[test]
fn edits_are_visible_to_other_handles() {
    let dir = tempdir().unwrap();
    let writer = CatalogStore::open(dir.path());
    let reader = CatalogStore::open(dir.path());

    writer.add_product("Widget", record("Tools", 100)).unwrap();
    // Readers always see the latest file contents.
    assert_eq!(reader.product("Widget").unwrap().unwrap().price, 100);

    writer.update_product("Widget", record("Tools", 175)).unwrap();
    assert_eq!(reader.product("Widget").unwrap().unwrap().price, 175);
}
