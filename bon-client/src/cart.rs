//! Cart store
//!
//! Owns the cart lines of the current session. Every mutation writes the full
//! line list back to the local store; a failed write is logged and the
//! in-memory list stays authoritative.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Customizations, Drink, OrderLineRequest, Size};
use uuid::Uuid;

use crate::storage::{LocalStoreExt, SharedStore, keys};

/// One distinct product + size + customization combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(alias = "_id")]
    pub product_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub selected_size: Size,
    #[serde(default)]
    pub customizations: Customizations,
    #[serde(alias = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(alias = "cartId", deserialize_with = "deserialize_line_id")]
    pub cart_line_id: String,
}

/// Older carts used a numeric timestamp-based line id
fn deserialize_line_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

impl CartItem {
    /// Canonical identity (`productId|size|sugar|spiced`)
    pub fn identity_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.product_id,
            self.selected_size.as_str(),
            self.customizations.canonical_key()
        )
    }

    fn same_line(&self, product_id: &str, size: Size, customizations: &Customizations) -> bool {
        self.product_id == product_id
            && self.selected_size == size
            && self.customizations == *customizations
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Merge lines sharing an identity; the first line keeps its id and price.
fn fold_duplicate_lines(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut folded: Vec<CartItem> = Vec::with_capacity(items.len());
    for mut item in items {
        item.quantity = item.quantity.max(1);
        let key = item.identity_key();
        match folded.iter_mut().find(|line| line.identity_key() == key) {
            Some(line) => line.quantity += item.quantity,
            None => folded.push(item),
        }
    }
    folded
}

/// Cart store
pub struct CartStore {
    items: Vec<CartItem>,
    open: bool,
    store: SharedStore,
}

impl CartStore {
    /// Load the persisted cart; a missing or unreadable cart starts empty.
    pub fn load(store: SharedStore) -> Self {
        let mut items = match store.get_json::<Vec<CartItem>>(keys::CART) {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted cart");
                Vec::new()
            }
        };
        let loaded = items.len();
        let items = fold_duplicate_lines(items);
        tracing::debug!(lines = items.len(), "Cart loaded");

        let cart = Self {
            items,
            open: false,
            store,
        };
        if cart.items.len() < loaded {
            tracing::info!(merged = loaded - cart.items.len(), "Merged duplicate cart lines");
            cart.persist();
        }
        cart
    }

    /// Add one unit of a product; merges into an identical line when present.
    ///
    /// Returns the id of the line that received the unit.
    pub fn add_item(
        &mut self,
        product: &Drink,
        size: Size,
        customizations: Customizations,
        unit_price: Decimal,
    ) -> String {
        let line_id = match self
            .items
            .iter_mut()
            .find(|item| item.same_line(&product.id, size, &customizations))
        {
            Some(existing) => {
                existing.quantity += 1;
                existing.cart_line_id.clone()
            }
            None => {
                let line_id = Uuid::new_v4().to_string();
                self.items.push(CartItem {
                    product_id: product.id.clone(),
                    title: product.title.clone(),
                    image: product.image.clone(),
                    selected_size: size,
                    customizations,
                    unit_price: unit_price.max(Decimal::ZERO),
                    quantity: 1,
                    cart_line_id: line_id.clone(),
                });
                line_id
            }
        };

        self.open = true;
        self.persist();
        line_id
    }

    /// Remove a line; returns false when no such line exists.
    pub fn remove_item(&mut self, cart_line_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.cart_line_id != cart_line_id);
        let removed = self.items.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Apply a quantity delta, never going below one.
    ///
    /// Returns the new quantity, or `None` when the line does not exist.
    pub fn set_quantity(&mut self, cart_line_id: &str, delta: i32) -> Option<u32> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.cart_line_id == cart_line_id)?;
        let next = (i64::from(item.quantity) + i64::from(delta)).max(1);
        item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        let quantity = item.quantity;
        self.persist();
        Some(quantity)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Σ unit price × quantity, recomputed on every call
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of cups across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Order lines for `POST /order/create`
    pub fn to_order_lines(&self) -> Vec<OrderLineRequest> {
        self.items
            .iter()
            .map(|item| OrderLineRequest {
                drink_id: item.product_id.clone(),
                size: item.selected_size,
                quantity: item.quantity,
                customizations: item.customizations,
            })
            .collect()
    }

    fn persist(&self) {
        if let Err(e) = self.store.set_json(keys::CART, &self.items) {
            tracing::warn!(error = %e, "Failed to persist cart, keeping in-memory copy");
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("open", &self.open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalStore, MemoryStore, StorageError, StorageResult};
    use shared::models::{DrinkOptions, SizePrice, Sugar};
    use std::sync::Arc;

    fn drink(id: &str, title: &str) -> Drink {
        Drink {
            id: id.into(),
            title: title.into(),
            description: None,
            coffee_type: Some("coffee".into()),
            image: None,
            sizes: vec![SizePrice {
                size: Size::Medium,
                price: Decimal::from(45),
            }],
            options: DrinkOptions { sugar: true, spiced: true },
            is_available: true,
        }
    }

    fn plain() -> Customizations {
        Customizations::new(Sugar::NoSugar, false)
    }

    #[test]
    fn test_same_line_is_merged() {
        let mut cart = CartStore::load(MemoryStore::shared());
        let latte = drink("d1", "Latte");

        let first = cart.add_item(&latte, Size::Medium, plain(), Decimal::from(45));
        let second = cart.add_item(&latte, Size::Medium, plain(), Decimal::from(45));

        assert_eq!(first, second);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert!(cart.is_open());
    }

    #[test]
    fn test_different_customizations_are_separate_lines() {
        let mut cart = CartStore::load(MemoryStore::shared());
        let latte = drink("d1", "Latte");

        cart.add_item(&latte, Size::Medium, plain(), Decimal::from(45));
        cart.add_item(
            &latte,
            Size::Medium,
            Customizations::new(Sugar::TwoShots, false),
            Decimal::from(45),
        );
        cart.add_item(&latte, Size::Large, plain(), Decimal::from(55));

        assert_eq!(cart.items().len(), 3);
        let keys: Vec<String> = cart.items().iter().map(CartItem::identity_key).collect();
        assert_eq!(keys[0], "d1|medium|no_sugar|false");
        assert_eq!(keys[1], "d1|medium|2_shots|false");
    }

    #[test]
    fn test_total_follows_mutations() {
        let mut cart = CartStore::load(MemoryStore::shared());
        let latte = drink("d1", "Latte");
        let tea = drink("d2", "Tea");

        let latte_line = cart.add_item(&latte, Size::Medium, plain(), Decimal::from(45));
        cart.add_item(&latte, Size::Medium, plain(), Decimal::from(45));
        let tea_line = cart.add_item(&tea, Size::Small, plain(), Decimal::from(20));
        assert_eq!(cart.total(), Decimal::from(110));
        assert_eq!(cart.item_count(), 3);

        cart.set_quantity(&latte_line, 1);
        assert_eq!(cart.total(), Decimal::from(155));

        assert!(cart.remove_item(&tea_line));
        assert_eq!(cart.total(), Decimal::from(135));
        assert!(!cart.remove_item(&tea_line));
    }

    #[test]
    fn test_quantity_floor_is_one() {
        let mut cart = CartStore::load(MemoryStore::shared());
        let line = cart.add_item(&drink("d1", "Latte"), Size::Small, plain(), Decimal::from(30));

        assert_eq!(cart.set_quantity(&line, -1), Some(1));
        assert_eq!(cart.set_quantity(&line, -5), Some(1));
        assert_eq!(cart.set_quantity(&line, 3), Some(4));
        assert_eq!(cart.set_quantity("missing", 1), None);
    }

    #[test]
    fn test_cart_survives_reload() {
        let store = MemoryStore::shared();
        {
            let mut cart = CartStore::load(store.clone());
            cart.add_item(&drink("d1", "Latte"), Size::Medium, plain(), Decimal::from(45));
        }
        let cart = CartStore::load(store.clone());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].title, "Latte");
        assert!(!cart.is_open());

        let mut cart = cart;
        cart.clear();
        let reloaded = CartStore::load(store);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_legacy_cart_shape_is_read() {
        let store = MemoryStore::shared();
        store
            .set(
                keys::CART,
                r#"[{"_id":"d1","title":"Latte","selectedSize":"medium",
                    "customizations":{"sugar":true,"spiced":false},
                    "price":45,"quantity":2,"cartId":1712345678901.25}]"#,
            )
            .unwrap();

        let cart = CartStore::load(store);
        let line = &cart.items()[0];
        assert_eq!(line.product_id, "d1");
        assert_eq!(line.customizations.sugar, Sugar::OneShot);
        assert_eq!(line.cart_line_id, "1712345678901.25");
        assert_eq!(cart.total(), Decimal::from(90));
    }

    #[test]
    fn test_duplicate_persisted_lines_are_folded() {
        let store = MemoryStore::shared();
        store
            .set(
                keys::CART,
                r#"[{"_id":"d1","title":"Latte","selectedSize":"medium",
                     "customizations":{"sugar":true,"spiced":false},
                     "price":45,"quantity":2,"cartId":"a"},
                    {"_id":"d2","title":"Tea","selectedSize":"small",
                     "price":20,"quantity":1,"cartId":"b"},
                    {"_id":"d1","title":"Latte","selectedSize":"medium",
                     "customizations":{"sugar":true,"spiced":false},
                     "price":45,"quantity":0,"cartId":"c"}]"#,
            )
            .unwrap();

        let cart = CartStore::load(store.clone());
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].cart_line_id, "a");
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), Decimal::from(155));

        // 合并结果已写回
        let reloaded = CartStore::load(store);
        assert_eq!(reloaded.items(), cart.items());
    }

    #[test]
    fn test_corrupt_cart_loads_empty() {
        let store = MemoryStore::shared();
        store.set(keys::CART, "][").unwrap();
        assert!(CartStore::load(store).is_empty());
    }

    struct BrokenStore;

    impl LocalStore for BrokenStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
        fn remove(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_storage_failure_keeps_memory_copy() {
        let mut cart = CartStore::load(Arc::new(BrokenStore));
        cart.add_item(&drink("d1", "Latte"), Size::Medium, plain(), Decimal::from(45));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total(), Decimal::from(45));
    }
}
