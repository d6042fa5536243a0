//! Owned and equipped items for one user.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::catalog::{get_item_by_id, ItemCategory, ShopItem};
use crate::error::PoncikError;
use crate::storage::KeyValueStore;

/// Shop purchase or equip failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("No shop item with id '{0}'")]
    ItemNotFound(String),

    #[error("'{0}' is already owned")]
    AlreadyOwned(String),

    #[error("Insufficient credits: {item} costs {price}, balance is {balance}")]
    InsufficientCredits {
        item: String,
        price: i64,
        balance: i64,
    },

    #[error("'{0}' is not owned")]
    NotOwned(String),
}

/// Items currently in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipped {
    pub pet: Option<String>,
    pub outfit: Option<String>,
    pub theme: Option<String>,
}

/// Saved inventory, one list of ids per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub pets: Vec<String>,
    #[serde(default)]
    pub outfits: Vec<String>,
    #[serde(default)]
    pub furniture: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    pub equipped: Equipped,
    /// Credits already spent in the shop, held against the backend balance.
    #[serde(default)]
    pub spent_credits: i64,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            pets: Vec::new(),
            outfits: vec!["casual".to_string()],
            furniture: Vec::new(),
            themes: vec!["sakura".to_string()],
            equipped: Equipped {
                pet: None,
                outfit: Some("casual".to_string()),
                theme: Some("sakura".to_string()),
            },
            spent_credits: 0,
        }
    }
}

impl Inventory {
    fn ids(&self, category: ItemCategory) -> &Vec<String> {
        match category {
            ItemCategory::Pet => &self.pets,
            ItemCategory::Outfit => &self.outfits,
            ItemCategory::Furniture => &self.furniture,
            ItemCategory::Theme => &self.themes,
        }
    }

    fn ids_mut(&mut self, category: ItemCategory) -> &mut Vec<String> {
        match category {
            ItemCategory::Pet => &mut self.pets,
            ItemCategory::Outfit => &mut self.outfits,
            ItemCategory::Furniture => &mut self.furniture,
            ItemCategory::Theme => &mut self.themes,
        }
    }
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Purchase {
    pub item: ShopItem,
    pub credits_spent: i64,
    pub new_balance: i64,
}

/// Inventory for one user, persisted under `inventory_{user_id}`.
pub struct InventoryManager<S: KeyValueStore> {
    user_id: String,
    store: S,
    items: Inventory,
}

impl<S: KeyValueStore> InventoryManager<S> {
    /// Load the user's inventory, starting from the defaults if none is saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the saved value is corrupt.
    pub fn load(user_id: impl Into<String>, store: S) -> Result<Self, PoncikError> {
        let user_id = user_id.into();
        let items = match store.get(&storage_key(&user_id))? {
            Some(json) => serde_json::from_str(&json)?,
            None => Inventory::default(),
        };
        Ok(Self {
            user_id,
            store,
            items,
        })
    }

    fn save(&mut self) -> Result<(), PoncikError> {
        let json = serde_json::to_string(&self.items)?;
        self.store.set(&storage_key(&self.user_id), &json)
    }

    /// Buy `item_id` against a backend balance of `credits`.
    ///
    /// The backend never sees shop purchases, so earlier spending is
    /// subtracted from `credits` before the price check.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] if the item is unknown, owned or too
    /// expensive, or a storage error if saving fails.
    pub fn purchase_item(&mut self, item_id: &str, credits: i64) -> Result<Purchase, PoncikError> {
        let item = get_item_by_id(item_id)
            .ok_or_else(|| InventoryError::ItemNotFound(item_id.to_string()))?;

        if self.owns_item(item_id) {
            return Err(InventoryError::AlreadyOwned(item_id.to_string()).into());
        }
        let available = self.available_credits(credits);
        if available < item.price {
            return Err(InventoryError::InsufficientCredits {
                item: item_id.to_string(),
                price: item.price,
                balance: available,
            }
            .into());
        }

        self.items.ids_mut(item.category).push(item_id.to_string());
        self.items.spent_credits += item.price;
        self.save()?;
        info!(user_id = %self.user_id, item_id, price = item.price, "item purchased");

        Ok(Purchase {
            item: *item,
            credits_spent: item.price,
            new_balance: available - item.price,
        })
    }

    /// What is left of `credits` after past shop purchases.
    #[must_use]
    pub const fn available_credits(&self, credits: i64) -> i64 {
        credits - self.items.spent_credits
    }

    /// Put an owned item to use.
    ///
    /// Furniture has no equip slot; equipping it only checks ownership.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] if the item is unknown or not owned, or a
    /// storage error if saving fails.
    pub fn equip_item(&mut self, item_id: &str) -> Result<&'static ShopItem, PoncikError> {
        let item = get_item_by_id(item_id)
            .ok_or_else(|| InventoryError::ItemNotFound(item_id.to_string()))?;

        if !self.owns_item(item_id) {
            return Err(InventoryError::NotOwned(item_id.to_string()).into());
        }

        let slot = match item.category {
            ItemCategory::Pet => &mut self.items.equipped.pet,
            ItemCategory::Outfit => &mut self.items.equipped.outfit,
            ItemCategory::Theme => &mut self.items.equipped.theme,
            ItemCategory::Furniture => return Ok(item),
        };
        *slot = Some(item_id.to_string());
        self.save()?;

        Ok(item)
    }

    #[must_use]
    pub fn owned_items(&self, category: ItemCategory) -> &[String] {
        self.items.ids(category)
    }

    #[must_use]
    pub const fn equipped(&self) -> &Equipped {
        &self.items.equipped
    }

    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.items
    }

    #[must_use]
    pub fn owns_item(&self, item_id: &str) -> bool {
        get_item_by_id(item_id)
            .is_some_and(|item| self.items.ids(item.category).iter().any(|id| id == item_id))
    }

    /// Combined shop price of everything owned.
    #[must_use]
    pub fn total_value(&self) -> i64 {
        ItemCategory::ALL
            .iter()
            .flat_map(|&category| self.items.ids(category))
            .filter_map(|id| get_item_by_id(id))
            .map(|item| item.price)
            .sum()
    }

    /// Give the store back, e.g. to reuse its connection.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}

fn storage_key(user_id: &str) -> String {
    format!("inventory_{user_id}")
}
