//! Cosmetic shop: catalog, purchases and equipped items.

mod catalog;
mod manager;

pub use catalog::{
    all_shop_items, filter_shop_items, get_item_by_id, ItemCategory, ItemSize, Rarity, ShopItem,
    ThemeColors,
};
pub use manager::{Equipped, Inventory, InventoryError, InventoryManager, Purchase};
