//! The static shop catalog.

use std::collections::HashMap;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Shop section an item belongs to.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Pet,
    Outfit,
    Furniture,
    Theme,
}

impl ItemCategory {
    pub const ALL: [Self; 4] = [Self::Pet, Self::Outfit, Self::Furniture, Self::Theme];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pet => "Pets",
            Self::Outfit => "Outfits",
            Self::Furniture => "Furniture",
            Self::Theme => "Themes",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

/// Footprint of a furniture item, in cafe grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemSize {
    pub width: u8,
    pub height: u8,
}

/// Palette of a theme item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
}

/// An item that can be bought in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: i64,
    pub category: ItemCategory,
    pub rarity: Rarity,
    pub emoji: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ItemSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<ThemeColors>,
}

impl ShopItem {
    fn basic(
        id: &'static str,
        name: &'static str,
        price: i64,
        category: ItemCategory,
        rarity: Rarity,
        emoji: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            price,
            category,
            rarity,
            emoji,
            size: None,
            colors: None,
        }
    }

    fn furniture(
        id: &'static str,
        name: &'static str,
        price: i64,
        rarity: Rarity,
        emoji: &'static str,
        (width, height): (u8, u8),
    ) -> Self {
        Self {
            size: Some(ItemSize { width, height }),
            ..Self::basic(id, name, price, ItemCategory::Furniture, rarity, emoji)
        }
    }

    fn theme(
        id: &'static str,
        name: &'static str,
        price: i64,
        rarity: Rarity,
        emoji: &'static str,
        (primary, secondary, accent): (&'static str, &'static str, &'static str),
    ) -> Self {
        Self {
            colors: Some(ThemeColors {
                primary,
                secondary,
                accent,
            }),
            ..Self::basic(id, name, price, ItemCategory::Theme, rarity, emoji)
        }
    }
}

static CATALOG: Lazy<Vec<ShopItem>> = Lazy::new(|| {
    use ItemCategory::{Outfit, Pet};
    use Rarity::{Common, Epic, Rare};

    vec![
        ShopItem::basic("cat-orange", "Orange Cat", 5000, Pet, Common, "🐱"),
        ShopItem::basic("bunny-white", "White Bunny", 6000, Pet, Common, "🐰"),
        ShopItem::basic("poncik-bear", "Poncik Bear", 8000, Pet, Rare, "🐻"),
        ShopItem::basic("panda-baby", "Baby Panda", 10000, Pet, Epic, "🐼"),
        ShopItem::basic("casual", "Casual Outfit", 0, Outfit, Common, "👕"),
        ShopItem::basic("cozy", "Cozy Outfit", 3000, Outfit, Common, "🧥"),
        ShopItem::basic("study-uniform", "Study Uniform", 5000, Outfit, Rare, "🎓"),
        ShopItem::furniture("table-wood-1", "Wooden Table", 1500, Common, "🪑", (2, 2)),
        ShopItem::furniture("chair-modern", "Modern Chair", 800, Common, "🪑", (1, 1)),
        ShopItem::furniture("plant-pot", "Potted Plant", 1200, Common, "🪴", (1, 1)),
        ShopItem::furniture("painting-sakura", "Sakura Painting", 2000, Rare, "🖼️", (2, 1)),
        ShopItem::furniture("lamp-vintage", "Vintage Lamp", 1800, Rare, "💡", (1, 2)),
        ShopItem::theme("sakura", "Sakura", 0, Common, "🌸", ("#F5E6D3", "#FFB7C5", "#FF69B4")),
        ShopItem::theme("autumn", "Autumn", 4000, Rare, "🍂", ("#D4A574", "#8B4513", "#FF8C00")),
        ShopItem::theme("winter", "Winter", 4000, Rare, "❄️", ("#E8F4F8", "#B0E0E6", "#4682B4")),
    ]
});

static BY_ID: Lazy<HashMap<&'static str, &'static ShopItem>> =
    Lazy::new(|| CATALOG.iter().map(|item| (item.id, item)).collect());

/// Look up an item by id.
#[must_use]
pub fn get_item_by_id(id: &str) -> Option<&'static ShopItem> {
    BY_ID.get(id).copied()
}

/// Every item, in catalog order.
#[must_use]
pub fn all_shop_items() -> &'static [ShopItem] {
    &CATALOG
}

/// Items matching all given filters.
#[must_use]
pub fn filter_shop_items(
    category: Option<ItemCategory>,
    rarity: Option<Rarity>,
    max_price: Option<i64>,
) -> Vec<&'static ShopItem> {
    CATALOG
        .iter()
        .filter(|item| category.map_or(true, |c| item.category == c))
        .filter(|item| rarity.map_or(true, |r| item.rarity == r))
        .filter(|item| max_price.map_or(true, |max| item.price <= max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_eq!(BY_ID.len(), all_shop_items().len());
    }

    #[test]
    fn test_get_item_by_id() {
        let bear = get_item_by_id("poncik-bear").unwrap();
        assert_eq!(bear.price, 8000);
        assert_eq!(bear.rarity, Rarity::Rare);
        assert!(get_item_by_id("dragon").is_none());
    }

    #[test]
    fn test_filters() {
        let pets = filter_shop_items(Some(ItemCategory::Pet), None, None);
        assert_eq!(pets.len(), 4);

        let cheap_rare = filter_shop_items(None, Some(Rarity::Rare), Some(2000));
        let ids: Vec<_> = cheap_rare.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["painting-sakura", "lamp-vintage"]);

        assert_eq!(filter_shop_items(None, None, None).len(), all_shop_items().len());
    }

    #[test]
    fn test_category_extras() {
        assert!(get_item_by_id("lamp-vintage").unwrap().size.is_some());
        assert_eq!(
            get_item_by_id("winter").unwrap().colors.map(|c| c.accent),
            Some("#4682B4")
        );
        assert!(get_item_by_id("cozy").unwrap().size.is_none());
    }
}
