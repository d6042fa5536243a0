//! Shop commands.
//!
//! The catalog is static. Purchases and equipped items are kept locally per
//! user; the balance comes from the backend profile.

use crate::api::{HttpClient, UserProfile, UserState};
use crate::cli::args::{OutputFormat, ShopCommands};
use crate::config::Config;
use crate::error::PoncikError;
use crate::features::inventory::{filter_shop_items, InventoryManager};
use crate::output::{format_equip, format_inventory, format_purchase, format_shop};
use crate::storage::SqliteStore;

/// Execute shop subcommands.
///
/// # Errors
///
/// Returns an error if the profile cannot be fetched, the purchase or equip
/// is refused, or local storage fails.
pub async fn shop(
    config: &Config,
    cmd: ShopCommands,
    format: OutputFormat,
) -> Result<String, PoncikError> {
    match cmd {
        ShopCommands::List {
            category,
            rarity,
            max_price,
        } => format_shop(&filter_shop_items(category, rarity, max_price), format),

        ShopCommands::Buy { id } => {
            let (user, mut manager) = load_inventory(config).await?;
            let purchase = manager.purchase_item(&id, user.credits)?;
            format_purchase(&purchase, format)
        }

        ShopCommands::Equip { id } => {
            let (_, mut manager) = load_inventory(config).await?;
            let item = manager.equip_item(&id)?;
            format_equip(item, format)
        }

        ShopCommands::Inventory => {
            let (_, manager) = load_inventory(config).await?;
            format_inventory(manager.inventory(), manager.total_value(), format)
        }
    }
}

async fn load_inventory(
    config: &Config,
) -> Result<(UserState, InventoryManager<SqliteStore>), PoncikError> {
    let client = HttpClient::new(&config.api)?;
    let user = client.refresh().await?;
    let manager = InventoryManager::load(user.user_id.clone(), SqliteStore::new()?)?;
    Ok((user, manager))
}
