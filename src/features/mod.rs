//! Feature implementations for poncik.
//!
//! - Focus timer and reward settlement
//! - Client-side study bonuses
//! - Cosmetic shop inventory

pub mod focus;
pub mod inventory;
pub mod rewards;
