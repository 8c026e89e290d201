//! Upgrades module.

mod upgrades_model;

pub use upgrades_model::{NewUpgrade, Upgrade, UpgradeCategory, UpgradeStatus, UpgradeUpdate};
