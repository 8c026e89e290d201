//! Upgrade models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ledger::{Category, LedgerEntry, SourceKind};
use crate::records::SourceRecord;
use crate::utils::validation::{
    ensure_non_negative, ensure_non_negative_if_set, ensure_present, ensure_present_if_set,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UpgradeStatus {
    Installed,
    #[default]
    Planned,
    Removed,
}

/// What kind of upgrade this is. Unrelated to the ledger [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UpgradeCategory {
    Performance,
    Appearance,
    Utility,
    Safety,
    #[default]
    Other,
}

/// Aftermarket part or modification fitted to an equipment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: String,
    pub equipment_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub install_date: Option<NaiveDate>,
    pub cost: Decimal,
    #[serde(default)]
    pub installer: Option<String>,
    #[serde(default)]
    pub category: UpgradeCategory,
    pub status: UpgradeStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Upgrade {
    /// Date the upgrade is booked on: install date, else `today`.
    pub fn ledger_date(&self, today: NaiveDate) -> NaiveDate {
        self.install_date.unwrap_or(today)
    }
}

/// Input model for creating a new upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUpgrade {
    pub equipment_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub install_date: Option<NaiveDate>,
    pub cost: Decimal,
    #[serde(default)]
    pub installer: Option<String>,
    #[serde(default)]
    pub category: UpgradeCategory,
    #[serde(default)]
    pub status: UpgradeStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewUpgrade {
    pub fn validate(&self) -> Result<()> {
        ensure_present("equipment_id", &self.equipment_id)?;
        ensure_present("name", &self.name)?;
        ensure_non_negative("cost", self.cost)
    }
}

/// Partial update of an upgrade. Unset fields keep their value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeUpdate {
    pub equipment_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub install_date: Option<Option<NaiveDate>>,
    pub cost: Option<Decimal>,
    pub installer: Option<Option<String>>,
    pub category: Option<UpgradeCategory>,
    pub status: Option<UpgradeStatus>,
    pub notes: Option<Option<String>>,
}

impl UpgradeUpdate {
    pub fn validate(&self) -> Result<()> {
        ensure_present_if_set("equipment_id", self.equipment_id.as_deref())?;
        ensure_present_if_set("name", self.name.as_deref())?;
        ensure_non_negative_if_set("cost", self.cost)
    }
}

impl SourceRecord for Upgrade {
    type New = NewUpgrade;
    type Patch = UpgradeUpdate;

    const KIND: SourceKind = SourceKind::Upgrade;

    fn id(&self) -> &str {
        &self.id
    }

    fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    fn from_new(id: String, new: &NewUpgrade) -> Self {
        Upgrade {
            id,
            equipment_id: new.equipment_id.clone(),
            name: new.name.clone(),
            description: new.description.clone(),
            install_date: new.install_date,
            cost: new.cost,
            installer: new.installer.clone(),
            category: new.category,
            status: new.status,
            notes: new.notes.clone(),
        }
    }

    fn apply_patch(&self, patch: &UpgradeUpdate) -> Self {
        let mut updated = self.clone();
        if let Some(equipment_id) = &patch.equipment_id {
            updated.equipment_id = equipment_id.clone();
        }
        if let Some(name) = &patch.name {
            updated.name = name.clone();
        }
        if let Some(description) = &patch.description {
            updated.description = description.clone();
        }
        if let Some(install_date) = patch.install_date {
            updated.install_date = install_date;
        }
        if let Some(cost) = patch.cost {
            updated.cost = cost;
        }
        if let Some(installer) = &patch.installer {
            updated.installer = installer.clone();
        }
        if let Some(category) = patch.category {
            updated.category = category;
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        if let Some(notes) = &patch.notes {
            updated.notes = notes.clone();
        }
        updated
    }

    fn validate_new(new: &NewUpgrade) -> Result<()> {
        new.validate()
    }

    fn validate_patch(patch: &UpgradeUpdate) -> Result<()> {
        patch.validate()
    }

    fn to_ledger_entry(&self, today: NaiveDate) -> LedgerEntry {
        LedgerEntry {
            id: self.id.clone(),
            amount: self.cost,
            date: self.ledger_date(today),
            description: self.name.clone(),
            category: Category::Upgrade,
            equipment_id: self.equipment_id.clone(),
            source: SourceKind::Upgrade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_planned_upgrade_is_booked_today() {
        let today = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        let upgrade = Upgrade::from_new(
            "u1".to_string(),
            &NewUpgrade {
                equipment_id: "truck".to_string(),
                name: "Lift kit".to_string(),
                description: None,
                install_date: None,
                cost: dec!(300),
                installer: None,
                category: UpgradeCategory::Performance,
                status: UpgradeStatus::Planned,
                notes: None,
            },
        );

        let entry = upgrade.to_ledger_entry(today);
        assert_eq!(entry.date, today);
        assert_eq!(entry.category, Category::Upgrade);
        assert_eq!(entry.description, "Lift kit");
    }

    #[test]
    fn test_new_upgrade_requires_name() {
        let new = NewUpgrade {
            equipment_id: "truck".to_string(),
            name: String::new(),
            description: None,
            install_date: None,
            cost: dec!(1),
            installer: None,
            category: UpgradeCategory::Other,
            status: UpgradeStatus::Planned,
            notes: None,
        };
        assert!(new.validate().is_err());
    }
}
