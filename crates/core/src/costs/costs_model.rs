//! Direct cost entry models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ledger::{Category, LedgerEntry, SourceKind};
use crate::records::SourceRecord;
use crate::utils::validation::{
    ensure_non_negative, ensure_non_negative_if_set, ensure_present, ensure_present_if_set,
};

/// Expense entered directly by the user (fuel fill-up, parts, fees, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub id: String,
    pub equipment_id: String,
    /// Free choice; may name any category regardless of where the money went.
    pub category: Category,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input model for creating a new cost entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCost {
    pub equipment_id: String,
    pub category: Category,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewCost {
    /// Validates the new cost data.
    pub fn validate(&self) -> Result<()> {
        ensure_present("equipment_id", &self.equipment_id)?;
        ensure_present("description", &self.description)?;
        ensure_non_negative("amount", self.amount)
    }
}

/// Partial update of a cost entry. Unset fields keep their value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CostUpdate {
    pub equipment_id: Option<String>,
    pub category: Option<Category>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub receipt_url: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl CostUpdate {
    /// Validates the fields that are set.
    pub fn validate(&self) -> Result<()> {
        ensure_present_if_set("equipment_id", self.equipment_id.as_deref())?;
        ensure_present_if_set("description", self.description.as_deref())?;
        ensure_non_negative_if_set("amount", self.amount)
    }
}

impl SourceRecord for Cost {
    type New = NewCost;
    type Patch = CostUpdate;

    const KIND: SourceKind = SourceKind::Cost;

    fn id(&self) -> &str {
        &self.id
    }

    fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    fn from_new(id: String, new: &NewCost) -> Self {
        Cost {
            id,
            equipment_id: new.equipment_id.clone(),
            category: new.category,
            amount: new.amount,
            date: new.date,
            description: new.description.clone(),
            receipt_url: new.receipt_url.clone(),
            notes: new.notes.clone(),
        }
    }

    fn apply_patch(&self, patch: &CostUpdate) -> Self {
        let mut updated = self.clone();
        if let Some(equipment_id) = &patch.equipment_id {
            updated.equipment_id = equipment_id.clone();
        }
        if let Some(category) = patch.category {
            updated.category = category;
        }
        if let Some(amount) = patch.amount {
            updated.amount = amount;
        }
        if let Some(date) = patch.date {
            updated.date = date;
        }
        if let Some(description) = &patch.description {
            updated.description = description.clone();
        }
        if let Some(receipt_url) = &patch.receipt_url {
            updated.receipt_url = receipt_url.clone();
        }
        if let Some(notes) = &patch.notes {
            updated.notes = notes.clone();
        }
        updated
    }

    fn validate_new(new: &NewCost) -> Result<()> {
        new.validate()
    }

    fn validate_patch(patch: &CostUpdate) -> Result<()> {
        patch.validate()
    }

    fn to_ledger_entry(&self, _today: NaiveDate) -> LedgerEntry {
        LedgerEntry {
            id: self.id.clone(),
            amount: self.amount,
            date: self.date,
            description: self.description.clone(),
            category: self.category,
            equipment_id: self.equipment_id.clone(),
            source: SourceKind::Cost,
        }
    }
}
