//! Repair models.

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
pub enum RepairStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

/// Repair work on an equipment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repair {
    pub id: String,
    pub equipment_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: RepairStatus,
    pub repair_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    pub cost: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Repair {
    /// Date the repair is booked on: completion, else repair date, else `today`.
    pub fn ledger_date(&self, today: NaiveDate) -> NaiveDate {
        self.completed_date.or(self.repair_date).unwrap_or(today)
    }
}

/// Input model for creating a new repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRepair {
    pub equipment_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: RepairStatus,
    pub repair_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    pub cost: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewRepair {
    pub fn validate(&self) -> Result<()> {
        ensure_present("equipment_id", &self.equipment_id)?;
        ensure_present("title", &self.title)?;
        ensure_non_negative("cost", self.cost)
    }
}

/// Partial update of a repair. Unset fields keep their value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairUpdate {
    pub equipment_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<RepairStatus>,
    pub repair_date: Option<Option<NaiveDate>>,
    pub completed_date: Option<Option<NaiveDate>>,
    pub cost: Option<Decimal>,
    pub notes: Option<Option<String>>,
}

impl RepairUpdate {
    pub fn validate(&self) -> Result<()> {
        ensure_present_if_set("equipment_id", self.equipment_id.as_deref())?;
        ensure_present_if_set("title", self.title.as_deref())?;
        ensure_non_negative_if_set("cost", self.cost)
    }
}

impl SourceRecord for Repair {
    type New = NewRepair;
    type Patch = RepairUpdate;

    const KIND: SourceKind = SourceKind::Repair;

    fn id(&self) -> &str {
        &self.id
    }

    fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    fn from_new(id: String, new: &NewRepair) -> Self {
        Repair {
            id,
            equipment_id: new.equipment_id.clone(),
            title: new.title.clone(),
            description: new.description.clone(),
            status: new.status,
            repair_date: new.repair_date,
            completed_date: new.completed_date,
            cost: new.cost,
            notes: new.notes.clone(),
        }
    }

    fn apply_patch(&self, patch: &RepairUpdate) -> Self {
        let mut updated = self.clone();
        if let Some(equipment_id) = &patch.equipment_id {
            updated.equipment_id = equipment_id.clone();
        }
        if let Some(title) = &patch.title {
            updated.title = title.clone();
        }
        if let Some(description) = &patch.description {
            updated.description = description.clone();
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        if let Some(repair_date) = patch.repair_date {
            updated.repair_date = repair_date;
        }
        if let Some(completed_date) = patch.completed_date {
            updated.completed_date = completed_date;
        }
        if let Some(cost) = patch.cost {
            updated.cost = cost;
        }
        if let Some(notes) = &patch.notes {
            updated.notes = notes.clone();
        }
        updated
    }

    fn validate_new(new: &NewRepair) -> Result<()> {
        new.validate()
    }

    fn validate_patch(patch: &RepairUpdate) -> Result<()> {
        patch.validate()
    }

    fn to_ledger_entry(&self, today: NaiveDate) -> LedgerEntry {
        LedgerEntry {
            id: self.id.clone(),
            amount: self.cost,
            date: self.ledger_date(today),
            description: self.title.clone(),
            category: Category::Repair,
            equipment_id: self.equipment_id.clone(),
            source: SourceKind::Repair,
        }
    }
}
