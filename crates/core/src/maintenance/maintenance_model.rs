//! Maintenance record models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ledger::{Category, LedgerEntry, SourceKind};
use crate::records::SourceRecord;
use crate::utils::validation::{
    ensure_non_negative, ensure_non_negative_if_set, ensure_present, ensure_present_if_set,
};

/// Lifecycle of a maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceStatus {
    #[default]
    Upcoming,
    Overdue,
    Completed,
}

/// Scheduled or performed maintenance on an equipment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: String,
    pub equipment_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: MaintenanceStatus,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    pub cost: Decimal,
    #[serde(default)]
    pub odometer_reading: Option<u32>,
    #[serde(default)]
    pub service_provider: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MaintenanceRecord {
    /// Date the record is booked on: completion, else due date, else `today`.
    pub fn ledger_date(&self, today: NaiveDate) -> NaiveDate {
        self.completed_date.or(self.due_date).unwrap_or(today)
    }

    /// Status as of `today`: an upcoming task past its due date is overdue.
    pub fn effective_status(&self, today: NaiveDate) -> MaintenanceStatus {
        match (self.status, self.due_date) {
            (MaintenanceStatus::Upcoming, Some(due)) if due < today => MaintenanceStatus::Overdue,
            (status, _) => status,
        }
    }
}

/// Input model for creating a new maintenance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaintenanceRecord {
    pub equipment_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: MaintenanceStatus,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    pub cost: Decimal,
    #[serde(default)]
    pub odometer_reading: Option<u32>,
    #[serde(default)]
    pub service_provider: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewMaintenanceRecord {
    /// Validates the new maintenance data.
    pub fn validate(&self) -> Result<()> {
        ensure_present("equipment_id", &self.equipment_id)?;
        ensure_present("title", &self.title)?;
        ensure_non_negative("cost", self.cost)
    }
}

/// Partial update of a maintenance record. Unset fields keep their value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceUpdate {
    pub equipment_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<MaintenanceStatus>,
    pub due_date: Option<Option<NaiveDate>>,
    pub completed_date: Option<Option<NaiveDate>>,
    pub cost: Option<Decimal>,
    pub odometer_reading: Option<Option<u32>>,
    pub service_provider: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl MaintenanceUpdate {
    /// Marks the task completed on `date`.
    pub fn completed_on(date: NaiveDate) -> Self {
        Self {
            status: Some(MaintenanceStatus::Completed),
            completed_date: Some(Some(date)),
            ..Default::default()
        }
    }

    /// Validates the fields that are set.
    pub fn validate(&self) -> Result<()> {
        ensure_present_if_set("equipment_id", self.equipment_id.as_deref())?;
        ensure_present_if_set("title", self.title.as_deref())?;
        ensure_non_negative_if_set("cost", self.cost)
    }
}

impl SourceRecord for MaintenanceRecord {
    type New = NewMaintenanceRecord;
    type Patch = MaintenanceUpdate;

    const KIND: SourceKind = SourceKind::Maintenance;

    fn id(&self) -> &str {
        &self.id
    }

    fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    fn from_new(id: String, new: &NewMaintenanceRecord) -> Self {
        MaintenanceRecord {
            id,
            equipment_id: new.equipment_id.clone(),
            title: new.title.clone(),
            description: new.description.clone(),
            status: new.status,
            due_date: new.due_date,
            completed_date: new.completed_date,
            cost: new.cost,
            odometer_reading: new.odometer_reading,
            service_provider: new.service_provider.clone(),
            notes: new.notes.clone(),
        }
    }

    fn apply_patch(&self, patch: &MaintenanceUpdate) -> Self {
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
        if let Some(due_date) = patch.due_date {
            updated.due_date = due_date;
        }
        if let Some(completed_date) = patch.completed_date {
            updated.completed_date = completed_date;
        }
        if let Some(cost) = patch.cost {
            updated.cost = cost;
        }
        if let Some(odometer_reading) = patch.odometer_reading {
            updated.odometer_reading = odometer_reading;
        }
        if let Some(service_provider) = &patch.service_provider {
            updated.service_provider = service_provider.clone();
        }
        if let Some(notes) = &patch.notes {
            updated.notes = notes.clone();
        }
        updated
    }

    fn validate_new(new: &NewMaintenanceRecord) -> Result<()> {
        new.validate()
    }

    fn validate_patch(patch: &MaintenanceUpdate) -> Result<()> {
        patch.validate()
    }

    fn to_ledger_entry(&self, today: NaiveDate) -> LedgerEntry {
        LedgerEntry {
            id: self.id.clone(),
            amount: self.cost,
            date: self.ledger_date(today),
            description: self.title.clone(),
            category: Category::Maintenance,
            equipment_id: self.equipment_id.clone(),
            source: SourceKind::Maintenance,
        }
    }
}
