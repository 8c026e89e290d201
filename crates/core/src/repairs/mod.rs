//! Repairs module.

mod repairs_model;

pub use repairs_model::{NewRepair, Repair, RepairStatus, RepairUpdate};
