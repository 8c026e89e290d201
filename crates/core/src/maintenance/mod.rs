//! Maintenance module - scheduled and completed maintenance tasks.

mod maintenance_model;

#[cfg(test)]
mod maintenance_model_tests;

pub use maintenance_model::{
    MaintenanceRecord, MaintenanceStatus, MaintenanceUpdate, NewMaintenanceRecord,
};
