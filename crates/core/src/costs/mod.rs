//! Costs module - directly entered expenses.

mod costs_model;

#[cfg(test)]
mod costs_model_tests;

pub use costs_model::{Cost, CostUpdate, NewCost};
