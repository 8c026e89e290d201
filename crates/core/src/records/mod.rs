//! Record sources - traits, the optimistic record store and an in-memory backend.

mod memory_store;
mod record_store;
mod records_traits;
mod write_state;


pub use memory_store::InMemoryRemoteStore;
pub use record_store::RecordStore;
pub use records_traits::{RecordMutator, RecordSource, RemoteStore, SourceRecord};
pub use write_state::{WriteOperation, WriteState};

use crate::costs::Cost;
use crate::maintenance::MaintenanceRecord;
use crate::repairs::Repair;
use crate::upgrades::Upgrade;

pub type CostStore = RecordStore<Cost>;
pub type MaintenanceStore = RecordStore<MaintenanceRecord>;
pub type RepairStore = RecordStore<Repair>;
pub type UpgradeStore = RecordStore<Upgrade>;
