//! Domain models for the tracker
//!
//! Reference data (world graph, code flags) and the snapshot types, without
//! any I/O concerns beyond loading the reference tables.

mod codes;
mod pairing;
mod snapshot;
mod world;

pub use codes::CodeRegistry;
pub use pairing::PairingGraph;
pub use snapshot::{Current, DebugInfo, Door, Region, Save, Total, Totals};
pub use world::{
    is_shop_terminal, RegionDef, RegistryError, UnknownScene, WorldRegistry, SHOP_REGION,
    SHOP_TERMINALS,
};
