//! Rotation Sim - headless Heavy Rotation player
//!
//! Wires the selection library and playback engine to a simulated
//! transport, a JSON catalog and a JSON state file.

pub mod catalog;
pub mod config;
pub mod error;
pub mod media;
pub mod simulation;
pub mod store;
pub mod transport;

pub use catalog::{load_catalog, save_catalog, CatalogSink};
pub use config::SimConfig;
pub use error::{Result, SimError};
pub use media::{LogMediaControls, PlayRecord};
pub use simulation::{SimReport, Simulation, POSITION_KEY};
pub use store::JsonFileStore;
pub use transport::SimTransport;
