//! Agora bridge node — wires the governance subsystems together.
//!
//! This crate owns configuration, logging, task supervision and the
//! [`BridgeService`] that runs the monitor poll loop, the vote-event
//! consumer and the backup scheduler as a single supervised unit.

pub mod config;
pub mod error;
pub mod logging;
pub mod publisher;
pub mod service;
pub mod supervisor;

pub use config::BridgeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use publisher::{DisabledWidget, LoggingPublisher, LoggingWidget};
pub use service::BridgeService;
pub use supervisor::{StopHandle, TaskSupervisor};
