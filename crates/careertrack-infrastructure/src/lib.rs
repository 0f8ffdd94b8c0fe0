pub mod config_service;
pub mod json_local_store;
pub mod memory_local_store;
pub mod memory_remote_store;
pub mod paths;
pub mod session_observer;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::json_local_store::JsonFileLocalStore;
pub use crate::memory_local_store::InMemoryLocalStore;
pub use crate::memory_remote_store::{InMemoryRemoteStore, StoredDocument};
pub use crate::session_observer::ChannelSessionObserver;
