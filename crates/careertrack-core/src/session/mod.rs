//! Session domain module.
//!
//! This module contains the identity types and the session observer port.
//!
//! # Module Structure
//!
//! - `model`: `IdentityKey`
//! - `event`: `SessionChange` (signed in / signed out)
//! - `app_mode`: `IdentityMode` state machine (none / guest / authenticated)
//! - `repository`: `SessionObserver` port
//!
//! # Usage
//!
//! ```ignore
//! use careertrack_core::session::{IdentityKey, IdentityMode, SessionChange, SessionObserver};
//! ```

mod app_mode;
mod event;
mod model;
mod repository;

// Re-export public API
pub use app_mode::IdentityMode;
pub use event::SessionChange;
pub use model::IdentityKey;
pub use repository::{SessionObserver, SessionStream};
