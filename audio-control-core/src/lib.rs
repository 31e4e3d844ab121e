//! # audio-control-core
//!
//! Platform-agnostic audio device control.
//!
//! Provides a typed registry of hardware property addresses, channel
//! discovery, an all-or-nothing fan-out accessor for per-channel volume and
//! mute, a device session with explicit init/deinit lifecycle, and device
//! enumeration. Platform backends (macOS Core Audio) implement the
//! `PropertyStore` trait and plug into `DeviceSession`/`DeviceEnumerator`.
//!
//! ## Architecture
//!
//! ```text
//! audio-control-core (this crate)
//! ├── traits/       ← PropertyStore, PropertyScalar
//! ├── models/       ← ControlError, Property registry, DeviceDescriptor, SessionState, SessionConfiguration
//! ├── processing/   ← channel discovery, fan-out accessor, volume/mute conversions
//! ├── session/      ← DeviceSession (default output device lifecycle)
//! ├── enumeration/  ← DeviceEnumerator
//! └── storage/      ← MemoryPropertyStore
//! ```

pub mod enumeration;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use enumeration::device_enumerator::DeviceEnumerator;
pub use models::config::{ChannelFallback, SessionConfiguration};
pub use models::device::{DeviceDescriptor, DeviceId, DeviceRole, UNKNOWN_PROPERTY_VALUE};
pub use models::error::{ControlError, ErrorKind, HalStatus};
pub use models::property::{Element, Property, PropertyKey, PropertyScope, PropertySelector, PropertyValueKind};
pub use models::state::{ActiveDevice, SessionState};
pub use processing::fanout::{ChannelOutcome, FanOutReport};
pub use session::device_session::DeviceSession;
pub use storage::memory_store::MemoryPropertyStore;
pub use traits::property_store::{PropertyScalar, PropertyStore, ScalarValue};
