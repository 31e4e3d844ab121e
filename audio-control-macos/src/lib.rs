//! # audio-control-macos
//!
//! macOS Core Audio backend for audio-control.
//!
//! Provides:
//! - `CoreAudioPropertyStore` — `PropertyStore` over the Core Audio HAL
//!   (`AudioObjectGetPropertyData` and friends)
//! - `default_session` / `enumerator` — core types bound to that store
//!
//! ## Usage
//! ```ignore
//! use audio_control_macos::default_session;
//!
//! let mut session = default_session();
//! session.init()?;
//! session.set_volume(40)?;
//! println!("{}: {}%", session.current_device_name()?, session.volume()?);
//! ```

#[cfg(target_os = "macos")]
pub mod core_audio_store;

#[cfg(target_os = "macos")]
pub use core_audio_store::CoreAudioPropertyStore;

/// Session over the system's Core Audio hardware with the default configuration.
#[cfg(target_os = "macos")]
pub fn default_session() -> audio_control_core::DeviceSession<CoreAudioPropertyStore> {
    audio_control_core::DeviceSession::new(CoreAudioPropertyStore::new())
}

/// Enumerator over the system's Core Audio hardware.
#[cfg(target_os = "macos")]
pub fn enumerator() -> audio_control_core::DeviceEnumerator<CoreAudioPropertyStore> {
    audio_control_core::DeviceEnumerator::new(CoreAudioPropertyStore::new())
}
