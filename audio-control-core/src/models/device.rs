use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder reported for descriptive properties that could not be read.
pub const UNKNOWN_PROPERTY_VALUE: &str = "Unknown";

/// Opaque hardware object identifier (`AudioObjectID`).
///
/// Valid only while the device stays attached; look it up again rather than
/// holding on to it across enumerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl DeviceId {
    /// `kAudioObjectSystemObject`, owner of the hardware-wide properties.
    pub const SYSTEM_OBJECT: DeviceId = DeviceId(1);
    /// `kAudioObjectUnknown`.
    pub const UNKNOWN: DeviceId = DeviceId(0);
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DeviceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// How a device can be used, derived from its stream counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRole {
    Microphone,
    Speaker,
    /// Both input and output streams.
    Duplex,
    /// No streams in either direction (or both queries failed).
    Inactive,
}

/// Read-only snapshot of one device, produced per enumeration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: DeviceId,
    pub name: String,
    pub manufacturer: String,
    pub uid: String,
    /// `None` when the stream query failed.
    pub input_stream_count: Option<u32>,
    pub output_stream_count: Option<u32>,
}

impl DeviceDescriptor {
    pub fn is_microphone(&self) -> bool {
        self.input_stream_count.unwrap_or(0) > 0
    }

    pub fn is_speaker(&self) -> bool {
        self.output_stream_count.unwrap_or(0) > 0
    }

    pub fn role(&self) -> DeviceRole {
        match (self.is_microphone(), self.is_speaker()) {
            (true, true) => DeviceRole::Duplex,
            (true, false) => DeviceRole::Microphone,
            (false, true) => DeviceRole::Speaker,
            (false, false) => DeviceRole::Inactive,
        }
    }
}
