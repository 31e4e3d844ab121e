use std::fmt;

use thiserror::Error;

use super::device::DeviceId;
use super::property::Property;

/// Raw status code returned by the audio hardware service (`OSStatus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalStatus(pub i32);

impl HalStatus {
    /// `kAudioHardwareNoError`.
    pub const NO_ERROR: HalStatus = HalStatus(0);
    /// `kAudioHardwareUnspecifiedError` ('what').
    pub const UNSPECIFIED: HalStatus = HalStatus(0x7768_6174);
    /// `kAudioHardwareUnknownPropertyError` ('who?').
    pub const UNKNOWN_PROPERTY: HalStatus = HalStatus(0x7768_6f3f);
    /// `kAudioHardwareBadPropertySizeError` ('!siz').
    pub const BAD_PROPERTY_SIZE: HalStatus = HalStatus(0x2173_697a);
    /// `kAudioHardwareBadObjectError` ('!obj').
    pub const BAD_OBJECT: HalStatus = HalStatus(0x216f_626a);

    pub fn is_ok(self) -> bool {
        self == Self::NO_ERROR
    }

    /// The status as a four-character code, if every byte is printable ASCII.
    pub fn four_char_code(self) -> Option<String> {
        let bytes = self.0.to_be_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            Some(bytes.iter().map(|&b| b as char).collect())
        } else {
            None
        }
    }
}

impl fmt::Display for HalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.four_char_code() {
            Some(code) => write!(f, "status {} ('{}')", self.0, code),
            None => write!(f, "status {}", self.0),
        }
    }
}

/// Broad classification of a [`ControlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller broke the session contract or passed an out-of-domain argument.
    /// Raised before any hardware access.
    Usage,
    /// The hardware service rejected a read or write.
    Hardware,
}

/// Errors that can occur during audio device control operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("already initialized")]
    AlreadyInitialized,

    #[error("not initialized")]
    NotInitialized,

    #[error("value out of range [0;100]: {0}")]
    VolumeOutOfRange(i32),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{property} on device {device} failed: {status}")]
    Hardware {
        device: DeviceId,
        property: Property,
        status: HalStatus,
    },

    #[error("{property} failed on {failed} of {total} channels")]
    ChannelFanOut {
        property: Property,
        failed: usize,
        total: usize,
    },

    #[error("{0} has no channels to address")]
    NoChannels(Property),

    #[error("{property} returned an unexpected value type")]
    ValueType { property: Property },
}

impl ControlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyInitialized
            | Self::NotInitialized
            | Self::VolumeOutOfRange(_)
            | Self::InvalidConfiguration(_) => ErrorKind::Usage,
            Self::Hardware { .. }
            | Self::ChannelFanOut { .. }
            | Self::NoChannels(_)
            | Self::ValueType { .. } => ErrorKind::Hardware,
        }
    }

    pub fn is_usage_error(&self) -> bool {
        self.kind() == ErrorKind::Usage
    }
}
