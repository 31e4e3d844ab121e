use super::device::DeviceId;
use super::property::Element;

/// The device a ready session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDevice {
    pub device: DeviceId,
    /// Channels found to expose the volume property, in probe order.
    pub channels: Vec<Element>,
}

/// Device session state machine.
///
/// State transitions:
/// ```text
/// uninitialized --init--> ready --deinit--> uninitialized
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Ready(ActiveDevice),
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Ready, but discovery found no addressable channel.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Ready(active) if active.channels.is_empty())
    }

    pub fn active(&self) -> Option<&ActiveDevice> {
        match self {
            Self::Ready(active) => Some(active),
            Self::Uninitialized => None,
        }
    }
}
