use crate::enumeration::device_enumerator::DeviceEnumerator;
use crate::models::config::SessionConfiguration;
use crate::models::device::{DeviceDescriptor, DeviceId};
use crate::models::error::ControlError;
use crate::models::property::{Element, Property};
use crate::models::state::{ActiveDevice, SessionState};
use crate::processing::channel_discovery::discover_channels;
use crate::processing::fanout;
use crate::processing::volume;
use crate::traits::property_store::{PropertyScalar, PropertyStore};

/// Control session bound to the default output device.
///
/// `init` resolves the default output device and caches the channels that
/// expose volume; volume and mute calls then fan out across that set.
/// Enumeration and the per-device calls work in any state.
///
/// The session holds no lock. Callers sharing one across threads must
/// serialize access themselves (e.g. `parking_lot::Mutex<DeviceSession<_>>`).
pub struct DeviceSession<S: PropertyStore> {
    enumerator: DeviceEnumerator<S>,
    config: SessionConfiguration,
    state: SessionState,
}

impl<S: PropertyStore> DeviceSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            enumerator: DeviceEnumerator::new(store),
            config: SessionConfiguration::default(),
            state: SessionState::Uninitialized,
        }
    }

    pub fn with_configuration(store: S, config: SessionConfiguration) -> Result<Self, ControlError> {
        config.validate()?;
        Ok(Self {
            enumerator: DeviceEnumerator::new(store),
            config,
            state: SessionState::Uninitialized,
        })
    }

    pub fn configuration(&self) -> &SessionConfiguration {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &S {
        self.enumerator.store()
    }

    // -- Lifecycle --

    /// Bind to the current default output device. Transitions: uninitialized → ready.
    ///
    /// A device with no discoverable volume channel still initializes, but
    /// the session is flagged degraded and volume/mute calls rely on the
    /// fallback element.
    pub fn init(&mut self) -> Result<(), ControlError> {
        if self.state.is_ready() {
            return Err(ControlError::AlreadyInitialized);
        }

        let device = self.default_output_device()?;
        let channels = discover_channels(
            self.store(),
            device,
            self.config.max_consecutive_failures,
        );
        if channels.is_empty() {
            log::warn!(
                "device {} exposes no per-channel volume; session is degraded",
                device
            );
        } else {
            log::debug!("session bound to device {} on channels {:?}", device, channels);
        }

        self.state = SessionState::Ready(ActiveDevice { device, channels });
        Ok(())
    }

    /// Forget the bound device. Transitions: ready → uninitialized.
    pub fn deinit(&mut self) -> Result<(), ControlError> {
        if !self.state.is_ready() {
            return Err(ControlError::NotInitialized);
        }
        self.state = SessionState::Uninitialized;
        Ok(())
    }

    pub fn ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn is_degraded(&self) -> bool {
        self.state.is_degraded()
    }

    // -- Bound device --

    pub fn valid_channels(&self) -> Result<&[Element], ControlError> {
        Ok(&self.active()?.channels)
    }

    pub fn current_device(&self) -> Result<DeviceId, ControlError> {
        Ok(self.active()?.device)
    }

    /// Name of the bound device, `"Unknown"` if it cannot be read.
    pub fn current_device_name(&self) -> Result<String, ControlError> {
        let device = self.current_device()?;
        Ok(self.enumerator.device_name(device))
    }

    /// Volume of the bound device as the rounded average of its channels.
    pub fn volume(&self) -> Result<i32, ControlError> {
        let scalars: Vec<f32> = self.read_channels(Property::Volume)?;
        volume::average_percent(&scalars).ok_or(ControlError::NoChannels(Property::Volume))
    }

    /// Write the same volume to every channel. `percent` must be in [0, 100].
    pub fn set_volume(&mut self, percent: i32) -> Result<(), ControlError> {
        self.active()?;
        let scalar = volume::percent_to_scalar(percent)?;
        self.write_channels(Property::Volume, scalar)
    }

    /// True only if every channel is muted.
    pub fn is_muted(&self) -> Result<bool, ControlError> {
        let flags: Vec<u32> = self.read_channels(Property::Mute)?;
        Ok(volume::all_muted(&flags))
    }

    pub fn set_mute(&mut self, muted: bool) -> Result<(), ControlError> {
        self.write_channels(Property::Mute, volume::mute_flag(muted))
    }

    pub fn mute(&mut self) -> Result<(), ControlError> {
        self.set_mute(true)
    }

    pub fn unmute(&mut self) -> Result<(), ControlError> {
        self.set_mute(false)
    }

    // -- Any state --

    pub fn device_count(&self) -> Result<usize, ControlError> {
        self.enumerator.device_count()
    }

    pub fn devices(&self) -> Result<Vec<DeviceDescriptor>, ControlError> {
        self.enumerator.devices()
    }

    pub fn volume_for_device(&self, id: DeviceId) -> Result<i32, ControlError> {
        self.enumerator.volume(id)
    }

    pub fn set_volume_for_device(&self, id: DeviceId, percent: i32) -> Result<(), ControlError> {
        self.enumerator.set_volume(id, percent)
    }

    pub fn is_muted_for_device(&self, id: DeviceId) -> Result<bool, ControlError> {
        self.enumerator.is_muted(id)
    }

    pub fn set_mute_for_device(&self, id: DeviceId, muted: bool) -> Result<(), ControlError> {
        self.enumerator.set_mute(id, muted)
    }

    // -- Internals --

    fn active(&self) -> Result<&ActiveDevice, ControlError> {
        self.state.active().ok_or(ControlError::NotInitialized)
    }

    fn default_output_device(&self) -> Result<DeviceId, ControlError> {
        let property = Property::DefaultOutputDevice;
        let raw = self
            .store()
            .get_scalar(DeviceId::SYSTEM_OBJECT, &property.key())
            .map_err(|status| ControlError::Hardware {
                device: DeviceId::SYSTEM_OBJECT,
                property,
                status,
            })?;
        u32::from_scalar(raw)
            .map(DeviceId)
            .ok_or(ControlError::ValueType { property })
    }

    fn read_channels<T: PropertyScalar>(&self, property: Property) -> Result<Vec<T>, ControlError> {
        let active = self.active()?;
        fanout::with_fallback(self.config.fallback, &active.channels, |channels| {
            fanout::get_property(self.store(), active.device, property.key(), channels)
        })
    }

    fn write_channels<T: PropertyScalar>(&self, property: Property, value: T) -> Result<(), ControlError> {
        let active = self.active()?;
        fanout::with_fallback(self.config.fallback, &active.channels, |channels| {
            fanout::set_property(self.store(), active.device, value, property.key(), channels)
        })
    }
}
