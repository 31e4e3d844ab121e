//! Hardware device enumeration and single-channel per-device control.
//!
//! Works directly on a [`PropertyStore`] and needs no session. Every call
//! queries the hardware afresh; nothing is cached between calls.

use std::mem;

use crate::models::device::{DeviceDescriptor, DeviceId, UNKNOWN_PROPERTY_VALUE};
use crate::models::error::ControlError;
use crate::models::property::{Element, Property};
use crate::processing::fanout;
use crate::processing::volume;
use crate::traits::property_store::PropertyStore;

/// The element per-device operations address.
pub const PER_DEVICE_ELEMENT: Element = 0;

/// Audio device enumerator over any property store.
pub struct DeviceEnumerator<S: PropertyStore> {
    store: S,
}

impl<S: PropertyStore> DeviceEnumerator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of devices, from the byte size of the hardware device list.
    pub fn device_count(&self) -> Result<usize, ControlError> {
        let size = self
            .store
            .data_size(DeviceId::SYSTEM_OBJECT, &Property::Devices.key())
            .map_err(|status| ControlError::Hardware {
                device: DeviceId::SYSTEM_OBJECT,
                property: Property::Devices,
                status,
            })?;
        Ok(size as usize / mem::size_of::<u32>())
    }

    /// Ids of every device currently attached.
    pub fn device_ids(&self) -> Result<Vec<DeviceId>, ControlError> {
        let count = self.device_count()?;
        self.store
            .get_object_list(DeviceId::SYSTEM_OBJECT, &Property::Devices.key(), count)
            .map_err(|status| ControlError::Hardware {
                device: DeviceId::SYSTEM_OBJECT,
                property: Property::Devices,
                status,
            })
    }

    /// Snapshot of every attached device.
    ///
    /// Fails only if the device list itself cannot be read. Descriptive
    /// strings that fail to resolve read as `"Unknown"`; failed stream
    /// queries leave the count empty.
    pub fn devices(&self) -> Result<Vec<DeviceDescriptor>, ControlError> {
        let devices: Vec<DeviceDescriptor> = self
            .device_ids()?
            .into_iter()
            .map(|id| self.describe(id))
            .collect();
        log::debug!("enumerated {} audio devices", devices.len());
        Ok(devices)
    }

    /// Descriptor for a single device. Never fails.
    pub fn describe(&self, id: DeviceId) -> DeviceDescriptor {
        DeviceDescriptor {
            id,
            name: self.string_or_unknown(id, Property::Name),
            manufacturer: self.string_or_unknown(id, Property::Manufacturer),
            uid: self.string_or_unknown(id, Property::Uid),
            input_stream_count: self.stream_count(id, Property::InputStreams),
            output_stream_count: self.stream_count(id, Property::OutputStreams),
        }
    }

    pub fn device_name(&self, id: DeviceId) -> String {
        self.string_or_unknown(id, Property::Name)
    }

    /// Volume of `id` on channel 0, as a percentage.
    pub fn volume(&self, id: DeviceId) -> Result<i32, ControlError> {
        let scalars: Vec<f32> = fanout::get_property(
            &self.store,
            id,
            Property::Volume.key(),
            &[PER_DEVICE_ELEMENT],
        )?;
        volume::average_percent(&scalars).ok_or(ControlError::NoChannels(Property::Volume))
    }

    /// Set the volume of `id` on channel 0. `percent` must be in [0, 100].
    pub fn set_volume(&self, id: DeviceId, percent: i32) -> Result<(), ControlError> {
        let scalar = volume::percent_to_scalar(percent)?;
        fanout::set_property(
            &self.store,
            id,
            scalar,
            Property::Volume.key(),
            &[PER_DEVICE_ELEMENT],
        )
    }

    /// Mute state of `id` on channel 0; muted only when the flag is exactly 1.
    pub fn is_muted(&self, id: DeviceId) -> Result<bool, ControlError> {
        let flags: Vec<u32> = fanout::get_property(
            &self.store,
            id,
            Property::Mute.key(),
            &[PER_DEVICE_ELEMENT],
        )?;
        Ok(flags.first() == Some(&1))
    }

    pub fn set_mute(&self, id: DeviceId, muted: bool) -> Result<(), ControlError> {
        fanout::set_property(
            &self.store,
            id,
            volume::mute_flag(muted),
            Property::Mute.key(),
            &[PER_DEVICE_ELEMENT],
        )
    }

    fn string_or_unknown(&self, id: DeviceId, property: Property) -> String {
        match self.store.get_string(id, &property.key()) {
            Ok(value) => value,
            Err(status) => {
                log::debug!("device {}: {} unavailable ({})", id, property, status);
                UNKNOWN_PROPERTY_VALUE.to_string()
            }
        }
    }

    fn stream_count(&self, id: DeviceId, property: Property) -> Option<u32> {
        self.store
            .data_size(id, &property.key())
            .ok()
            .map(|size| size / mem::size_of::<u32>() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::device::DeviceRole;
    use crate::models::error::HalStatus;
    use crate::storage::memory_store::MemoryPropertyStore;
    use crate::traits::property_store::ScalarValue;

    const MIC: DeviceId = DeviceId(51);
    const SPEAKERS: DeviceId = DeviceId(58);
    const HEADSET: DeviceId = DeviceId(64);

    fn three_device_store() -> MemoryPropertyStore {
        let store = MemoryPropertyStore::new();

        store.set_name(MIC, "MacBook Pro Microphone");
        store.set_manufacturer(MIC, "Apple Inc.");
        store.set_uid(MIC, "BuiltInMicrophoneDevice");
        store.set_stream_counts(MIC, 1, 0);

        store.set_name(SPEAKERS, "MacBook Pro Speakers");
        store.set_manufacturer(SPEAKERS, "Apple Inc.");
        store.set_uid(SPEAKERS, "BuiltInSpeakerDevice");
        store.set_stream_counts(SPEAKERS, 0, 1);
        store.set_volume(SPEAKERS, 0, 0.5);
        store.set_mute(SPEAKERS, 0, false);

        store.set_name(HEADSET, "USB Headset");
        store.set_manufacturer(HEADSET, "Generic");
        store.set_uid(HEADSET, "AppleUSBAudioEngine:Generic:USB Headset:1");
        store.set_stream_counts(HEADSET, 1, 1);

        store
    }

    #[test]
    fn counts_devices_from_list_size() {
        let enumerator = DeviceEnumerator::new(three_device_store());
        assert_eq!(enumerator.device_count(), Ok(3));
    }

    #[test]
    fn describes_every_device_in_order() {
        let enumerator = DeviceEnumerator::new(three_device_store());
        let devices = enumerator.devices().unwrap();

        assert_eq!(devices.len(), 3);
        assert_eq!(
            devices.iter().map(|d| d.id).collect::<Vec<_>>(),
            vec![MIC, SPEAKERS, HEADSET]
        );
        assert_eq!(devices[0].role(), DeviceRole::Microphone);
        assert_eq!(devices[1].role(), DeviceRole::Speaker);
        assert!(devices[2].is_microphone() && devices[2].is_speaker());
        assert_eq!(devices[1].uid, "BuiltInSpeakerDevice");
    }

    #[test]
    fn failed_name_reads_as_unknown() {
        let store = three_device_store();
        store.fail_reads(SPEAKERS, Property::Name, None);
        let enumerator = DeviceEnumerator::new(store);

        let devices = enumerator.devices().unwrap();
        let speakers = devices.iter().find(|d| d.id == SPEAKERS).unwrap();
        assert_eq!(speakers.name, UNKNOWN_PROPERTY_VALUE);
        assert_eq!(speakers.manufacturer, "Apple Inc.");
        assert_eq!(speakers.uid, "BuiltInSpeakerDevice");
        assert_eq!(speakers.output_stream_count, Some(1));
    }

    #[test]
    fn missing_strings_read_as_unknown() {
        let store = MemoryPropertyStore::new();
        store.add_device(DeviceId(90));
        let enumerator = DeviceEnumerator::new(store);

        let device = enumerator.describe(DeviceId(90));
        assert_eq!(device.name, UNKNOWN_PROPERTY_VALUE);
        assert_eq!(device.manufacturer, UNKNOWN_PROPERTY_VALUE);
        assert_eq!(device.uid, UNKNOWN_PROPERTY_VALUE);
    }

    #[test]
    fn failed_stream_query_leaves_count_empty() {
        let store = three_device_store();
        store.fail_reads(HEADSET, Property::InputStreams, None);
        let enumerator = DeviceEnumerator::new(store);

        let headset = enumerator.describe(HEADSET);
        assert_eq!(headset.input_stream_count, None);
        assert_eq!(headset.role(), DeviceRole::Speaker);
    }

    #[test]
    fn device_list_failure_is_an_error() {
        let store = three_device_store();
        store.fail_reads(DeviceId::SYSTEM_OBJECT, Property::Devices, None);
        let enumerator = DeviceEnumerator::new(store);

        assert_eq!(
            enumerator.devices(),
            Err(ControlError::Hardware {
                device: DeviceId::SYSTEM_OBJECT,
                property: Property::Devices,
                status: HalStatus::UNSPECIFIED,
            })
        );
    }

    #[test]
    fn per_device_volume_targets_channel_zero() {
        let enumerator = DeviceEnumerator::new(three_device_store());

        assert_eq!(enumerator.volume(SPEAKERS), Ok(50));
        enumerator.set_volume(SPEAKERS, 30).unwrap();
        assert_eq!(enumerator.volume(SPEAKERS), Ok(30));
        assert_eq!(
            enumerator.store().scalar(SPEAKERS, Property::Volume, 0),
            Some(ScalarValue::Float32(0.3))
        );
    }

    #[test]
    fn per_device_volume_rejects_out_of_range_without_hardware_access() {
        let enumerator = DeviceEnumerator::new(three_device_store());
        let before = enumerator.store().call_count();

        assert_eq!(
            enumerator.set_volume(SPEAKERS, 101),
            Err(ControlError::VolumeOutOfRange(101))
        );
        assert_eq!(enumerator.store().call_count(), before);
    }

    #[test]
    fn per_device_mute_round_trips() {
        let enumerator = DeviceEnumerator::new(three_device_store());

        assert_eq!(enumerator.is_muted(SPEAKERS), Ok(false));
        enumerator.set_mute(SPEAKERS, true).unwrap();
        assert_eq!(enumerator.is_muted(SPEAKERS), Ok(true));
    }

    #[test]
    fn per_device_ops_fail_on_devices_without_the_property() {
        let enumerator = DeviceEnumerator::new(three_device_store());
        assert!(enumerator.volume(MIC).is_err());
        assert!(enumerator.set_mute(MIC, true).is_err());
    }
}
