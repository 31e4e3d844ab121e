//! In-process stand-in for the audio hardware property service.
//!
//! Holds a set of devices with per-element scalar properties, descriptive
//! strings and stream counts. Reads and writes can be made to fail per
//! (device, property, element) to exercise the error paths of the accessor,
//! and every trait call is counted so callers can check that a rejected
//! operation never reached the store.

use std::collections::HashMap;
use std::mem;

use parking_lot::Mutex;

use crate::models::device::DeviceId;
use crate::models::error::HalStatus;
use crate::models::property::{Element, Property, PropertyKey};
use crate::traits::property_store::{PropertyStore, ScalarValue};

#[derive(Debug, Default)]
struct FakeDevice {
    scalars: HashMap<(Property, Element), ScalarValue>,
    strings: HashMap<Property, String>,
    input_streams: u32,
    output_streams: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy)]
struct FailureRule {
    access: Access,
    device: DeviceId,
    property: Property,
    /// `None` matches every element.
    element: Option<Element>,
}

impl FailureRule {
    fn matches(&self, access: Access, device: DeviceId, key: &PropertyKey) -> bool {
        self.access == access
            && self.device == device
            && self.property == key.property()
            && self.element.map_or(true, |e| e == key.element())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    devices: Vec<(DeviceId, FakeDevice)>,
    default_output: Option<DeviceId>,
    failures: Vec<FailureRule>,
    calls: usize,
}

impl StoreState {
    fn device(&self, id: DeviceId) -> Result<&FakeDevice, HalStatus> {
        self.devices
            .iter()
            .find(|(device_id, _)| *device_id == id)
            .map(|(_, device)| device)
            .ok_or(HalStatus::BAD_OBJECT)
    }

    fn device_mut(&mut self, id: DeviceId) -> &mut FakeDevice {
        let index = match self.devices.iter().position(|(device_id, _)| *device_id == id) {
            Some(index) => index,
            None => {
                self.devices.push((id, FakeDevice::default()));
                self.devices.len() - 1
            }
        };
        &mut self.devices[index].1
    }

    fn check(&self, access: Access, device: DeviceId, key: &PropertyKey) -> Result<(), HalStatus> {
        if self
            .failures
            .iter()
            .any(|rule| rule.matches(access, device, key))
        {
            return Err(HalStatus::UNSPECIFIED);
        }
        Ok(())
    }
}

/// Thread-safe in-memory [`PropertyStore`].
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    state: Mutex<StoreState>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device with no properties. Devices are listed in insertion order.
    pub fn add_device(&self, id: DeviceId) {
        self.state.lock().device_mut(id);
    }

    pub fn set_default_output(&self, id: DeviceId) {
        self.state.lock().default_output = Some(id);
    }

    pub fn set_name(&self, id: DeviceId, name: &str) {
        self.set_string(id, Property::Name, name);
    }

    pub fn set_manufacturer(&self, id: DeviceId, manufacturer: &str) {
        self.set_string(id, Property::Manufacturer, manufacturer);
    }

    pub fn set_uid(&self, id: DeviceId, uid: &str) {
        self.set_string(id, Property::Uid, uid);
    }

    pub fn set_stream_counts(&self, id: DeviceId, input: u32, output: u32) {
        let mut state = self.state.lock();
        let device = state.device_mut(id);
        device.input_streams = input;
        device.output_streams = output;
    }

    /// Expose the volume property on `element` with the given scalar (0.0–1.0).
    pub fn set_volume(&self, id: DeviceId, element: Element, volume: f32) {
        self.set_scalar_value(id, Property::Volume, element, ScalarValue::Float32(volume));
    }

    /// Expose the mute property on `element`.
    pub fn set_mute(&self, id: DeviceId, element: Element, muted: bool) {
        self.set_scalar_value(id, Property::Mute, element, ScalarValue::UInt32(muted as u32));
    }

    pub fn set_scalar_value(&self, id: DeviceId, property: Property, element: Element, value: ScalarValue) {
        self.state
            .lock()
            .device_mut(id)
            .scalars
            .insert((property, element), value);
    }

    /// Current stored value, bypassing failure rules and the call counter.
    pub fn scalar(&self, id: DeviceId, property: Property, element: Element) -> Option<ScalarValue> {
        let state = self.state.lock();
        state
            .device(id)
            .ok()
            .and_then(|device| device.scalars.get(&(property, element)).copied())
    }

    /// Make reads of `property` fail; `element: None` fails every element.
    pub fn fail_reads(&self, id: DeviceId, property: Property, element: Option<Element>) {
        self.add_failure(Access::Read, id, property, element);
    }

    /// Make writes of `property` fail; `element: None` fails every element.
    pub fn fail_writes(&self, id: DeviceId, property: Property, element: Option<Element>) {
        self.add_failure(Access::Write, id, property, element);
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Number of [`PropertyStore`] calls served so far.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls
    }

    fn set_string(&self, id: DeviceId, property: Property, value: &str) {
        self.state
            .lock()
            .device_mut(id)
            .strings
            .insert(property, value.to_string());
    }

    fn add_failure(&self, access: Access, device: DeviceId, property: Property, element: Option<Element>) {
        self.state.lock().failures.push(FailureRule {
            access,
            device,
            property,
            element,
        });
    }

    fn stream_count(device: &FakeDevice, key: &PropertyKey) -> Option<u32> {
        match key.property() {
            Property::InputStreams => Some(device.input_streams),
            Property::OutputStreams => Some(device.output_streams),
            _ => None,
        }
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn has_property(&self, object: DeviceId, key: &PropertyKey) -> bool {
        let mut state = self.state.lock();
        state.calls += 1;

        if object == DeviceId::SYSTEM_OBJECT {
            return matches!(
                key.property(),
                Property::Devices | Property::DefaultOutputDevice
            );
        }
        let Ok(device) = state.device(object) else {
            return false;
        };
        match key.property() {
            Property::Volume | Property::Mute => device
                .scalars
                .contains_key(&(key.property(), key.element())),
            Property::Name | Property::Manufacturer | Property::Uid => {
                device.strings.contains_key(&key.property())
            }
            Property::InputStreams | Property::OutputStreams => true,
            Property::Devices | Property::DefaultOutputDevice => false,
        }
    }

    fn data_size(&self, object: DeviceId, key: &PropertyKey) -> Result<u32, HalStatus> {
        let mut state = self.state.lock();
        state.calls += 1;
        state.check(Access::Read, object, key)?;

        let id_size = mem::size_of::<u32>() as u32;
        if object == DeviceId::SYSTEM_OBJECT {
            return match key.property() {
                Property::Devices => Ok(state.devices.len() as u32 * id_size),
                Property::DefaultOutputDevice => Ok(id_size),
                _ => Err(HalStatus::UNKNOWN_PROPERTY),
            };
        }

        let device = state.device(object)?;
        if let Some(count) = Self::stream_count(device, key) {
            return Ok(count * id_size);
        }
        if device.strings.contains_key(&key.property()) {
            return Ok(mem::size_of::<usize>() as u32);
        }
        if device
            .scalars
            .contains_key(&(key.property(), key.element()))
        {
            return Ok(4);
        }
        Err(HalStatus::UNKNOWN_PROPERTY)
    }

    fn get_scalar(&self, object: DeviceId, key: &PropertyKey) -> Result<ScalarValue, HalStatus> {
        let mut state = self.state.lock();
        state.calls += 1;
        state.check(Access::Read, object, key)?;

        if object == DeviceId::SYSTEM_OBJECT {
            return match key.property() {
                Property::DefaultOutputDevice => state
                    .default_output
                    .map(|id| ScalarValue::UInt32(id.0))
                    .ok_or(HalStatus::UNSPECIFIED),
                _ => Err(HalStatus::UNKNOWN_PROPERTY),
            };
        }

        state
            .device(object)?
            .scalars
            .get(&(key.property(), key.element()))
            .copied()
            .ok_or(HalStatus::UNKNOWN_PROPERTY)
    }

    fn set_scalar(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        value: ScalarValue,
    ) -> Result<(), HalStatus> {
        let mut state = self.state.lock();
        state.calls += 1;
        state.check(Access::Write, object, key)?;
        state.device(object)?;

        let slot = state
            .device_mut(object)
            .scalars
            .get_mut(&(key.property(), key.element()))
            .ok_or(HalStatus::UNKNOWN_PROPERTY)?;
        if mem::discriminant(slot) != mem::discriminant(&value) {
            return Err(HalStatus::BAD_PROPERTY_SIZE);
        }
        *slot = value;
        Ok(())
    }

    fn get_string(&self, object: DeviceId, key: &PropertyKey) -> Result<String, HalStatus> {
        let mut state = self.state.lock();
        state.calls += 1;
        state.check(Access::Read, object, key)?;

        state
            .device(object)?
            .strings
            .get(&key.property())
            .cloned()
            .ok_or(HalStatus::UNKNOWN_PROPERTY)
    }

    fn get_object_list(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        capacity: usize,
    ) -> Result<Vec<DeviceId>, HalStatus> {
        let mut state = self.state.lock();
        state.calls += 1;
        state.check(Access::Read, object, key)?;

        if object == DeviceId::SYSTEM_OBJECT {
            return match key.property() {
                Property::Devices => Ok(state
                    .devices
                    .iter()
                    .map(|(id, _)| *id)
                    .take(capacity)
                    .collect()),
                _ => Err(HalStatus::UNKNOWN_PROPERTY),
            };
        }

        let device = state.device(object)?;
        let count = Self::stream_count(device, key).ok_or(HalStatus::UNKNOWN_PROPERTY)?;
        // Stream ids are synthetic; only their number matters.
        Ok((0..count)
            .map(|i| DeviceId(object.0.wrapping_mul(100).wrapping_add(i)))
            .take(capacity)
            .collect())
    }
}
