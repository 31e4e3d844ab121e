//! Core Audio HAL property access.
//!
//! Translates registry keys into `AudioObjectPropertyAddress` values and
//! performs one blocking HAL call per trait method.

use std::ffi::CStr;
use std::mem;
use std::os::raw::{c_char, c_void};
use std::ptr;

use coreaudio_sys::{
    kAudioDevicePropertyDeviceManufacturerCFString, kAudioDevicePropertyDeviceNameCFString,
    kAudioDevicePropertyDeviceUID, kAudioDevicePropertyMute, kAudioDevicePropertyScopeInput,
    kAudioDevicePropertyScopeOutput, kAudioDevicePropertyStreams,
    kAudioDevicePropertyVolumeScalar, kAudioHardwareNoError,
    kAudioHardwarePropertyDefaultOutputDevice, kAudioHardwarePropertyDevices,
    kAudioObjectPropertyScopeGlobal, AudioObjectGetPropertyData, AudioObjectGetPropertyDataSize,
    AudioObjectHasProperty, AudioObjectID, AudioObjectPropertyAddress,
    AudioObjectSetPropertyData, CFRelease, CFStringGetCString, CFStringGetLength,
    CFStringGetMaximumSizeForEncoding, CFStringRef, OSStatus, UInt32,
};

use audio_control_core::models::device::DeviceId;
use audio_control_core::models::error::HalStatus;
use audio_control_core::models::property::{
    PropertyKey, PropertyScope, PropertySelector, PropertyValueKind,
};
use audio_control_core::traits::property_store::{PropertyStore, ScalarValue};

const CF_STRING_ENCODING_UTF8: u32 = 0x0800_0100;

/// Property store backed by the Core Audio hardware abstraction layer.
///
/// Stateless: every call goes straight to the HAL, so the store is freely
/// shareable across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreAudioPropertyStore;

impl CoreAudioPropertyStore {
    pub fn new() -> Self {
        Self
    }
}

fn address(key: &PropertyKey) -> AudioObjectPropertyAddress {
    let selector = match key.selector() {
        PropertySelector::VolumeScalar => kAudioDevicePropertyVolumeScalar,
        PropertySelector::Mute => kAudioDevicePropertyMute,
        PropertySelector::DefaultOutputDevice => kAudioHardwarePropertyDefaultOutputDevice,
        PropertySelector::Devices => kAudioHardwarePropertyDevices,
        PropertySelector::DeviceName => kAudioDevicePropertyDeviceNameCFString,
        PropertySelector::DeviceManufacturer => kAudioDevicePropertyDeviceManufacturerCFString,
        PropertySelector::DeviceUid => kAudioDevicePropertyDeviceUID,
        PropertySelector::Streams => kAudioDevicePropertyStreams,
    };
    let scope = match key.scope() {
        PropertyScope::Global => kAudioObjectPropertyScopeGlobal,
        PropertyScope::Input => kAudioDevicePropertyScopeInput,
        PropertyScope::Output => kAudioDevicePropertyScopeOutput,
    };
    AudioObjectPropertyAddress {
        mSelector: selector,
        mScope: scope,
        mElement: key.element(),
    }
}

fn check(status: OSStatus) -> Result<(), HalStatus> {
    if status == kAudioHardwareNoError as OSStatus {
        Ok(())
    } else {
        Err(HalStatus(status))
    }
}

/// Read a fixed-size value.
///
/// # Safety
/// `T` must match the layout of the property's data.
unsafe fn read_value<T: Copy + Default>(
    object: AudioObjectID,
    address: &AudioObjectPropertyAddress,
) -> Result<T, HalStatus> {
    let mut value = T::default();
    let mut size = mem::size_of::<T>() as UInt32;
    check(AudioObjectGetPropertyData(
        object,
        address,
        0,
        ptr::null(),
        &mut size,
        &mut value as *mut T as *mut c_void,
    ))?;
    if size as usize != mem::size_of::<T>() {
        return Err(HalStatus::BAD_PROPERTY_SIZE);
    }
    Ok(value)
}

/// Write a fixed-size value.
///
/// # Safety
/// `T` must match the layout of the property's data.
unsafe fn write_value<T: Copy>(
    object: AudioObjectID,
    address: &AudioObjectPropertyAddress,
    value: T,
) -> Result<(), HalStatus> {
    check(AudioObjectSetPropertyData(
        object,
        address,
        0,
        ptr::null(),
        mem::size_of::<T>() as UInt32,
        &value as *const T as *const c_void,
    ))
}

/// Copy a CFString into an owned UTF-8 string.
///
/// # Safety
/// `string` must be a valid, non-null CFString.
unsafe fn cf_string_to_string(string: CFStringRef) -> Option<String> {
    let length = CFStringGetLength(string);
    let capacity = CFStringGetMaximumSizeForEncoding(length, CF_STRING_ENCODING_UTF8) + 1;
    let mut buffer = vec![0 as c_char; capacity as usize];
    if CFStringGetCString(
        string,
        buffer.as_mut_ptr(),
        capacity,
        CF_STRING_ENCODING_UTF8,
    ) == 0
    {
        return None;
    }
    CStr::from_ptr(buffer.as_ptr())
        .to_str()
        .ok()
        .map(str::to_owned)
}

impl PropertyStore for CoreAudioPropertyStore {
    fn has_property(&self, object: DeviceId, key: &PropertyKey) -> bool {
        let address = address(key);
        // SAFETY: `address` outlives the call; the HAL only reads it.
        unsafe { AudioObjectHasProperty(object.0, &address) != 0 }
    }

    fn data_size(&self, object: DeviceId, key: &PropertyKey) -> Result<u32, HalStatus> {
        let address = address(key);
        let mut size: UInt32 = 0;
        // SAFETY: `size` is a valid out-pointer for the duration of the call.
        check(unsafe {
            AudioObjectGetPropertyDataSize(object.0, &address, 0, ptr::null(), &mut size)
        })?;
        Ok(size)
    }

    fn get_scalar(&self, object: DeviceId, key: &PropertyKey) -> Result<ScalarValue, HalStatus> {
        let address = address(key);
        // SAFETY: the registry's value kind fixes the data layout of each property.
        unsafe {
            match key.property().value_kind() {
                PropertyValueKind::Float32 => {
                    read_value::<f32>(object.0, &address).map(ScalarValue::Float32)
                }
                PropertyValueKind::UInt32 => {
                    read_value::<u32>(object.0, &address).map(ScalarValue::UInt32)
                }
                PropertyValueKind::String | PropertyValueKind::ObjectList => {
                    Err(HalStatus::BAD_PROPERTY_SIZE)
                }
            }
        }
    }

    fn set_scalar(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        value: ScalarValue,
    ) -> Result<(), HalStatus> {
        let address = address(key);
        let expected = key.property().value_kind();
        // SAFETY: writes are only issued when the value matches the registry kind.
        unsafe {
            match (expected, value) {
                (PropertyValueKind::Float32, ScalarValue::Float32(v)) => {
                    write_value(object.0, &address, v)
                }
                (PropertyValueKind::UInt32, ScalarValue::UInt32(v)) => {
                    write_value(object.0, &address, v)
                }
                _ => Err(HalStatus::BAD_PROPERTY_SIZE),
            }
        }
    }

    fn get_string(&self, object: DeviceId, key: &PropertyKey) -> Result<String, HalStatus> {
        let address = address(key);
        // SAFETY: the HAL hands back a retained CFString which is released
        // here once copied.
        unsafe {
            let string: CFStringRef = read_value::<usize>(object.0, &address)? as CFStringRef;
            if string.is_null() {
                return Err(HalStatus::UNSPECIFIED);
            }
            let converted = cf_string_to_string(string);
            CFRelease(string as *const c_void);
            converted.ok_or_else(|| {
                log::debug!("device {}: {} is not valid UTF-8", object, key.property());
                HalStatus::UNSPECIFIED
            })
        }
    }

    fn get_object_list(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        capacity: usize,
    ) -> Result<Vec<DeviceId>, HalStatus> {
        if capacity == 0 {
            return Ok(Vec::new());
        }
        let address = address(key);
        let mut ids: Vec<AudioObjectID> = vec![0; capacity];
        let mut size = (capacity * mem::size_of::<AudioObjectID>()) as UInt32;
        // SAFETY: `ids` has room for `size` bytes; the HAL writes back how many it used.
        check(unsafe {
            AudioObjectGetPropertyData(
                object.0,
                &address,
                0,
                ptr::null(),
                &mut size,
                ids.as_mut_ptr() as *mut c_void,
            )
        })?;
        ids.truncate(size as usize / mem::size_of::<AudioObjectID>());
        Ok(ids.into_iter().map(DeviceId).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audio_control_core::models::property::Property;

    #[test]
    fn addresses_match_registry_codes() {
        for property in Property::ALL {
            let key = property.key().with_element(2);
            let address = address(&key);
            assert_eq!(address.mSelector, key.selector().code());
            assert_eq!(address.mScope, key.scope().code());
            assert_eq!(address.mElement, 2);
        }
    }

    #[test]
    fn status_mapping() {
        assert_eq!(check(0), Ok(()));
        assert_eq!(check(-50), Err(HalStatus(-50)));
    }
}
