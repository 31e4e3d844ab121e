use std::sync::Arc;

use crate::models::device::DeviceId;
use crate::models::error::HalStatus;
use crate::models::property::PropertyKey;

/// A fixed-size value read from or written to a single property element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Float32(f32),
    UInt32(u32),
}

/// Scalar types the fan-out accessor can carry.
pub trait PropertyScalar: Copy + Send + Sync + 'static {
    fn into_scalar(self) -> ScalarValue;

    /// `None` if the store handed back a different scalar type.
    fn from_scalar(value: ScalarValue) -> Option<Self>;
}

impl PropertyScalar for f32 {
    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Float32(self)
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Float32(v) => Some(v),
            ScalarValue::UInt32(_) => None,
        }
    }
}

impl PropertyScalar for u32 {
    fn into_scalar(self) -> ScalarValue {
        ScalarValue::UInt32(self)
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::UInt32(v) => Some(v),
            ScalarValue::Float32(_) => None,
        }
    }
}

/// The audio hardware property service.
///
/// Every call is a blocking, uncached round trip keyed by
/// (object, selector, scope, element). Implemented by:
/// - `CoreAudioPropertyStore` (macOS)
/// - [`MemoryPropertyStore`](crate::storage::memory_store::MemoryPropertyStore) (in-process fake)
pub trait PropertyStore: Send + Sync {
    /// Whether `object` exposes the property at this exact element.
    fn has_property(&self, object: DeviceId, key: &PropertyKey) -> bool;

    /// Byte size of the property's current value.
    fn data_size(&self, object: DeviceId, key: &PropertyKey) -> Result<u32, HalStatus>;

    fn get_scalar(&self, object: DeviceId, key: &PropertyKey) -> Result<ScalarValue, HalStatus>;

    fn set_scalar(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        value: ScalarValue,
    ) -> Result<(), HalStatus>;

    fn get_string(&self, object: DeviceId, key: &PropertyKey) -> Result<String, HalStatus>;

    /// Reads an object-id array property, fetching at most `capacity` ids.
    fn get_object_list(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        capacity: usize,
    ) -> Result<Vec<DeviceId>, HalStatus>;
}

impl<S: PropertyStore + ?Sized> PropertyStore for &S {
    fn has_property(&self, object: DeviceId, key: &PropertyKey) -> bool {
        (**self).has_property(object, key)
    }

    fn data_size(&self, object: DeviceId, key: &PropertyKey) -> Result<u32, HalStatus> {
        (**self).data_size(object, key)
    }

    fn get_scalar(&self, object: DeviceId, key: &PropertyKey) -> Result<ScalarValue, HalStatus> {
        (**self).get_scalar(object, key)
    }

    fn set_scalar(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        value: ScalarValue,
    ) -> Result<(), HalStatus> {
        (**self).set_scalar(object, key, value)
    }

    fn get_string(&self, object: DeviceId, key: &PropertyKey) -> Result<String, HalStatus> {
        (**self).get_string(object, key)
    }

    fn get_object_list(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        capacity: usize,
    ) -> Result<Vec<DeviceId>, HalStatus> {
        (**self).get_object_list(object, key, capacity)
    }
}

impl<S: PropertyStore + ?Sized> PropertyStore for Arc<S> {
    fn has_property(&self, object: DeviceId, key: &PropertyKey) -> bool {
        (**self).has_property(object, key)
    }

    fn data_size(&self, object: DeviceId, key: &PropertyKey) -> Result<u32, HalStatus> {
        (**self).data_size(object, key)
    }

    fn get_scalar(&self, object: DeviceId, key: &PropertyKey) -> Result<ScalarValue, HalStatus> {
        (**self).get_scalar(object, key)
    }

    fn set_scalar(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        value: ScalarValue,
    ) -> Result<(), HalStatus> {
        (**self).set_scalar(object, key, value)
    }

    fn get_string(&self, object: DeviceId, key: &PropertyKey) -> Result<String, HalStatus> {
        (**self).get_string(object, key)
    }

    fn get_object_list(
        &self,
        object: DeviceId,
        key: &PropertyKey,
        capacity: usize,
    ) -> Result<Vec<DeviceId>, HalStatus> {
        (**self).get_object_list(object, key, capacity)
    }
}
