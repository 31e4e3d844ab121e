//! Registry of the hardware properties this crate knows how to address.
//!
//! Callers never build raw (selector, scope, element) triples. They pick a
//! [`Property`] and get a [`PropertyKey`] template from it; the element is
//! the only field that varies per call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Channel index within a property scope.
pub type Element = u32;

/// `kAudioObjectPropertyElementMain`.
pub const ELEMENT_MAIN: Element = 0;

const fn four_cc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

/// Hardware property selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertySelector {
    VolumeScalar,
    Mute,
    DefaultOutputDevice,
    Devices,
    DeviceName,
    DeviceManufacturer,
    DeviceUid,
    Streams,
}

impl PropertySelector {
    pub const fn code(self) -> u32 {
        match self {
            Self::VolumeScalar => four_cc(b"volm"),
            Self::Mute => four_cc(b"mute"),
            Self::DefaultOutputDevice => four_cc(b"dOut"),
            Self::Devices => four_cc(b"dev#"),
            Self::DeviceName => four_cc(b"lnam"),
            Self::DeviceManufacturer => four_cc(b"lmak"),
            Self::DeviceUid => four_cc(b"uid "),
            Self::Streams => four_cc(b"stm#"),
        }
    }
}

/// Property scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyScope {
    Global,
    Input,
    Output,
}

impl PropertyScope {
    pub const fn code(self) -> u32 {
        match self {
            Self::Global => four_cc(b"glob"),
            Self::Input => four_cc(b"inpt"),
            Self::Output => four_cc(b"outp"),
        }
    }
}

/// Shape of the data a property carries across the hardware boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValueKind {
    Float32,
    UInt32,
    String,
    /// Array of object ids; its byte size divided by the id size is the count.
    ObjectList,
}

/// Semantic property identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Volume,
    Mute,
    Name,
    Manufacturer,
    Uid,
    InputStreams,
    OutputStreams,
    Devices,
    DefaultOutputDevice,
}

impl Property {
    pub const ALL: [Property; 9] = [
        Property::Volume,
        Property::Mute,
        Property::Name,
        Property::Manufacturer,
        Property::Uid,
        Property::InputStreams,
        Property::OutputStreams,
        Property::Devices,
        Property::DefaultOutputDevice,
    ];

    pub const fn selector(self) -> PropertySelector {
        match self {
            Self::Volume => PropertySelector::VolumeScalar,
            Self::Mute => PropertySelector::Mute,
            Self::Name => PropertySelector::DeviceName,
            Self::Manufacturer => PropertySelector::DeviceManufacturer,
            Self::Uid => PropertySelector::DeviceUid,
            Self::InputStreams | Self::OutputStreams => PropertySelector::Streams,
            Self::Devices => PropertySelector::Devices,
            Self::DefaultOutputDevice => PropertySelector::DefaultOutputDevice,
        }
    }

    pub const fn scope(self) -> PropertyScope {
        match self {
            Self::Volume | Self::Mute | Self::Uid | Self::OutputStreams => PropertyScope::Output,
            Self::InputStreams => PropertyScope::Input,
            Self::Name | Self::Manufacturer | Self::Devices | Self::DefaultOutputDevice => {
                PropertyScope::Global
            }
        }
    }

    pub const fn value_kind(self) -> PropertyValueKind {
        match self {
            Self::Volume => PropertyValueKind::Float32,
            Self::Mute | Self::DefaultOutputDevice => PropertyValueKind::UInt32,
            Self::Name | Self::Manufacturer | Self::Uid => PropertyValueKind::String,
            Self::InputStreams | Self::OutputStreams | Self::Devices => {
                PropertyValueKind::ObjectList
            }
        }
    }

    /// Template key addressing the main element.
    pub const fn key(self) -> PropertyKey {
        PropertyKey {
            property: self,
            element: ELEMENT_MAIN,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Volume => "volume",
            Self::Mute => "mute",
            Self::Name => "name",
            Self::Manufacturer => "manufacturer",
            Self::Uid => "uid",
            Self::InputStreams => "input streams",
            Self::OutputStreams => "output streams",
            Self::Devices => "device list",
            Self::DefaultOutputDevice => "default output device",
        };
        f.write_str(name)
    }
}

/// Fully resolved property address: a registry entry plus an element.
///
/// `Copy`, so per-channel calls work on their own copy via
/// [`with_element`](Self::with_element) and the template is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    property: Property,
    element: Element,
}

impl PropertyKey {
    pub const fn with_element(self, element: Element) -> Self {
        Self {
            property: self.property,
            element,
        }
    }

    pub const fn property(&self) -> Property {
        self.property
    }

    pub const fn selector(&self) -> PropertySelector {
        self.property.selector()
    }

    pub const fn scope(&self) -> PropertyScope {
        self.property.scope()
    }

    pub const fn element(&self) -> Element {
        self.element
    }
}

impl From<Property> for PropertyKey {
    fn from(property: Property) -> Self {
        property.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_codes_match_core_audio() {
        assert_eq!(PropertySelector::VolumeScalar.code(), 1987013741);
        assert_eq!(PropertySelector::Mute.code(), 1836414053);
        assert_eq!(PropertySelector::DefaultOutputDevice.code(), 1682929012);
        assert_eq!(PropertySelector::Devices.code(), 1684370979);
        assert_eq!(PropertySelector::DeviceName.code(), 1819173229);
        assert_eq!(PropertySelector::DeviceUid.code(), 1969841184);
        assert_eq!(PropertySelector::Streams.code(), 1937009955);
    }

    #[test]
    fn scope_codes_match_core_audio() {
        assert_eq!(PropertyScope::Global.code(), 1735159650);
        assert_eq!(PropertyScope::Input.code(), 1768845428);
        assert_eq!(PropertyScope::Output.code(), 1869968496);
    }

    #[test]
    fn stream_properties_share_selector_but_not_scope() {
        assert_eq!(
            Property::InputStreams.selector(),
            Property::OutputStreams.selector()
        );
        assert_eq!(Property::InputStreams.scope(), PropertyScope::Input);
        assert_eq!(Property::OutputStreams.scope(), PropertyScope::Output);
    }

    #[test]
    fn with_element_leaves_template_untouched() {
        let template = Property::Volume.key();
        let channel_two = template.with_element(2);

        assert_eq!(template.element(), ELEMENT_MAIN);
        assert_eq!(channel_two.element(), 2);
        assert_eq!(channel_two.property(), Property::Volume);
        assert_eq!(channel_two.scope(), PropertyScope::Output);
    }

    #[test]
    fn every_property_has_a_main_element_template() {
        for property in Property::ALL {
            let key = property.key();
            assert_eq!(key.element(), ELEMENT_MAIN);
            assert_eq!(key.property(), property);
        }
    }
}
