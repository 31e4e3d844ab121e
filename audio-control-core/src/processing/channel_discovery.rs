use crate::models::device::DeviceId;
use crate::models::property::{Element, Property};
use crate::traits::property_store::PropertyStore;

/// Default number of missing channels tolerated before probing stops.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Probe `device` for the channels that expose the volume property.
///
/// Walks elements upward from 0, recording every element that has the
/// property. Each missing element counts against `max_failures`; probing
/// stops once that many have been seen. This is a bounded heuristic, not a
/// channel count reported by the hardware: it assumes channels are numbered
/// from 0 with at most `max_failures - 1` gaps.
///
/// Aggregate devices commonly expose no per-channel volume at all, which
/// yields an empty list.
pub fn discover_channels<S>(store: &S, device: DeviceId, max_failures: u32) -> Vec<Element>
where
    S: PropertyStore + ?Sized,
{
    let template = Property::Volume.key();
    let mut channels = Vec::new();
    let mut failures = 0;
    let mut element: Element = 0;

    while failures < max_failures {
        if store.has_property(device, &template.with_element(element)) {
            channels.push(element);
        } else {
            failures += 1;
        }
        element += 1;
    }

    log::debug!(
        "device {}: discovered volume channels {:?} ({} probes)",
        device,
        channels,
        element
    );
    channels
}
