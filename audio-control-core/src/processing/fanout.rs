//! Fan-out property access: the same read or write applied to a set of
//! channels, with an all-or-nothing aggregate outcome.

use crate::models::config::ChannelFallback;
use crate::models::device::DeviceId;
use crate::models::error::{ControlError, HalStatus};
use crate::models::property::{Element, Property, PropertyKey};
use crate::traits::property_store::{PropertyScalar, PropertyStore};

/// Result of one hardware call within a fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelOutcome<T> {
    pub element: Element,
    pub result: Result<T, HalStatus>,
}

/// Per-channel outcomes of a single fan-out, in channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct FanOutReport<T> {
    device: DeviceId,
    property: Property,
    outcomes: Vec<ChannelOutcome<T>>,
}

impl<T> FanOutReport<T> {
    pub fn outcomes(&self) -> &[ChannelOutcome<T>] {
        &self.outcomes
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// True only if at least one channel was addressed and none failed.
    pub fn all_succeeded(&self) -> bool {
        !self.outcomes.is_empty() && self.failed() == 0
    }

    /// Collapse the report under the all-or-nothing policy.
    ///
    /// Any failed channel fails the whole call and no values are returned.
    /// An empty channel set is a failure too: there is nothing to report.
    pub fn into_all_or_nothing(self) -> Result<Vec<T>, ControlError> {
        let total = self.outcomes.len();
        let failed = self.failed();

        if total == 0 {
            return Err(ControlError::NoChannels(self.property));
        }
        if failed > 0 {
            log::debug!(
                "device {}: {} failed on {}/{} channels",
                self.device,
                self.property,
                failed,
                total
            );
            if total == 1 {
                let status = self
                    .outcomes
                    .into_iter()
                    .find_map(|o| o.result.err())
                    .unwrap_or(HalStatus::UNSPECIFIED);
                return Err(ControlError::Hardware {
                    device: self.device,
                    property: self.property,
                    status,
                });
            }
            return Err(ControlError::ChannelFanOut {
                property: self.property,
                failed,
                total,
            });
        }

        Ok(self
            .outcomes
            .into_iter()
            .filter_map(|o| o.result.ok())
            .collect())
    }
}

/// Read `key` on every channel, one hardware call each.
pub fn read_channels<T, S>(
    store: &S,
    device: DeviceId,
    key: PropertyKey,
    channels: &[Element],
) -> FanOutReport<T>
where
    T: PropertyScalar,
    S: PropertyStore + ?Sized,
{
    let outcomes = channels
        .iter()
        .map(|&element| {
            let result = store
                .get_scalar(device, &key.with_element(element))
                .and_then(|raw| T::from_scalar(raw).ok_or(HalStatus::BAD_PROPERTY_SIZE));
            ChannelOutcome { element, result }
        })
        .collect();

    FanOutReport {
        device,
        property: key.property(),
        outcomes,
    }
}

/// Write `value` to every channel, one hardware call each.
pub fn write_channels<T, S>(
    store: &S,
    device: DeviceId,
    value: T,
    key: PropertyKey,
    channels: &[Element],
) -> FanOutReport<()>
where
    T: PropertyScalar,
    S: PropertyStore + ?Sized,
{
    let outcomes = channels
        .iter()
        .map(|&element| ChannelOutcome {
            element,
            result: store.set_scalar(device, &key.with_element(element), value.into_scalar()),
        })
        .collect();

    FanOutReport {
        device,
        property: key.property(),
        outcomes,
    }
}

/// Read `key` across `channels`; all channels must succeed.
pub fn get_property<T, S>(
    store: &S,
    device: DeviceId,
    key: PropertyKey,
    channels: &[Element],
) -> Result<Vec<T>, ControlError>
where
    T: PropertyScalar,
    S: PropertyStore + ?Sized,
{
    read_channels(store, device, key, channels).into_all_or_nothing()
}

/// Write `value` to `key` across `channels`; all channels must succeed.
pub fn set_property<T, S>(
    store: &S,
    device: DeviceId,
    value: T,
    key: PropertyKey,
    channels: &[Element],
) -> Result<(), ControlError>
where
    T: PropertyScalar,
    S: PropertyStore + ?Sized,
{
    write_channels(store, device, value, key, channels)
        .into_all_or_nothing()
        .map(|_| ())
}

/// Run `op` over `channels`, retrying once on the fallback element if the
/// aggregate outcome is a failure.
///
/// The retry is never per channel: it fires only after the whole fan-out has
/// failed, and its own result is final.
pub fn with_fallback<R, F>(
    fallback: ChannelFallback,
    channels: &[Element],
    mut op: F,
) -> Result<R, ControlError>
where
    F: FnMut(&[Element]) -> Result<R, ControlError>,
{
    match op(channels) {
        Ok(value) => Ok(value),
        Err(err) => match fallback {
            ChannelFallback::Disabled => Err(err),
            ChannelFallback::Element(element) => {
                log::warn!(
                    "fan-out over channels {:?} failed ({}), retrying on channel {}",
                    channels,
                    err,
                    element
                );
                op(&[element])
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_store::MemoryPropertyStore;
    use crate::traits::property_store::ScalarValue;

    const DEVICE: DeviceId = DeviceId(80);

    fn stereo_store() -> MemoryPropertyStore {
        let store = MemoryPropertyStore::new();
        store.set_volume(DEVICE, 1, 0.25);
        store.set_volume(DEVICE, 2, 0.75);
        store.set_mute(DEVICE, 1, false);
        store.set_mute(DEVICE, 2, true);
        store
    }

    #[test]
    fn reads_every_channel_in_order() {
        let store = stereo_store();
        let values: Vec<f32> =
            get_property(&store, DEVICE, Property::Volume.key(), &[1, 2]).unwrap();
        assert_eq!(values, vec![0.25, 0.75]);
        assert_eq!(store.call_count(), 2);
    }

    #[test]
    fn writes_the_same_value_to_every_channel() {
        let store = stereo_store();
        set_property(&store, DEVICE, 0.5f32, Property::Volume.key(), &[1, 2]).unwrap();

        assert_eq!(store.scalar(DEVICE, Property::Volume, 1), Some(ScalarValue::Float32(0.5)));
        assert_eq!(store.scalar(DEVICE, Property::Volume, 2), Some(ScalarValue::Float32(0.5)));
    }

    #[test]
    fn one_failed_read_hides_every_value() {
        let store = stereo_store();
        store.fail_reads(DEVICE, Property::Volume, Some(2));

        let report = read_channels::<f32, _>(&store, DEVICE, Property::Volume.key(), &[1, 2]);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_succeeded());
        assert_eq!(report.outcomes()[0].result, Ok(0.25));
        assert_eq!(
            report.into_all_or_nothing(),
            Err(ControlError::ChannelFanOut {
                property: Property::Volume,
                failed: 1,
                total: 2,
            })
        );
    }

    #[test]
    fn one_failed_write_fails_the_call_but_still_attempts_every_channel() {
        let store = stereo_store();
        store.fail_writes(DEVICE, Property::Mute, Some(1));

        let result = set_property(&store, DEVICE, 1u32, Property::Mute.key(), &[1, 2]);
        assert!(result.is_err());
        assert_eq!(store.call_count(), 2);
    }

    #[test]
    fn single_channel_failure_reports_hardware_status() {
        let store = stereo_store();
        let result = get_property::<f32, _>(&store, DEVICE, Property::Volume.key(), &[0]);
        assert_eq!(
            result,
            Err(ControlError::Hardware {
                device: DEVICE,
                property: Property::Volume,
                status: HalStatus::UNKNOWN_PROPERTY,
            })
        );
    }

    #[test]
    fn empty_channel_set_is_a_failure() {
        let store = stereo_store();
        assert_eq!(
            set_property(&store, DEVICE, 0.5f32, Property::Volume.key(), &[]),
            Err(ControlError::NoChannels(Property::Volume))
        );
        assert_eq!(store.call_count(), 0);
    }

    #[test]
    fn wrong_scalar_type_counts_as_channel_failure() {
        let store = stereo_store();
        let report = read_channels::<f32, _>(&store, DEVICE, Property::Mute.key(), &[1]);
        assert_eq!(report.outcomes()[0].result, Err(HalStatus::BAD_PROPERTY_SIZE));
    }

    #[test]
    fn fallback_not_used_when_fan_out_succeeds() {
        let mut attempts = Vec::new();
        let result = with_fallback(ChannelFallback::Element(0), &[1, 2], |channels| {
            attempts.push(channels.to_vec());
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(attempts, vec![vec![1, 2]]);
    }

    #[test]
    fn fallback_retries_once_on_the_fallback_element() {
        let mut attempts = Vec::new();
        let result: Result<(), _> = with_fallback(ChannelFallback::Element(0), &[1, 2], |channels| {
            attempts.push(channels.to_vec());
            Err(ControlError::NoChannels(Property::Mute))
        });
        assert!(result.is_err());
        assert_eq!(attempts, vec![vec![1, 2], vec![0]]);
    }

    #[test]
    fn disabled_fallback_returns_the_fan_out_error() {
        let mut attempts = 0;
        let result: Result<(), _> = with_fallback(ChannelFallback::Disabled, &[1, 2], |_| {
            attempts += 1;
            Err(ControlError::NoChannels(Property::Mute))
        });
        assert_eq!(result, Err(ControlError::NoChannels(Property::Mute)));
        assert_eq!(attempts, 1);
    }
}
