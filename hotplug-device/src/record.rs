//! The normalized device record built once per udev event.

use crate::properties::{self as prop, PropertyMap};

/// Who the device says it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identification {
    /// Short serial number (`ID_SERIAL_SHORT`)
    pub serial: String,
    /// Vendor name from the hardware database
    pub vendor: String,
    /// Numeric vendor id, hex text as reported by udev
    pub vendor_id: String,
    /// Model name from the hardware database
    pub model: String,
    /// Numeric model id, hex text as reported by udev
    pub model_id: String,
    /// Manufacturer string read from the device descriptor
    pub manufacturer: String,
}

/// USB interface details. Empty for non-USB events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsbDetails {
    pub version: String,
    pub class: String,
    pub subclass: String,
    pub protocol: String,
    /// Bound kernel driver
    pub driver: String,
    /// Negotiated link speed
    pub speed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePaths {
    /// Kernel device path under `/sys`
    pub dev_path: String,
    /// Device node under `/dev`, if one was created
    pub dev_node: String,
}

/// Block and partition details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageInfo {
    /// Partition size in sectors, kept as the raw text udev reported
    pub size: String,
    /// Parent disk identifier
    pub disk: String,
    /// Filesystem type label
    pub filesystem: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventInfo {
    /// Raw action text (`add`, `remove`, `change`, ...)
    pub action: String,
    /// Device type (`disk`, `partition`, `usb_device`, ...)
    pub device_type: String,
}

/// Lifecycle action of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventAction {
    Add,
    Remove,
    /// Any other action the source emits, including an empty one
    Other(String),
}

impl EventAction {
    pub fn parse(action: &str) -> Self {
        match action {
            "add" => EventAction::Add,
            "remove" => EventAction::Remove,
            other => EventAction::Other(other.to_string()),
        }
    }

    /// Only attach and detach trigger notifications and sounds.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, EventAction::Add | EventAction::Remove)
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventAction::Add => "add",
            EventAction::Remove => "remove",
            EventAction::Other(other) => other,
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of one hotplug event.
///
/// Every field is always present; a property missing from the event (or present with an
/// empty value) leaves the field as the empty string. The record holds no reference to the
/// subscription it came from and can be freely cloned or sent across threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRecord {
    pub identification: Identification,
    pub usb: UsbDetails,
    pub paths: DevicePaths,
    pub storage: StorageInfo,
    pub event: EventInfo,
}

impl DeviceRecord {
    /// Build a record from a raw property map.
    ///
    /// Values are carried verbatim. Unknown properties are ignored.
    pub fn from_property_map(properties: &PropertyMap) -> Self {
        let get = |key: &str| prop::get(properties, key);

        Self {
            identification: Identification {
                serial: get(prop::ID_SERIAL_SHORT),
                vendor: get(prop::ID_VENDOR_FROM_DATABASE),
                vendor_id: get(prop::ID_VENDOR_ID),
                model: get(prop::ID_MODEL_FROM_DATABASE),
                model_id: get(prop::ID_MODEL_ID),
                manufacturer: get(prop::ID_MANUFACTURER),
            },
            usb: UsbDetails {
                version: get(prop::ID_USB_VERSION),
                class: get(prop::ID_USB_CLASS_FROM_DATABASE),
                subclass: get(prop::ID_USB_SUBCLASS_FROM_DATABASE),
                protocol: get(prop::ID_USB_PROTOCOL_FROM_DATABASE),
                driver: get(prop::DRIVER),
                speed: get(prop::SPEED),
            },
            paths: DevicePaths {
                dev_path: get(prop::DEVPATH),
                dev_node: get(prop::DEVNAME),
            },
            storage: StorageInfo {
                size: get(prop::ID_PART_ENTRY_SIZE),
                disk: get(prop::ID_PART_ENTRY_DISK),
                filesystem: get(prop::ID_FS_TYPE),
            },
            event: EventInfo {
                action: get(prop::ACTION),
                device_type: get(prop::DEVTYPE),
            },
        }
    }

    /// Build a record from any sequence of string-like key/value pairs.
    ///
    /// When a key repeats, the last value wins.
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: PropertyMap = properties
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_property_map(&map)
    }

    pub fn action(&self) -> EventAction {
        EventAction::parse(&self.event.action)
    }

    pub fn is_partition(&self) -> bool {
        self.event.device_type == "partition"
    }
}

impl From<&PropertyMap> for DeviceRecord {
    fn from(properties: &PropertyMap) -> Self {
        Self::from_property_map(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map_gives_default_record() {
        let record = DeviceRecord::from_property_map(&PropertyMap::new());
        assert_eq!(record, DeviceRecord::default());
        assert_eq!(record.action(), EventAction::Other(String::new()));
    }

    #[test]
    fn test_values_are_carried_verbatim() {
        let record = DeviceRecord::from_properties([
            ("ID_PART_ENTRY_SIZE", "0x00ff"),
            ("SPEED", " 480 "),
            ("UNRELATED", "ignored"),
        ]);
        assert_eq!(record.storage.size, "0x00ff");
        assert_eq!(record.usb.speed, " 480 ");
    }

    #[test]
    fn test_event_action_parse() {
        assert_eq!(EventAction::parse("add"), EventAction::Add);
        assert_eq!(EventAction::parse("remove"), EventAction::Remove);
        assert_eq!(
            EventAction::parse("change"),
            EventAction::Other("change".to_string())
        );
        assert!(!EventAction::parse("bind").is_dispatchable());
        assert!(EventAction::Remove.is_dispatchable());
        assert_eq!(EventAction::Other("unbind".into()).to_string(), "unbind");
    }

    #[test]
    fn test_record_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeviceRecord>();
    }
}
