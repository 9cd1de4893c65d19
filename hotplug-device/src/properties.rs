//! udev property names and the total lookup used by the normalizer.

use std::collections::HashMap;

/// Raw udev property set of one event. Keys are unique, order is meaningless.
pub type PropertyMap = HashMap<String, String>;

pub const ID_SERIAL_SHORT: &str = "ID_SERIAL_SHORT";
pub const ID_VENDOR_FROM_DATABASE: &str = "ID_VENDOR_FROM_DATABASE";
pub const ID_VENDOR_ID: &str = "ID_VENDOR_ID";
pub const ID_MODEL_FROM_DATABASE: &str = "ID_MODEL_FROM_DATABASE";
pub const ID_MODEL_ID: &str = "ID_MODEL_ID";
pub const ID_MANUFACTURER: &str = "ID_MANUFACTURER";

pub const ID_USB_VERSION: &str = "ID_USB_VERSION";
pub const ID_USB_CLASS_FROM_DATABASE: &str = "ID_USB_CLASS_FROM_DATABASE";
pub const ID_USB_SUBCLASS_FROM_DATABASE: &str = "ID_USB_SUBCLASS_FROM_DATABASE";
pub const ID_USB_PROTOCOL_FROM_DATABASE: &str = "ID_USB_PROTOCOL_FROM_DATABASE";
pub const DRIVER: &str = "DRIVER";
pub const SPEED: &str = "SPEED";

pub const DEVPATH: &str = "DEVPATH";
pub const DEVNAME: &str = "DEVNAME";

pub const ID_PART_ENTRY_SIZE: &str = "ID_PART_ENTRY_SIZE";
pub const ID_PART_ENTRY_DISK: &str = "ID_PART_ENTRY_DISK";
pub const ID_FS_TYPE: &str = "ID_FS_TYPE";

pub const ACTION: &str = "ACTION";
pub const DEVTYPE: &str = "DEVTYPE";

/// Look up `key`, treating a missing key and an empty value the same way.
///
/// Always returns an owned string; never fails.
pub fn get(properties: &PropertyMap, key: &str) -> String {
    properties
        .get(key)
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default()
}
