//! Human-readable identity derived from a [`DeviceRecord`].

use crate::record::{DeviceRecord, EventAction};

/// Prefix of the synthetic label used when only the numeric vendor id is known.
pub const VENDOR_ID_PREFIX: &str = "Vendor ";

pub const CONNECTED_PREFIX: &str = "USB Device connected: ";
pub const DISCONNECTED_MESSAGE: &str = "USB Device disconnected";

pub const CONNECTED_TITLE: &str = "USB Connected";
pub const DISCONNECTED_TITLE: &str = "USB Disconnected";

impl DeviceRecord {
    /// Display name with a fixed fallback chain.
    ///
    /// Manufacturer wins over vendor; the model is appended regardless of which of the two
    /// was used. With neither, a known vendor id yields `"Vendor <id>"`. Otherwise the name
    /// is empty, which callers must accept as a valid result.
    pub fn display_name(&self) -> String {
        let id = &self.identification;
        let mut parts: Vec<String> = Vec::with_capacity(2);

        if !id.manufacturer.is_empty() {
            parts.push(id.manufacturer.clone());
        } else if !id.vendor.is_empty() {
            parts.push(id.vendor.clone());
        }

        if !id.model.is_empty() {
            parts.push(id.model.clone());
        }

        if parts.is_empty() && !id.vendor_id.is_empty() {
            parts.push(format!("{VENDOR_ID_PREFIX}{}", id.vendor_id));
        }

        parts.join(", ")
    }

    /// One-line message for the event.
    ///
    /// Removed devices usually lost their enumerable properties by the time the event is
    /// delivered, so the disconnect message does not mention the device.
    pub fn display_message(&self) -> String {
        match self.action() {
            EventAction::Remove => DISCONNECTED_MESSAGE.to_string(),
            _ => format!("{CONNECTED_PREFIX}{}", self.display_name()),
        }
    }

    /// Title used for the desktop notification.
    pub fn notification_title(&self) -> &'static str {
        match self.action() {
            EventAction::Remove => DISCONNECTED_TITLE,
            _ => CONNECTED_TITLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_has_empty_name() {
        let record = DeviceRecord::default();
        assert_eq!(record.display_name(), "");
        assert_eq!(record.display_message(), "USB Device connected: ");
    }

    #[test]
    fn test_notification_title() {
        let add = DeviceRecord::from_properties([("ACTION", "add")]);
        let remove = DeviceRecord::from_properties([("ACTION", "remove")]);
        assert_eq!(add.notification_title(), "USB Connected");
        assert_eq!(remove.notification_title(), "USB Disconnected");
    }
}
