//! # Hotplug Device
//!
//! Normalized, immutable view of a single udev hotplug event.
//!
//! A raw udev event carries an unordered, sparse set of string properties. This crate turns
//! that set into a [`DeviceRecord`] whose fields are always present (empty when the source
//! property was missing), derives a display identity from it, and renders the multi-section
//! console summary printed for every dispatched event.
//!
//! ```rust
//! use hotplug_device::DeviceRecord;
//!
//! let record = DeviceRecord::from_properties([
//!     ("ACTION", "add"),
//!     ("ID_VENDOR_FROM_DATABASE", "Acme"),
//!     ("ID_MODEL_FROM_DATABASE", "Widget"),
//! ]);
//!
//! assert_eq!(record.display_name(), "Acme, Widget");
//! assert_eq!(record.display_message(), "USB Device connected: Acme, Widget");
//! ```
//!
//! Everything here is pure: no I/O, no errors. Normalization never fails.

pub mod identity;
pub mod properties;
pub mod record;
pub mod summary;

pub use properties::PropertyMap;
pub use record::{
    DeviceRecord, DevicePaths, EventAction, EventInfo, Identification, StorageInfo, UsbDetails,
};
