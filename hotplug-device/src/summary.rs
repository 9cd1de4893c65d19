//! Multi-section console report for a dispatched event.
//!
//! A section is shown only when the data it is keyed on is present, and inside a section
//! each line is shown only when its own field is non-empty. Two lines are exempt once their
//! section is shown: `Serial` in Identification and `System Path` in Device Paths.

use std::fmt;

use crate::record::DeviceRecord;

pub const IDENTIFICATION: &str = "Identification";
pub const USB_DETAILS: &str = "USB Details";
pub const DEVICE_PATHS: &str = "Device Paths";
pub const STORAGE_INFORMATION: &str = "Storage Information";

/// One titled block of `label: value` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub rows: Vec<(&'static str, String)>,
}

impl Section {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            rows: Vec::new(),
        }
    }

    fn row(&mut self, label: &'static str, value: impl Into<String>) {
        self.rows.push((label, value.into()));
    }

    fn row_if_present(&mut self, label: &'static str, value: &str) {
        if !value.is_empty() {
            self.row(label, value);
        }
    }

    /// Value of the first row with `label`, if any.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }
}

impl DeviceRecord {
    /// The optional sections of the summary, in display order.
    pub fn summary_sections(&self) -> Vec<Section> {
        let mut sections = Vec::new();
        let id = &self.identification;
        let usb = &self.usb;
        let storage = &self.storage;

        if !id.serial.is_empty() {
            let mut section = Section::new(IDENTIFICATION);
            section.row_if_present("Manufacturer", &id.manufacturer);
            section.row_if_present("Vendor", &id.vendor);
            section.row_if_present("Model", &id.model);
            section.row("Serial", id.serial.as_str());
            sections.push(section);
        }

        if !usb.version.is_empty() || !usb.class.is_empty() {
            let mut section = Section::new(USB_DETAILS);
            section.row_if_present("Version", &usb.version);
            if !usb.class.is_empty() {
                section.row(
                    "Class/Subclass/Protocol",
                    format!("{}/{}/{}", usb.class, usb.subclass, usb.protocol),
                );
            }
            section.row_if_present("Driver", &usb.driver);
            sections.push(section);
        }

        if !self.paths.dev_path.is_empty() {
            let mut section = Section::new(DEVICE_PATHS);
            section.row("System Path", self.paths.dev_path.as_str());
            section.row_if_present("Device Node", &self.paths.dev_node);
            sections.push(section);
        }

        if self.is_partition() || !storage.filesystem.is_empty() {
            let mut section = Section::new(STORAGE_INFORMATION);
            if !storage.size.is_empty() {
                section.row("Size", format!("{} sectors", storage.size));
            }
            section.row_if_present("Disk Size", &storage.disk);
            section.row_if_present("Filesystem", &storage.filesystem);
            sections.push(section);
        }

        sections
    }

    /// Rendered summary, as printed to the output sink.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[(&'static str, String)]) -> fmt::Result {
    let width = rows.iter().map(|(label, _)| label.len() + 1).max().unwrap_or(0);
    for (label, value) in rows {
        let label = format!("{label}:");
        writeln!(f, "{label:<width$}  {value}")?;
    }
    Ok(())
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== {} =====", self.display_message())?;
        write_rows(f, &[("Event Type", self.event.device_type.clone())])?;

        for section in self.summary_sections() {
            writeln!(f)?;
            writeln!(f, "[{}]", section.title)?;
            write_rows(f, &section.rows)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_aligned_within_section() {
        let record = DeviceRecord::from_properties([
            ("ID_SERIAL_SHORT", "S1"),
            ("ID_MANUFACTURER", "Acme Corp"),
        ]);
        let text = record.summary();
        assert!(text.contains("Manufacturer:  Acme Corp\n"));
        assert!(text.contains("Serial:        S1\n"));
    }

    #[test]
    fn test_header_always_present() {
        let text = DeviceRecord::default().summary();
        assert!(text.starts_with("===== USB Device connected:  =====\n"));
        assert!(text.contains("Event Type:  \n"));
    }

    #[test]
    fn test_class_line_includes_empty_parts() {
        let record = DeviceRecord::from_properties([("ID_USB_CLASS_FROM_DATABASE", "Mass Storage")]);
        let sections = record.summary_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, USB_DETAILS);
        assert_eq!(sections[0].get("Class/Subclass/Protocol"), Some("Mass Storage//"));
        assert_eq!(sections[0].get("Version"), None);
    }
}
