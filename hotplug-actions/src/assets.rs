//! Sounds compiled into the binary.
//!
//! The table is a static slice: initialised at compile time, never mutated, looked up by
//! logical identifier.

pub const CONNECT: &str = "sounds/connect.wav";
pub const DISCONNECT: &str = "sounds/disconnect.wav";

static BUNDLED: &[(&str, &[u8])] = &[
    (CONNECT, include_bytes!("../sounds/connect.wav")),
    (DISCONNECT, include_bytes!("../sounds/disconnect.wav")),
];

/// Bytes of the bundled asset `id`, if there is one.
pub fn bundled(id: &str) -> Option<&'static [u8]> {
    BUNDLED
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, data)| *data)
}

/// Identifiers of every bundled asset.
pub fn identifiers() -> impl Iterator<Item = &'static str> {
    BUNDLED.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_lookup() {
        assert!(bundled(CONNECT).is_some());
        assert!(bundled(DISCONNECT).is_some());
        assert!(bundled("sounds/missing.wav").is_none());
        assert_eq!(identifiers().count(), 2);
    }

    #[test]
    fn test_bundled_assets_are_wav() {
        for id in identifiers() {
            let data = bundled(id).unwrap();
            assert_eq!(&data[0..4], b"RIFF", "{id}");
            assert_eq!(&data[8..12], b"WAVE", "{id}");
        }
    }
}
