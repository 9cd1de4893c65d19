//! # Hotplug Actions
//!
//! Side effects fired for a hotplug event, and the selection of the sound each one plays.
//!
//! - [`ResourceSelector`] resolves which sound file to play: a local file in the working
//!   directory, then a user override, then the sound bundled into the binary.
//! - [`Notifier`] / [`DesktopNotifier`] shows a desktop notification.
//! - [`SoundPlayer`] / [`AudioPlayer`] decodes a WAV cue and plays it on the default output.
//!
//! Every action failure is an [`ActionError`] value; nothing here panics or aborts the
//! caller's event loop.
//!
//! ```rust,no_run
//! use hotplug_actions::{AudioPlayer, ResourceSelector, SoundKind, SoundPlayer};
//!
//! let selector = ResourceSelector::default();
//! let sound = selector.select_sound(SoundKind::Connect, None);
//! if let Err(e) = AudioPlayer::new().play(&sound) {
//!     eprintln!("Error playing sound {}: {}", sound, e);
//! }
//! ```

pub mod assets;
pub mod audio;
pub mod error;
pub mod notify;
pub mod resource;

pub use audio::{effective_sample_rate, AudioPlayer, PcmClip, SoundPlayer};
pub use error::{ActionError, Result};
pub use notify::{DesktopNotifier, Notifier};
pub use resource::{ResolvedResource, ResourceSelector, SoundKind};

#[cfg(any(test, feature = "test-support"))]
pub use audio::MockSoundPlayer;
#[cfg(any(test, feature = "test-support"))]
pub use notify::MockNotifier;
