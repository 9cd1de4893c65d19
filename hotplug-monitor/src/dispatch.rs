//! Per-event action selection
//!
//! The dispatcher decides what a normalized event triggers: a console summary, a desktop
//! notification and an audio cue, in that order. Only `add` and `remove` events trigger
//! anything. Action failures are logged and never escalate.

use std::io::Write;
use std::path::PathBuf;

use hotplug_actions::{
    AudioPlayer, DesktopNotifier, Notifier, ResolvedResource, ResourceSelector, SoundKind,
    SoundPlayer,
};
use hotplug_device::{DeviceRecord, EventAction};

use crate::config::MonitorConfig;

/// What the dispatcher did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Not an attach/detach event; nothing was fired
    Ignored,
    /// Summary written and enabled actions invoked
    Handled {
        /// Sound handed to the player, when sound is enabled
        sound: Option<ResolvedResource>,
    },
}

impl Dispatch {
    pub fn is_handled(&self) -> bool {
        matches!(self, Dispatch::Handled { .. })
    }
}

/// Runs the side effects for each event.
pub struct Dispatcher {
    sink: Box<dyn Write + Send>,
    notifier: Option<Box<dyn Notifier>>,
    player: Option<Box<dyn SoundPlayer>>,
    selector: ResourceSelector,
    connect_sound: Option<PathBuf>,
    disconnect_sound: Option<PathBuf>,
}

impl Dispatcher {
    /// Dispatcher writing summaries to `sink`, with no actions enabled.
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            notifier: None,
            player: None,
            selector: ResourceSelector::default(),
            connect_sound: None,
            disconnect_sound: None,
        }
    }

    /// Standard dispatcher: summaries to stdout, desktop notifications and audio cues as
    /// enabled in `config`.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let mut dispatcher = Self::new(std::io::stdout()).with_sounds(
            config.connect_sound.clone(),
            config.disconnect_sound.clone(),
        );
        if config.notifications {
            dispatcher = dispatcher.with_notifier(DesktopNotifier::default());
        }
        if config.sound {
            dispatcher = dispatcher.with_player(AudioPlayer::new());
        }
        dispatcher
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn with_player(mut self, player: impl SoundPlayer + 'static) -> Self {
        self.player = Some(Box::new(player));
        self
    }

    pub fn with_selector(mut self, selector: ResourceSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_sounds(mut self, connect: Option<PathBuf>, disconnect: Option<PathBuf>) -> Self {
        self.connect_sound = connect;
        self.disconnect_sound = disconnect;
        self
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    pub fn sound_enabled(&self) -> bool {
        self.player.is_some()
    }

    /// Fire everything `record` calls for.
    pub fn handle(&mut self, record: &DeviceRecord) -> Dispatch {
        let kind = match record.action() {
            EventAction::Add => SoundKind::Connect,
            EventAction::Remove => SoundKind::Disconnect,
            EventAction::Other(action) => {
                tracing::trace!("Ignoring {:?} event for {}", action, record.paths.dev_path);
                return Dispatch::Ignored;
            }
        };

        self.write_summary(record);

        if let Some(notifier) = &self.notifier {
            let name = record.display_name();
            if let Err(e) = notifier.notify(record.notification_title(), &name) {
                tracing::warn!("Error showing notification: {}", e);
            }
        }

        let sound = self.player.as_ref().map(|player| {
            let user_override = match kind {
                SoundKind::Connect => self.connect_sound.as_deref(),
                SoundKind::Disconnect => self.disconnect_sound.as_deref(),
            };
            let sound = self.selector.select_sound(kind, user_override);
            if let Err(e) = player.play(&sound) {
                tracing::warn!("Error playing sound {}: {}", sound, e);
            }
            sound
        });

        Dispatch::Handled { sound }
    }

    fn write_summary(&mut self, record: &DeviceRecord) {
        let result = writeln!(self.sink, "{}", record).and_then(|_| self.sink.flush());
        if let Err(e) = result {
            tracing::warn!("Failed to write event summary: {}", e);
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("notifications", &self.notifications_enabled())
            .field("sound", &self.sound_enabled())
            .field("selector", &self.selector)
            .field("connect_sound", &self.connect_sound)
            .field("disconnect_sound", &self.disconnect_sound)
            .finish()
    }
}
