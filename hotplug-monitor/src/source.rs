//! Device event sources
//!
//! A source is subscribed to once, on the dispatch thread, and yields a stream of raw
//! property maps. An `Err` item is the source's asynchronous error signal and ends the
//! subscription; the stream ending does the same.

use std::io;
use std::pin::Pin;

use futures::Stream;
use tokio::sync::mpsc;

use hotplug_device::PropertyMap;

/// Live stream of raw events from a subscription.
///
/// Not `Send`: it is created and polled on the dispatch thread only.
pub type EventStream = Pin<Box<dyn Stream<Item = io::Result<PropertyMap>>>>;

/// Something that can be subscribed to for raw device events.
pub trait EventSource: Send + 'static {
    /// Establish the subscription. Called from inside the dispatch thread's runtime.
    fn subscribe(self: Box<Self>) -> io::Result<EventStream>;
}

/// In-process source fed through a channel.
///
/// Used to drive the dispatch loop from tests or from another event producer.
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<io::Result<PropertyMap>>,
    subscribe_error: Option<io::Error>,
}

/// Feeding end of a [`ChannelSource`].
#[derive(Clone)]
pub struct SourceSender {
    tx: mpsc::UnboundedSender<io::Result<PropertyMap>>,
}

impl ChannelSource {
    pub fn new() -> (Self, SourceSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                rx,
                subscribe_error: None,
            },
            SourceSender { tx },
        )
    }

    /// A source whose subscription always fails with `error`.
    pub fn failing(error: io::Error) -> Self {
        let (mut source, _tx) = Self::new();
        source.subscribe_error = Some(error);
        source
    }
}

impl EventSource for ChannelSource {
    fn subscribe(self: Box<Self>) -> io::Result<EventStream> {
        let ChannelSource {
            mut rx,
            subscribe_error,
        } = *self;

        if let Some(error) = subscribe_error {
            return Err(error);
        }

        Ok(Box::pin(futures::stream::poll_fn(move |cx| rx.poll_recv(cx))))
    }
}

impl SourceSender {
    /// Queue one event. Returns `false` once the subscription is gone.
    pub fn send_event<I, K, V>(&self, properties: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: PropertyMap = properties
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.tx.send(Ok(map)).is_ok()
    }

    /// Raise the source error signal.
    pub fn send_error(&self, error: io::Error) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(target_os = "linux")]
pub use udev::UdevSource;

#[cfg(target_os = "linux")]
mod udev {
    use std::io;

    use futures::StreamExt;
    use tokio_udev::{AsyncMonitorSocket, Event, MonitorBuilder};

    use hotplug_device::properties::ACTION;
    use hotplug_device::PropertyMap;

    use super::{EventSource, EventStream};
    use crate::config::MonitorConfig;

    /// Netlink udev monitor filtered by subsystem and, optionally, tag.
    #[derive(Debug, Clone)]
    pub struct UdevSource {
        subsystems: Vec<String>,
        tag: Option<String>,
    }

    impl UdevSource {
        pub fn new(subsystems: Vec<String>, tag: Option<String>) -> Self {
            Self { subsystems, tag }
        }

        pub fn from_config(config: &MonitorConfig) -> Self {
            Self::new(config.subsystems.clone(), config.tag.clone())
        }
    }

    impl EventSource for UdevSource {
        fn subscribe(self: Box<Self>) -> io::Result<EventStream> {
            let mut builder = MonitorBuilder::new()?;
            for subsystem in &self.subsystems {
                builder = builder.match_subsystem(subsystem)?;
            }
            if let Some(tag) = &self.tag {
                builder = builder.match_tag(tag)?;
            }

            let socket = AsyncMonitorSocket::new(builder.listen()?)?;
            tracing::debug!(
                "Subscribed to udev events for {:?} (tag {:?})",
                self.subsystems,
                self.tag
            );

            Ok(Box::pin(
                socket.map(|event| event.map(|event| event_properties(&event))),
            ))
        }
    }

    fn event_properties(event: &Event) -> PropertyMap {
        let mut properties: PropertyMap = event
            .properties()
            .map(|p| {
                (
                    p.name().to_string_lossy().into_owned(),
                    p.value().to_string_lossy().into_owned(),
                )
            })
            .collect();

        properties
            .entry(ACTION.to_string())
            .or_insert_with(|| event.event_type().to_string());
        properties
    }
}
