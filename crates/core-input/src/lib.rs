//! Raw terminal bytes in, editor commands out.
//!
//! `InputDecoder` turns bytes into `KeyEvent`s; `keymap::command_for` maps
//! keys onto `Command`s. `Dispatcher` glues the two for the runtime loop.

mod decoder;
pub mod keymap;

pub use decoder::{DEFAULT_MAX_PENDING_READS, InputDecoder};
pub use keymap::command_for;

use core_events::{Command, KeyEvent};
use tracing::trace;

#[derive(Debug, Default)]
pub struct Dispatcher {
    decoder: InputDecoder,
}

impl Dispatcher {
    pub fn new(max_pending_reads: usize) -> Self {
        Self {
            decoder: InputDecoder::with_max_pending_reads(max_pending_reads),
        }
    }

    /// Feed one byte read from the terminal.
    pub fn push_byte(&mut self, byte: u8) -> Option<Command> {
        let key = self.decoder.feed(byte)?;
        Self::resolve(key)
    }

    /// Report that a read returned no input within the timeout.
    pub fn on_timeout(&mut self) -> Option<Command> {
        let key = self.decoder.on_timeout()?;
        Self::resolve(key)
    }

    pub fn decoder(&self) -> &InputDecoder {
        &self.decoder
    }

    fn resolve(key: KeyEvent) -> Option<Command> {
        let cmd = command_for(key);
        match cmd {
            Some(cmd) => trace!(target: "input.decode", key = %key, command = cmd.name(), "key"),
            None => trace!(target: "input.decode", key = %key, "unbound_key"),
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing::dispatcher::Dispatch;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::layer::Layer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::Registry;

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedEvent {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct FieldCollector {
        fields: Vec<(String, String)>,
    }

    impl Visit for FieldCollector {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for Capture
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut collector = FieldCollector::default();
            event.record(&mut collector);
            let meta = event.metadata();
            self.events.lock().unwrap().push(CapturedEvent {
                target: meta.target().to_string(),
                fields: collector.fields,
            });
        }
    }

    fn feed_all(d: &mut Dispatcher, bytes: &[u8]) -> Vec<Command> {
        bytes.iter().filter_map(|b| d.push_byte(*b)).collect()
    }

    #[test]
    fn escape_sequences_map_to_commands() {
        let mut d = Dispatcher::default();
        assert_eq!(feed_all(&mut d, b"\x1b[A"), vec![Command::MOVE_UP]);
        assert_eq!(feed_all(&mut d, b"\x1b[3~"), vec![Command::DeleteForward]);
        assert_eq!(
            feed_all(&mut d, b"hi\r"),
            vec![
                Command::InsertChar('h'),
                Command::InsertChar('i'),
                Command::InsertNewline
            ]
        );
    }

    #[test]
    fn lone_escape_then_timeout_is_escape_command() {
        let mut d = Dispatcher::default();
        assert_eq!(d.push_byte(0x1b), None);
        assert_eq!(d.on_timeout(), Some(Command::Escape));
    }

    #[test]
    fn unbound_control_key_is_ignored() {
        let mut d = Dispatcher::default();
        assert_eq!(d.push_byte(0x1a), None);
        assert!(d.decoder().is_idle());
    }

    #[test]
    fn discard_log_names_state_without_payload() {
        let capture = Capture::default();
        let events = capture.events.clone();
        let subscriber = Registry::default().with(capture);
        let dispatch = Dispatch::new(subscriber);

        tracing::dispatcher::with_default(&dispatch, || {
            let mut d = Dispatcher::new(1);
            d.push_byte(0x1b);
            d.push_byte(b'[');
            d.push_byte(b'9');
            d.push_byte(b'7');
            assert_eq!(d.on_timeout(), None);
        });

        let events = events.lock().unwrap();
        let event = events
            .iter()
            .find(|e| {
                e.target == "input.decode"
                    && e.fields
                        .iter()
                        .any(|(_, v)| v.contains("malformed_sequence_discarded"))
            })
            .expect("missing discard event");
        assert!(
            event
                .fields
                .iter()
                .any(|(name, value)| name == "state" && value.contains("csi")),
            "state field missing: {:?}",
            event.fields
        );
        for (_, value) in &event.fields {
            assert!(!value.contains("97"), "event leaked sequence bytes: {value}");
        }
    }
}
