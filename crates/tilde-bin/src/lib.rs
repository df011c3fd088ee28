//! Editor runtime loop.
//!
//! Single threaded: read one byte with the bounded timeout, feed the input
//! dispatcher, apply the decoded command, repaint. A read timeout drives the
//! idle work: resolving a lone ESC, expiring the status message and noticing
//! terminal size changes. The loop is generic over `TerminalBackend` so it can
//! run against a scripted terminal.

use anyhow::Result;
use core_actions::dispatch;
use core_config::Settings;
use core_events::Command;
use core_input::Dispatcher;
use core_model::EditorModel;
use core_render::RenderEngine;
use core_state::EditorState;
use core_terminal::{TerminalBackend, TerminalError};
use std::fmt;
use std::io;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Quit command accepted.
    Quit,
    /// The input source ended.
    InputClosed,
}

impl ShutdownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Quit => "quit",
            ShutdownReason::InputClosed => "input_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured shutdown breadcrumb (`begin`, `terminal_restored`, `complete`).
pub fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

pub struct EditorRuntime<T: TerminalBackend> {
    term: T,
    model: EditorModel,
    dispatcher: Dispatcher,
    engine: RenderEngine,
    settings: Settings,
    screen: (u16, u16),
    /// Set by a quit or end of input; checked before every read.
    shutdown: Option<ShutdownReason>,
}

impl<T: TerminalBackend> EditorRuntime<T> {
    /// Size the model to the terminal. Fails when the size cannot be determined.
    pub fn new(mut term: T, state: EditorState, settings: Settings) -> Result<Self> {
        let screen = term.viewport_size()?;
        info!(target: "runtime", rows = screen.0, cols = screen.1, "viewport_initial");
        Ok(Self {
            model: EditorModel::with_screen(state, screen.0, screen.1),
            dispatcher: Dispatcher::new(settings.escape_pending_reads),
            engine: RenderEngine::new(),
            settings,
            screen,
            term,
            shutdown: None,
        })
    }

    pub fn model(&self) -> &EditorModel {
        &self.model
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.term
    }

    pub fn shutdown_reason(&self) -> Option<ShutdownReason> {
        self.shutdown
    }

    pub fn into_terminal(self) -> T {
        self.term
    }

    /// Run until quit or end of input.
    pub fn run(&mut self) -> Result<ShutdownReason> {
        self.render()?;
        loop {
            if let Some(reason) = self.shutdown {
                info!(target: "runtime", reason = reason.as_str(), "loop_exit");
                return Ok(reason);
            }
            self.step()?;
        }
    }

    /// One read and its consequences. A no-op once shutdown was requested.
    pub fn step(&mut self) -> Result<()> {
        if self.shutdown.is_some() {
            return Ok(());
        }
        let byte = match self.term.read_byte() {
            Ok(b) => b,
            Err(TerminalError::Io { source, .. })
                if source.kind() == io::ErrorKind::UnexpectedEof =>
            {
                self.shutdown = Some(ShutdownReason::InputClosed);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        match byte {
            Some(b) => {
                if let Some(cmd) = self.dispatcher.push_byte(b) {
                    self.apply(cmd)?;
                }
            }
            None => {
                if let Some(cmd) = self.dispatcher.on_timeout() {
                    self.apply(cmd)?;
                }
                if self.shutdown.is_none() {
                    self.idle()?;
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, cmd: Command) -> Result<()> {
        let result = dispatch(cmd, &mut self.model, &self.settings);
        if result.quit {
            self.shutdown = Some(ShutdownReason::Quit);
            return Ok(());
        }
        if result.invalidate {
            self.engine.invalidate();
        }
        if result.dirty {
            self.render()?;
        }
        Ok(())
    }

    /// Timeout housekeeping: status expiry and resize detection.
    fn idle(&mut self) -> Result<()> {
        let mut repaint = self.model.state_mut().tick_ephemeral();
        let size = self.term.viewport_size()?;
        if size != self.screen {
            debug!(
                target: "runtime",
                rows = size.0,
                cols = size.1,
                "viewport_resized"
            );
            self.screen = size;
            self.model.resize_screen(size.0, size.1);
            self.engine.invalidate();
            repaint = true;
        }
        if repaint {
            self.render()?;
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let bytes = self.engine.render(&self.model)?;
        trace!(target: "runtime", bytes = bytes.len(), "flush");
        self.term.write_all(&bytes)?;
        Ok(())
    }
}
