//! Application controller
//!
//! Owns the board and processes commands from every front end through a
//! single crossbeam channel. After each command a fresh [`AppSnapshot`] goes
//! to the snapshot sink.

use std::borrow::Cow;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use bento::config::transitions;
use bento::{Board, KeyValueStore};

use super::state::{AppCommand, AppSnapshot};
use crate::error::Result;

pub struct AppController<S: KeyValueStore> {
    board: Board<S>,
    cmd_rx: Receiver<AppCommand>,
    cmd_tx: Sender<AppCommand>,
    snapshot_tx: Sender<AppSnapshot>,
    /// Bumped on every switch request; timers carrying an older value are stale
    switch_generation: u64,
    pending_switch: Option<String>,
    switch_delay: Duration,
    last_error: Option<String>,
    status_text: Cow<'static, str>,
}

impl<S: KeyValueStore> AppController<S> {
    pub fn new(
        board: Board<S>,
        cmd_rx: Receiver<AppCommand>,
        cmd_tx: Sender<AppCommand>,
        snapshot_tx: Sender<AppSnapshot>,
    ) -> Self {
        Self {
            board,
            cmd_rx,
            cmd_tx,
            snapshot_tx,
            switch_generation: 0,
            pending_switch: None,
            switch_delay: Duration::from_millis(transitions::SWITCH_DELAY_MS),
            last_error: None,
            status_text: Cow::Borrowed("Ready"),
        }
    }

    /// Override the transition delay
    pub fn with_switch_delay(mut self, delay: Duration) -> Self {
        self.switch_delay = delay;
        self
    }

    pub fn board(&self) -> &Board<S> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<S> {
        &mut self.board
    }

    pub fn into_board(self) -> Board<S> {
        self.board
    }

    /// Dashboard a deferred switch will load, if one is waiting
    pub fn pending_switch(&self) -> Option<&str> {
        self.pending_switch.as_deref()
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            board: self.board.snapshot(),
            is_transitioning: self.pending_switch.is_some(),
            pending_switch: self.pending_switch.clone(),
            last_error: self.last_error.clone(),
            status_text: self.status_text.clone(),
        }
    }

    /// Run the controller event loop (blocking, call from a dedicated thread)
    ///
    /// A switch still pending when the loop ends is applied before returning.
    pub fn run(&mut self) {
        self.publish();

        loop {
            match self.cmd_rx.recv_timeout(Duration::from_millis(50)) {
                Ok(cmd) => {
                    if self.handle_command(cmd) {
                        break;
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }
        }

        if let Err(e) = self.finish_pending() {
            tracing::error!(error = %e, "Failed to apply pending switch on shutdown");
        }
    }

    /// Handle a single command and publish. Returns true if the loop should exit.
    pub fn handle_command(&mut self, cmd: AppCommand) -> bool {
        if matches!(cmd, AppCommand::Shutdown) {
            return true;
        }

        tracing::debug!(?cmd, "Handling command");
        self.status_text = Cow::Borrowed("Ready");
        self.last_error = None;
        match self.apply(cmd) {
            Ok(()) => {
                if self.pending_switch.is_some() {
                    self.status_text = Cow::Borrowed("Switching...");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Command failed");
                self.status_text = format!("Error: {e}").into();
                self.last_error = Some(e.to_string());
            }
        }
        self.publish();
        false
    }

    /// Apply a waiting switch now instead of after the delay
    ///
    /// Returns true if the active dashboard changed. A timer that fires
    /// afterwards finds nothing pending and does nothing.
    pub fn finish_pending(&mut self) -> Result<bool> {
        let Some(id) = self.pending_switch.take() else {
            return Ok(false);
        };
        let switched = self.board.switch_dashboard(&id)?;
        if !switched {
            tracing::warn!(id = %id, "Switch target no longer exists");
        }
        Ok(switched)
    }

    fn apply(&mut self, cmd: AppCommand) -> Result<()> {
        match cmd {
            AppCommand::Shutdown => {}

            AppCommand::AddDashboard(name) => {
                // A direct switch supersedes any waiting one
                if self.board.add_dashboard(&name)?.is_some() {
                    self.cancel_pending();
                }
            }
            AppCommand::RenameDashboard { id, name } => {
                self.board.rename_dashboard(&id, &name)?;
            }
            AppCommand::DeleteDashboard(id) => {
                self.board.delete_dashboard(&id)?;
            }
            AppCommand::SwitchDashboard(id) => {
                self.request_switch(id);
            }
            AppCommand::InternalSwitchDue { generation } => {
                if generation != self.switch_generation {
                    tracing::debug!(
                        generation,
                        current = self.switch_generation,
                        "Discarding stale switch"
                    );
                    return Ok(());
                }
                self.finish_pending()?;
            }

            AppCommand::AddItem {
                category,
                name,
                url,
            } => {
                self.board.add_item(category, &name, &url)?;
            }
            AppCommand::DeleteItem { category, index } => {
                self.board.delete_item(category, index)?;
            }
            AppCommand::MoveItem { category, from, to } => {
                self.board.move_item(category, from, to)?;
            }

            AppCommand::SetTheme(change) => self.board.set_theme(change)?,
            AppCommand::PreviewBlur(px) => self.board.preview_blur(px),
            AppCommand::SaveTheme => self.board.save_theme()?,
            AppCommand::ResetTheme => self.board.reset_theme()?,

            AppCommand::AddTodo { day, text } => {
                self.board.add_todo(day, &text)?;
            }
            AppCommand::ToggleTodo { day, index } => {
                self.board.toggle_todo(day, index)?;
            }
            AppCommand::DeleteTodo { day, index } => {
                self.board.delete_todo(day, index)?;
            }
        }
        Ok(())
    }

    /// Mark the view as transitioning and schedule the data swap.
    ///
    /// Each call bumps `switch_generation`, so only the newest request is
    /// ever applied.
    fn request_switch(&mut self, id: String) {
        if self.pending_switch.is_none() && id == self.board.repository().current_id() {
            return;
        }
        if !self.board.repository().contains(&id) {
            tracing::debug!(id = %id, "Ignoring switch to unknown dashboard");
            return;
        }

        self.switch_generation += 1;
        let generation = self.switch_generation;
        self.pending_switch = Some(id);

        let cmd_tx = self.cmd_tx.clone();
        let delay = self.switch_delay;
        let spawned = std::thread::Builder::new()
            .name("switch-delay".into())
            .spawn(move || {
                std::thread::sleep(delay);
                let _ = cmd_tx.send(AppCommand::InternalSwitchDue { generation });
            });

        if let Err(e) = spawned {
            tracing::warn!(error = %e, "Failed to spawn switch timer, switching now");
            if let Err(e) = self.finish_pending() {
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn cancel_pending(&mut self) {
        if self.pending_switch.take().is_some() {
            self.switch_generation += 1;
        }
    }

    fn publish(&self) {
        let _ = self.snapshot_tx.send(self.snapshot());
    }
}
