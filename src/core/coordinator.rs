//! Debounced scheduling of reconciliation passes.
//!
//! [`StateMachine`] holds the `Idle → PendingDebounce → Running → Idle` transitions and
//! takes the current time as an argument, so every transition is testable without
//! sleeping. [`Coordinator`] drives it from a single worker thread. The watcher callback
//! and manual refresh requests post [`Message`]s into that worker's queue. Nothing else
//! touches the state.
//!
//! # Guarantees
//! - **Single flight**: passes run inline on the worker, one at a time
//! - **Debounce**: a burst of change events within the window causes one pass
//! - **No lost edits**: a change that arrives during a pass schedules another pass
//! - **Cold start**: one pass runs before any event is processed
//! - **Graceful shutdown**: an in-flight pass completes before the worker exits

use crate::core::error::{AddonSyncError, Result};
use crate::core::reconcile::{Reconcile, ReconciliationReport};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Upper bound on the debounce window, whatever the settings say
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    PendingDebounce { deadline: Instant },
    Running { rerun: bool },
}

#[derive(Debug, Clone)]
pub struct StateMachine {
    state: CoordinatorState,
    debounce: Duration,
}

impl StateMachine {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: CoordinatorState::Idle,
            debounce: debounce.min(MAX_DEBOUNCE),
        }
    }

    fn debounce_deadline(&self, now: Instant) -> Instant {
        now.checked_add(self.debounce).unwrap_or(now)
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            CoordinatorState::PendingDebounce { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// A change event (re)starts the debounce timer, or marks a running pass stale
    pub fn on_file_changed(&mut self, now: Instant) {
        self.state = match self.state {
            CoordinatorState::Idle | CoordinatorState::PendingDebounce { .. } => {
                CoordinatorState::PendingDebounce {
                    deadline: self.debounce_deadline(now),
                }
            }
            CoordinatorState::Running { .. } => CoordinatorState::Running { rerun: true },
        };
    }

    /// A manual request skips the debounce window
    pub fn on_pass_requested(&mut self, now: Instant) {
        self.state = match self.state {
            CoordinatorState::Idle | CoordinatorState::PendingDebounce { .. } => {
                CoordinatorState::PendingDebounce { deadline: now }
            }
            CoordinatorState::Running { .. } => CoordinatorState::Running { rerun: true },
        };
    }

    /// Returns true, and enters `Running`, when the debounce deadline has passed
    pub fn on_timer(&mut self, now: Instant) -> bool {
        match self.state {
            CoordinatorState::PendingDebounce { deadline } if now >= deadline => {
                self.state = CoordinatorState::Running { rerun: false };
                true
            }
            _ => false,
        }
    }

    /// Enter `Running` unconditionally, for the cold-start pass
    pub fn begin_pass(&mut self) {
        self.state = CoordinatorState::Running { rerun: false };
    }

    pub fn apply(&mut self, message: Message, now: Instant) {
        match message {
            Message::FileChanged => self.on_file_changed(now),
            Message::RunNow => self.on_pass_requested(now),
            Message::Shutdown => {}
        }
    }

    pub fn on_pass_finished(&mut self, now: Instant) {
        self.state = match self.state {
            CoordinatorState::Running { rerun: true } => CoordinatorState::PendingDebounce {
                deadline: self.debounce_deadline(now),
            },
            _ => CoordinatorState::Idle,
        };
    }
}

/// Published after every pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Changed(ReconciliationReport),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    FileChanged,
    RunNow,
    Shutdown,
}

/// Cloneable handle for posting into the coordinator's queue
#[derive(Debug, Clone)]
pub struct Trigger {
    sender: Sender<Message>,
}

impl Trigger {
    pub fn file_changed(&self) -> Result<()> {
        self.send(Message::FileChanged)
    }

    pub fn request_pass(&self) -> Result<()> {
        self.send(Message::RunNow)
    }

    fn send(&self, message: Message) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| AddonSyncError::CoordinatorStopped)
    }
}

pub struct CoordinatorHandle {
    trigger: Trigger,
    worker: Option<JoinHandle<()>>,
}

impl CoordinatorHandle {
    pub fn trigger(&self) -> Trigger {
        self.trigger.clone()
    }

    pub fn file_changed(&self) -> Result<()> {
        self.trigger.file_changed()
    }

    pub fn request_pass(&self) -> Result<()> {
        self.trigger.request_pass()
    }

    /// Stop the worker once any in-flight pass has completed
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    /// Block until the worker exits on its own
    pub fn join(mut self) -> Result<()> {
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| AddonSyncError::CoordinatorStopped)?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let _ = self.trigger.send(Message::Shutdown);
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| AddonSyncError::CoordinatorStopped)?;
        }
        Ok(())
    }
}

impl Drop for CoordinatorHandle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}

pub struct Coordinator<R> {
    runner: R,
    machine: StateMachine,
    receiver: Receiver<Message>,
    events: Option<Sender<CacheEvent>>,
}

impl<R: Reconcile + Send + 'static> Coordinator<R> {
    /// Spawn the worker. It runs the cold-start pass, then waits for messages.
    pub fn start(
        runner: R,
        debounce: Duration,
        events: Option<Sender<CacheEvent>>,
    ) -> Result<CoordinatorHandle> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let coordinator = Self {
            runner,
            machine: StateMachine::new(debounce),
            receiver,
            events,
        };

        let worker = std::thread::Builder::new()
            .name("addon-sync-coordinator".to_string())
            .spawn(move || coordinator.run_loop())?;

        Ok(CoordinatorHandle {
            trigger: Trigger { sender },
            worker: Some(worker),
        })
    }

    fn run_loop(mut self) {
        log::debug!("Coordinator started, running cold-start pass");
        self.machine.begin_pass();
        if !self.run_pass() {
            return;
        }

        loop {
            let received = match self.machine.deadline() {
                Some(deadline) => match self.receiver.recv_deadline(deadline) {
                    Ok(message) => Some(message),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.receiver.recv() {
                    Ok(message) => Some(message),
                    Err(_) => break,
                },
            };

            match received {
                Some(Message::Shutdown) => break,
                Some(message) => self.machine.apply(message, Instant::now()),
                None => {}
            }

            if self.machine.on_timer(Instant::now()) && !self.run_pass() {
                break;
            }
        }

        log::debug!("Coordinator stopped");
    }

    /// Run one pass. Returns false when a shutdown arrived meanwhile.
    fn run_pass(&mut self) -> bool {
        let event = match self.runner.run() {
            Ok(report) => CacheEvent::Changed(report),
            Err(e) => {
                log::error!("Reconciliation failed, will retry on next trigger: {e}");
                CacheEvent::Failed(e.to_string())
            }
        };
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }

        // Messages queued during the pass arrived while Running
        let mut keep_running = true;
        let now = Instant::now();
        for message in self.receiver.try_iter() {
            match message {
                Message::Shutdown => keep_running = false,
                other => self.machine.apply(other, now),
            }
        }

        self.machine.on_pass_finished(Instant::now());
        keep_running
    }
}
