use std::{
  path::Path,
  sync::{Arc, Weak},
  time::Duration,
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  channel::{ChannelHandle, Transport},
  models::{Admission, ForwarderStatus, OpenOrigin},
  paths,
  timer::Scheduler,
};

#[derive(Debug, Error)]
pub enum CoreError {
  #[error("invalid option: {0}")]
  InvalidOption(String),
  #[error("transport error: {0}")]
  Transport(String),
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub const DEFAULT_CHANNEL_NAME: &str = "com.puremark/openFile";
pub const DEFAULT_METHOD: &str = "openFile";
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["md", "markdown", "mdown", "mkd"];
pub const DEFAULT_DELAY_MS: u64 = 1_500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForwarderOptions {
  pub channel_name: String,
  pub method: String,
  /// Recognized document extensions, without the dot.
  pub extensions: Vec<String>,
  /// Quiet period before a buffered flush is attempted.
  pub debounce_ms: u64,
  /// Wait between a flush snapshot and its sends. The UI subscribes to the
  /// channel some time after the channel itself exists.
  pub settle_ms: u64,
}

impl Default for ForwarderOptions {
  fn default() -> Self {
    Self {
      channel_name: DEFAULT_CHANNEL_NAME.to_string(),
      method: DEFAULT_METHOD.to_string(),
      extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
      debounce_ms: DEFAULT_DELAY_MS,
      settle_ms: DEFAULT_DELAY_MS,
    }
  }
}

impl ForwarderOptions {
  /// Parse options from JSON; absent fields keep their defaults.
  pub fn from_json(text: &str) -> Result<Self, CoreError> {
    let opts: ForwarderOptions = serde_json::from_str(text)?;
    opts.validate()?;
    Ok(opts)
  }

  pub fn validate(&self) -> Result<(), CoreError> {
    if self.channel_name.trim().is_empty() {
      return Err(CoreError::InvalidOption("channel_name is empty".into()));
    }
    if self.method.trim().is_empty() {
      return Err(CoreError::InvalidOption("method is empty".into()));
    }
    if self.extensions.is_empty() {
      return Err(CoreError::InvalidOption("extensions is empty".into()));
    }
    for ext in &self.extensions {
      if ext.is_empty() || ext.contains('.') || ext.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidOption(format!(
          "bad extension {ext:?} (expected a bare extension such as \"md\")"
        )));
      }
    }
    Ok(())
  }

  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }

  pub fn settle(&self) -> Duration {
    Duration::from_millis(self.settle_ms)
  }
}

#[derive(Default)]
struct ForwarderState {
  pending: Vec<String>,
  channel: Option<ChannelHandle>,
  ready: bool,
  flush_scheduled: bool,
  next_batch: u64,
}

struct Shared {
  options: ForwarderOptions,
  scheduler: Arc<dyn Scheduler>,
  state: Mutex<ForwarderState>,
}

/// Buffers document paths from the OS until the UI channel is ready, then
/// forwards them one message per path.
///
/// Cheap to clone; clones share state. The state lock is never held while a
/// timer is armed or a message is sent.
#[derive(Clone)]
pub struct OpenFileForwarder {
  shared: Arc<Shared>,
}

impl OpenFileForwarder {
  pub fn new(options: ForwarderOptions, scheduler: Arc<dyn Scheduler>) -> Result<Self, CoreError> {
    options.validate()?;
    Ok(Self {
      shared: Arc::new(Shared {
        options,
        scheduler,
        state: Mutex::new(ForwarderState::default()),
      }),
    })
  }

  fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
    weak.upgrade().map(|shared| Self { shared })
  }

  pub fn options(&self) -> &ForwarderOptions {
    &self.shared.options
  }

  /// Whether `raw` has a recognized document extension.
  pub fn recognizes(&self, raw: &str) -> bool {
    paths::is_recognized(Path::new(raw), &self.shared.options.extensions)
  }

  /// Accept a raw path from any OS entry point.
  ///
  /// Unrecognized and duplicate paths are dropped silently. A drop onto a
  /// ready window goes straight out. Everything else is queued and a
  /// debounced flush is requested, even after readiness: launch callbacks can
  /// land before the page has subscribed, and the settle delay covers that.
  pub fn submit(&self, origin: OpenOrigin, raw: &str) -> Admission {
    let Some(path) = paths::normalize_path(raw) else {
      tracing::debug!(?origin, "ignoring empty path");
      return Admission::Ignored;
    };
    if !self.recognizes(&path) {
      tracing::debug!(?origin, path = %path, "ignoring non-document path");
      return Admission::Ignored;
    }

    let immediate = {
      let mut state = self.shared.state.lock();
      if state.pending.contains(&path) {
        tracing::debug!(?origin, path = %path, "path already pending");
        return Admission::Duplicate;
      }
      // Queued and retired in one step: no flush can snapshot it in between.
      if origin == OpenOrigin::Drop && state.ready && state.channel.is_some() {
        true
      } else {
        state.pending.push(path.clone());
        false
      }
    };

    if immediate {
      tracing::debug!(?origin, path = %path, "ui ready; dispatching now");
      self.dispatch_immediate(&path);
      Admission::Dispatched
    } else {
      tracing::debug!(?origin, path = %path, "queued for debounced flush");
      self.schedule_flush();
      Admission::Queued
    }
  }

  /// The one-time NOT_READY -> READY transition.
  ///
  /// Binds the channel to `transport` and flushes whatever is queued. Returns
  /// false (and changes nothing) if the channel already exists.
  pub fn mark_ready(&self, transport: Arc<dyn Transport>) -> bool {
    let channel_name = {
      let mut state = self.shared.state.lock();
      if state.channel.is_some() {
        tracing::debug!("ui channel already bound; ignoring readiness signal");
        return false;
      }
      let opts = &self.shared.options;
      state.channel = Some(ChannelHandle::new(
        opts.channel_name.clone(),
        opts.method.clone(),
        transport,
      ));
      state.ready = true;
      opts.channel_name.clone()
    };

    tracing::info!(channel = %channel_name, "ui channel ready");
    self.flush();
    true
  }

  /// Arm the debounce timer unless one is already armed or nothing is queued.
  pub fn schedule_flush(&self) {
    {
      let mut state = self.shared.state.lock();
      if state.flush_scheduled || state.pending.is_empty() {
        return;
      }
      state.flush_scheduled = true;
    }

    let delay = self.shared.options.debounce();
    let guard = DebounceGuard(Arc::downgrade(&self.shared));
    tracing::debug!(?delay, "flush scheduled");
    let handle = self.shared.scheduler.schedule(
      delay,
      Box::new(move || {
        let Some(forwarder) = OpenFileForwarder::from_weak(&guard.0) else {
          return;
        };
        drop(guard);
        forwarder.flush();
      }),
    );
    if handle.is_cancelled() {
      tracing::warn!("debounce timer not armed; next submit retries");
      self.shared.state.lock().flush_scheduled = false;
    }
  }

  /// Snapshot and clear the queue, then send the snapshot after the settle delay.
  ///
  /// Does nothing before readiness or when the queue is empty. Paths that
  /// arrive during the settle delay go to the fresh queue, not this batch.
  pub fn flush(&self) {
    let (channel, batch, snapshot) = {
      let mut state = self.shared.state.lock();
      let Some(channel) = state.channel.clone() else {
        return;
      };
      if state.pending.is_empty() {
        return;
      }
      let snapshot = std::mem::take(&mut state.pending);
      let batch = state.next_batch;
      state.next_batch += 1;
      (channel, batch, snapshot)
    };

    let delay = self.shared.options.settle();
    tracing::info!(batch, count = snapshot.len(), ?delay, "flushing pending paths");
    self.shared.scheduler.schedule(
      delay,
      Box::new(move || send_batch(&channel, batch, &snapshot)),
    );
  }

  /// Send one path right away. Returns whether it was delivered.
  pub fn dispatch_immediate(&self, path: &str) -> bool {
    let channel = self.shared.state.lock().channel.clone();
    let Some(channel) = channel else {
      tracing::debug!(path, "no ui channel; dropping path");
      return false;
    };
    match channel.send(path) {
      Ok(()) => true,
      Err(e) => {
        tracing::warn!(path, error = %e, "open-file message not delivered");
        false
      }
    }
  }

  pub fn is_ready(&self) -> bool {
    self.shared.state.lock().ready
  }

  pub fn pending(&self) -> Vec<String> {
    self.shared.state.lock().pending.clone()
  }

  pub fn status(&self) -> ForwarderStatus {
    let state = self.shared.state.lock();
    ForwarderStatus {
      ready: state.ready,
      pending: state.pending.clone(),
      flush_scheduled: state.flush_scheduled,
      channel: state.channel.as_ref().map(|c| c.name().to_string()),
    }
  }
}

/// Owned by the debounce task. Clears `flush_scheduled` when the task runs or
/// when it is dropped without running (executor gone, spawn failure).
struct DebounceGuard(Weak<Shared>);

impl Drop for DebounceGuard {
  fn drop(&mut self) {
    if let Some(shared) = self.0.upgrade() {
      shared.state.lock().flush_scheduled = false;
    }
  }
}

fn send_batch(channel: &ChannelHandle, batch: u64, snapshot: &[String]) {
  let mut delivered = 0usize;
  for path in snapshot {
    match channel.send(path) {
      Ok(()) => delivered += 1,
      Err(e) => {
        tracing::warn!(batch, path = %path, error = %e, "open-file message not delivered");
      }
    }
  }
  tracing::info!(
    batch,
    delivered,
    total = snapshot.len(),
    channel = channel.name(),
    "pending paths sent"
  );
}
