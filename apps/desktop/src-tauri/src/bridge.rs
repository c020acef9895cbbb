//! Glue between the Tauri shell and the open-file forwarder.

use std::sync::Arc;

use pm_core::{
  sources, CoreError, ForwarderOptions, MethodCall, OpenFileForwarder, ThreadScheduler, Transport,
};
use tauri::{FileDropEvent, Manager, WindowEvent};

const MAIN_WINDOW: &str = "main";
/// Optional JSON override for `ForwarderOptions`.
const OPTIONS_ENV: &str = "PUREMARK_FORWARDER_OPTIONS";

/// Delivers channel messages as window events named after the method.
pub struct WindowTransport {
  window: tauri::Window,
}

impl WindowTransport {
  pub fn new(window: tauri::Window) -> Self {
    Self { window }
  }
}

impl Transport for WindowTransport {
  fn invoke(&self, call: &MethodCall) -> Result<(), CoreError> {
    self
      .window
      .emit(&call.method, call.argument.clone())
      .map_err(|e| CoreError::Transport(format!("{} on {}: {e}", call.method, self.window.label())))
  }
}

fn load_options() -> ForwarderOptions {
  let Ok(text) = std::env::var(OPTIONS_ENV) else {
    return ForwarderOptions::default();
  };
  match ForwarderOptions::from_json(&text) {
    Ok(opts) => opts,
    Err(e) => {
      tracing::warn!(error = %e, "ignoring {OPTIONS_ENV}; using defaults");
      ForwarderOptions::default()
    }
  }
}

/// Build the forwarder, register it, hook the OS sources and signal readiness.
pub fn install(app: &mut tauri::App) -> Result<(), Box<dyn std::error::Error>> {
  let handle = app.handle();

  // Timer tasks hop back onto the UI event loop before touching anything.
  let hop = handle.clone();
  let scheduler = ThreadScheduler::with_executor(move |task| {
    if let Err(e) = hop.run_on_main_thread(task) {
      tracing::warn!(error = %e, "main thread unavailable; timer task dropped");
    }
  });

  let forwarder = OpenFileForwarder::new(load_options(), Arc::new(scheduler))?;
  app.manage(forwarder.clone());

  let launched = sources::open_launch_args(&forwarder, std::env::args().skip(1));
  if !launched.is_empty() {
    tracing::info!(count = launched.len(), "documents from command line");
  }

  #[cfg(target_os = "macos")]
  crate::macos_open::install(handle.clone());

  match app.get_window(MAIN_WINDOW) {
    Some(window) => {
      forwarder.mark_ready(Arc::new(WindowTransport::new(window)));
    }
    None => tracing::warn!("no '{MAIN_WINDOW}' window; open-file events stay queued"),
  }

  Ok(())
}

pub fn handle_window_event(event: tauri::GlobalWindowEvent<tauri::Wry>) {
  let WindowEvent::FileDrop(file_drop) = event.event() else {
    return;
  };
  let Some(forwarder) = event.window().try_state::<OpenFileForwarder>() else {
    return;
  };
  let forwarder = forwarder.inner();

  match file_drop {
    FileDropEvent::Hovered(paths) => {
      // Tauri v1 has no way to return drag feedback; the verdict is only logged.
      let op = sources::drag_operation(forwarder, paths.as_slice());
      tracing::debug!(?op, count = paths.len(), "files hovering");
    }
    FileDropEvent::Dropped(paths) => {
      let handled = sources::perform_drop(forwarder, paths.as_slice());
      tracing::debug!(handled, count = paths.len(), "files dropped");
    }
    _ => {}
  }
}
