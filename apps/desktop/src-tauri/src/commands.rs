use pm_core::{ForwarderStatus, OpenFileForwarder};

/// Diagnostics: what the shell is holding back and whether the channel is up.
#[tauri::command]
pub fn open_forwarder_status(forwarder: tauri::State<'_, OpenFileForwarder>) -> ForwarderStatus {
  forwarder.status()
}
