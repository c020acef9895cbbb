#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod bridge;
mod commands;
#[cfg(target_os = "macos")]
mod macos_open;

fn main() {
  tracing_subscriber::fmt::init();

  tauri::Builder::default()
    .setup(|app| bridge::install(app))
    .on_window_event(bridge::handle_window_event)
    .invoke_handler(tauri::generate_handler![commands::open_forwarder_status])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
