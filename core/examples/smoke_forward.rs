use std::{
  sync::{mpsc, Arc, Mutex},
  time::Duration,
};

use pm_core::{
  sources, CoreError, ForwarderOptions, MethodCall, OpenFileForwarder, ThreadScheduler,
};

fn main() -> Result<(), String> {
  let args: Vec<String> = std::env::args().skip(1).collect();
  if args.is_empty() {
    return Err(
      "usage: cargo run -p pm_core --example smoke_forward -- <file.md>...".to_string(),
    );
  }

  let opts = ForwarderOptions {
    debounce_ms: 200,
    settle_ms: 200,
    ..ForwarderOptions::default()
  };
  let fwd = OpenFileForwarder::new(opts, Arc::new(ThreadScheduler::new()))
    .map_err(|e| e.to_string())?;

  let accepted = sources::open_launch_args(&fwd, args);
  println!("queued={}", accepted.len());

  let (tx, rx) = mpsc::channel::<MethodCall>();
  let tx = Mutex::new(tx);
  fwd.mark_ready(Arc::new(move |call: &MethodCall| -> Result<(), CoreError> {
    tx.lock()
      .map_err(|e| CoreError::Transport(e.to_string()))?
      .send(call.clone())
      .map_err(|e| CoreError::Transport(e.to_string()))
  }));

  for _ in 0..accepted.len() {
    let call = rx
      .recv_timeout(Duration::from_secs(5))
      .map_err(|e| e.to_string())?;
    println!("{}:{} {}", call.channel, call.method, call.argument);
  }
  Ok(())
}
