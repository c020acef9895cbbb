use std::{
  sync::{mpsc, Arc, Mutex},
  thread,
  time::Duration,
};

use pm_core::{
  CoreError, ForwarderOptions, ManualScheduler, MethodCall, OpenFileForwarder, OpenOrigin,
  Scheduler, ThreadScheduler,
};

fn ms(n: u64) -> Duration {
  Duration::from_millis(n)
}

#[test]
fn manual_clock_runs_due_tasks_in_deadline_then_arming_order() {
  let clock = ManualScheduler::new();
  let log = Arc::new(Mutex::new(Vec::new()));

  for (name, at) in [("late", 30), ("early", 10), ("tie-a", 20), ("tie-b", 20)] {
    let log = log.clone();
    clock.schedule(ms(at), Box::new(move || log.lock().unwrap().push(name)));
  }

  assert_eq!(clock.next_deadline(), Some(ms(10)));
  assert_eq!(clock.advance(ms(20)), 3);
  assert_eq!(*log.lock().unwrap(), vec!["early", "tie-a", "tie-b"]);
  assert_eq!(clock.now(), ms(20));
  assert_eq!(clock.pending(), 1);
}

#[test]
fn manual_clock_runs_tasks_armed_inside_the_window() {
  let clock = ManualScheduler::new();
  let fired = Arc::new(Mutex::new(Vec::new()));

  let inner_clock = clock.clone();
  let inner_fired = fired.clone();
  clock.schedule(
    ms(5),
    Box::new(move || {
      let at = inner_clock.now();
      inner_fired.lock().unwrap().push(at);
      let f = inner_fired.clone();
      let c = inner_clock.clone();
      inner_clock.schedule(ms(5), Box::new(move || f.lock().unwrap().push(c.now())));
    }),
  );

  assert_eq!(clock.advance(ms(100)), 2);
  assert_eq!(*fired.lock().unwrap(), vec![ms(5), ms(10)]);
  assert_eq!(clock.now(), ms(100));
}

#[test]
fn cancelled_timers_never_fire() {
  let clock = ManualScheduler::new();
  let fired = Arc::new(Mutex::new(false));

  let f = fired.clone();
  let handle = clock.schedule(ms(1), Box::new(move || *f.lock().unwrap() = true));
  let copy = handle.clone();
  copy.cancel();

  assert!(handle.is_cancelled());
  assert_eq!(clock.pending(), 0);
  assert_eq!(clock.advance(ms(5)), 0);
  assert!(!*fired.lock().unwrap());
}

#[test]
fn thread_scheduler_fires_and_honours_cancel() {
  let sched = ThreadScheduler::new();
  let (tx, rx) = mpsc::channel();

  let tx_kept = tx.clone();
  sched.schedule(ms(10), Box::new(move || tx_kept.send("kept").unwrap()));
  let cancelled = sched.schedule(ms(10), Box::new(move || tx.send("cancelled").unwrap()));
  cancelled.cancel();

  assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "kept");
  thread::sleep(ms(50));
  assert!(rx.try_recv().is_err());
}

#[test]
fn thread_scheduler_hands_tasks_to_the_executor() {
  let (tx, rx) = mpsc::channel::<String>();
  let hops = Arc::new(Mutex::new(0));
  let counted = hops.clone();
  let sched = ThreadScheduler::with_executor(move |task| {
    *counted.lock().unwrap() += 1;
    task();
  });

  sched.schedule(ms(1), Box::new(move || tx.send("ran".into()).unwrap()));
  assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "ran");
  assert_eq!(*hops.lock().unwrap(), 1);
}

#[test]
fn forwarder_delivers_on_a_real_clock() {
  let (tx, rx) = mpsc::channel::<String>();
  let tx = Mutex::new(tx);
  let opts = ForwarderOptions {
    debounce_ms: 5,
    settle_ms: 5,
    ..ForwarderOptions::default()
  };
  let fwd = OpenFileForwarder::new(opts, Arc::new(ThreadScheduler::new())).unwrap();

  fwd.submit(OpenOrigin::OpenFile, "/a.md");
  fwd.submit(OpenOrigin::OpenFile, "/b.md");
  fwd.mark_ready(Arc::new(move |call: &MethodCall| -> Result<(), CoreError> {
    tx.lock()
      .unwrap()
      .send(call.argument.clone())
      .map_err(|e| CoreError::Transport(e.to_string()))
  }));

  let wait = Duration::from_secs(5);
  assert_eq!(rx.recv_timeout(wait).unwrap(), "/a.md");
  assert_eq!(rx.recv_timeout(wait).unwrap(), "/b.md");

  fwd.submit(OpenOrigin::Drop, "/c.md");
  assert_eq!(rx.try_recv().unwrap(), "/c.md");
}

#[test]
fn debounce_dropped_by_the_executor_can_be_rearmed() {
  // An executor that discards work, like a closed main loop.
  let sched = ThreadScheduler::with_executor(|_task| {});
  let opts = ForwarderOptions {
    debounce_ms: 50,
    ..ForwarderOptions::default()
  };
  let fwd = OpenFileForwarder::new(opts, Arc::new(sched)).unwrap();

  fwd.submit(OpenOrigin::OpenFile, "/a.md");
  let deadline = std::time::Instant::now() + Duration::from_secs(5);
  while fwd.status().flush_scheduled {
    assert!(std::time::Instant::now() < deadline, "guard never released");
    thread::sleep(ms(1));
  }

  fwd.submit(OpenOrigin::OpenFile, "/b.md");
  assert!(fwd.status().flush_scheduled);
}
