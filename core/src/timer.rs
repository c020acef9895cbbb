use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  thread,
  time::Duration,
};

use parking_lot::Mutex;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a due task somewhere else (for example on the UI main thread).
pub type Executor = Arc<dyn Fn(Task) + Send + Sync>;

/// Handle to an armed one-shot timer. Clones share the same cancel flag.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
  cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
  pub fn new() -> Self {
    Self::default()
  }

  /// Prevent the task from running if it has not fired yet.
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }
}

/// Arms one-shot delayed tasks.
///
/// Implementations must not run `task` synchronously inside `schedule`.
pub trait Scheduler: Send + Sync {
  fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

struct Armed {
  deadline: Duration,
  seq: u64,
  handle: TimerHandle,
  task: Task,
}

#[derive(Default)]
struct ManualClock {
  now: Duration,
  seq: u64,
  armed: Vec<Armed>,
}

/// Fake clock. Time only moves when `advance` is called.
#[derive(Clone, Default)]
pub struct ManualScheduler {
  clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
  pub fn new() -> Self {
    Self::default()
  }

  /// Time elapsed since creation.
  pub fn now(&self) -> Duration {
    self.clock.lock().now
  }

  /// Timers waiting to fire (cancelled ones excluded).
  pub fn pending(&self) -> usize {
    self
      .clock
      .lock()
      .armed
      .iter()
      .filter(|a| !a.handle.is_cancelled())
      .count()
  }

  /// Number of timers ever armed.
  pub fn armed(&self) -> u64 {
    self.clock.lock().seq
  }

  pub fn next_deadline(&self) -> Option<Duration> {
    self
      .clock
      .lock()
      .armed
      .iter()
      .filter(|a| !a.handle.is_cancelled())
      .map(|a| a.deadline)
      .min()
  }

  /// Move the clock forward by `by`, running due tasks in deadline order.
  ///
  /// Tasks armed while advancing run too if their deadline falls inside the
  /// window. Returns how many tasks ran.
  pub fn advance(&self, by: Duration) -> usize {
    let target = self.clock.lock().now + by;
    let mut ran = 0;

    loop {
      // Lock is released before the task runs; tasks may arm new timers.
      let next = {
        let mut clock = self.clock.lock();
        let idx = clock
          .armed
          .iter()
          .enumerate()
          .filter(|(_, a)| a.deadline <= target)
          .min_by_key(|(_, a)| (a.deadline, a.seq))
          .map(|(i, _)| i);
        match idx {
          Some(i) => {
            let armed = clock.armed.swap_remove(i);
            if armed.deadline > clock.now {
              clock.now = armed.deadline;
            }
            Some(armed)
          }
          None => {
            clock.now = target;
            None
          }
        }
      };

      let Some(armed) = next else {
        break;
      };
      if armed.handle.is_cancelled() {
        continue;
      }
      (armed.task)();
      ran += 1;
    }

    ran
  }
}

impl Scheduler for ManualScheduler {
  fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
    let handle = TimerHandle::new();
    let mut clock = self.clock.lock();
    let deadline = clock.now + delay;
    let seq = clock.seq;
    clock.seq += 1;
    clock.armed.push(Armed {
      deadline,
      seq,
      handle: handle.clone(),
      task,
    });
    handle
  }
}

/// Real clock: one sleeper thread per timer.
#[derive(Clone, Default)]
pub struct ThreadScheduler {
  executor: Option<Executor>,
}

impl ThreadScheduler {
  /// Due tasks run on the sleeper thread itself.
  pub fn new() -> Self {
    Self::default()
  }

  /// Due tasks are handed to `executor` instead of running on the sleeper thread.
  pub fn with_executor(executor: impl Fn(Task) + Send + Sync + 'static) -> Self {
    Self {
      executor: Some(Arc::new(executor)),
    }
  }
}

impl Scheduler for ThreadScheduler {
  fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
    let handle = TimerHandle::new();
    let watch = handle.clone();
    let executor = self.executor.clone();

    let spawned = thread::Builder::new()
      .name("pm-timer".into())
      .spawn(move || {
        thread::sleep(delay);
        if watch.is_cancelled() {
          return;
        }
        match executor {
          Some(exec) => exec(task),
          None => task(),
        }
      });

    if let Err(e) = spawned {
      tracing::warn!(error = %e, ?delay, "timer thread spawn failed; task dropped");
      handle.cancel();
    }
    handle
  }
}
