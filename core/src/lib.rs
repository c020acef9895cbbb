mod channel;
mod forwarder;
mod models;
pub mod paths;
pub mod sources;
mod timer;

pub use crate::channel::{ChannelHandle, Transport};
pub use crate::forwarder::{
  ForwarderOptions, OpenFileForwarder, DEFAULT_CHANNEL_NAME, DEFAULT_DELAY_MS, DEFAULT_EXTENSIONS,
  DEFAULT_METHOD,
};
pub use crate::models::{
  Admission, DelegateReply, DragOperation, ForwarderStatus, MethodCall, OpenOrigin,
};
pub use crate::sources::OpenSink;
pub use crate::timer::{Executor, ManualScheduler, Scheduler, Task, ThreadScheduler, TimerHandle};

pub use crate::forwarder::CoreError;
