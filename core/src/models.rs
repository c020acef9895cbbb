use serde::{Deserialize, Serialize};

/// Which OS entry point a path came through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OpenOrigin {
  /// `application:openFile:`
  OpenFile,
  /// `application:openFiles:`
  OpenFiles,
  /// `application:openURLs:`
  OpenUrls,
  /// Window file drop.
  Drop,
  /// Paths given on the command line at start-up.
  LaunchArgs,
}

/// What `submit` did with a path. Purely informational; never an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Admission {
  /// Not a recognized document, or not a usable path.
  Ignored,
  /// Already waiting in the queue.
  Duplicate,
  /// Buffered until the channel is ready.
  Queued,
  /// Sent straight through the channel.
  Dispatched,
}

/// One outbound message: a method call on a named channel with a single path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodCall {
  pub channel: String,
  pub method: String,
  pub argument: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForwarderStatus {
  pub ready: bool,
  pub pending: Vec<String>,
  pub flush_scheduled: bool,
  /// Channel name once the UI is ready.
  pub channel: Option<String>,
}

/// Acknowledgment for a multi-file open request.
///
/// Values match `NSApplicationDelegateReply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum DelegateReply {
  Success = 0,
  Cancel = 1,
  Failure = 2,
}

/// Drag feedback for the drop surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOperation {
  None,
  Copy,
}
