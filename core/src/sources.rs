//! Adapters from each OS callback shape onto the single `submit` funnel.
//!
//! These are deliberately thin: shape conversion only. Filtering, dedup and
//! buffering all live in the forwarder.

use std::path::{Path, PathBuf};

use crate::{
  forwarder::OpenFileForwarder,
  models::{Admission, DelegateReply, DragOperation, OpenOrigin},
  paths,
};

/// Something that accepts raw document paths.
pub trait OpenSink {
  fn submit(&self, origin: OpenOrigin, raw: &str) -> Admission;
  fn recognizes(&self, raw: &str) -> bool;
}

impl OpenSink for OpenFileForwarder {
  fn submit(&self, origin: OpenOrigin, raw: &str) -> Admission {
    OpenFileForwarder::submit(self, origin, raw)
  }

  fn recognizes(&self, raw: &str) -> bool {
    OpenFileForwarder::recognizes(self, raw)
  }
}

/// `application:openFile:`. The request is always reported as accepted.
pub fn open_file(sink: &impl OpenSink, filename: &str) -> bool {
  sink.submit(OpenOrigin::OpenFile, filename);
  true
}

/// `application:openFiles:`. Returns the reply the launch protocol waits for.
pub fn open_files<S: AsRef<str>>(sink: &impl OpenSink, filenames: &[S]) -> DelegateReply {
  for name in filenames {
    sink.submit(OpenOrigin::OpenFiles, name.as_ref());
  }
  DelegateReply::Success
}

/// `application:openURLs:`. Non-file URLs are skipped.
pub fn open_urls<S: AsRef<str>>(sink: &impl OpenSink, urls: &[S]) {
  for url in urls {
    match paths::file_url_to_path(url.as_ref()) {
      Some(path) => {
        sink.submit(OpenOrigin::OpenUrls, &path);
      }
      None => tracing::debug!(url = url.as_ref(), "skipping non-file url"),
    }
  }
}

/// Feedback while files hover over the window.
pub fn drag_operation<P: AsRef<Path>>(sink: &impl OpenSink, paths: &[P]) -> DragOperation {
  let any = paths
    .iter()
    .any(|p| sink.recognizes(&p.as_ref().to_string_lossy()));
  if any {
    DragOperation::Copy
  } else {
    DragOperation::None
  }
}

/// Files dropped on the window. Returns true if any was a recognized document.
pub fn perform_drop<P: AsRef<Path>>(sink: &impl OpenSink, paths: &[P]) -> bool {
  let mut handled = false;
  for p in paths {
    let raw = p.as_ref().to_string_lossy();
    if sink.recognizes(&raw) {
      sink.submit(OpenOrigin::Drop, &raw);
      handled = true;
    }
  }
  handled
}

/// Paths passed on the command line. Flags are skipped.
pub fn open_launch_args<I>(sink: &impl OpenSink, args: I) -> Vec<PathBuf>
where
  I: IntoIterator<Item = String>,
{
  let mut accepted = Vec::new();
  for arg in args {
    if arg.starts_with('-') {
      continue;
    }
    match sink.submit(OpenOrigin::LaunchArgs, &arg) {
      Admission::Queued | Admission::Dispatched => accepted.push(PathBuf::from(arg)),
      Admission::Ignored | Admission::Duplicate => {}
    }
  }
  accepted
}
