use std::{fmt, sync::Arc};

use crate::{forwarder::CoreError, models::MethodCall};

/// Outbound message transport to the UI layer.
pub trait Transport: Send + Sync {
  fn invoke(&self, call: &MethodCall) -> Result<(), CoreError>;
}

impl<F> Transport for F
where
  F: Fn(&MethodCall) -> Result<(), CoreError> + Send + Sync,
{
  fn invoke(&self, call: &MethodCall) -> Result<(), CoreError> {
    self(call)
  }
}

/// A named method channel bound to a transport.
#[derive(Clone)]
pub struct ChannelHandle {
  name: String,
  method: String,
  transport: Arc<dyn Transport>,
}

impl ChannelHandle {
  pub fn new(
    name: impl Into<String>,
    method: impl Into<String>,
    transport: Arc<dyn Transport>,
  ) -> Self {
    Self {
      name: name.into(),
      method: method.into(),
      transport,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn method(&self) -> &str {
    &self.method
  }

  /// Invoke the channel's method with a single path argument.
  pub fn send(&self, path: &str) -> Result<(), CoreError> {
    self.transport.invoke(&MethodCall {
      channel: self.name.clone(),
      method: self.method.clone(),
      argument: path.to_string(),
    })
  }
}

impl fmt::Debug for ChannelHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChannelHandle")
      .field("name", &self.name)
      .field("method", &self.method)
      .finish_non_exhaustive()
  }
}
