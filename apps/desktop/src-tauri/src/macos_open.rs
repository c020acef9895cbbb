//! macOS "open document" integration.
//!
//! Finder double-click, "Open With" and `open -a PureMark x.md` reach the app
//! as delegate callbacks (`application:openFile:`, `application:openFiles:`,
//! `application:openURLs:`). Tauri v1 does not surface these, so the delegate
//! class is patched at runtime and every callback is funnelled into the
//! forwarder held in Tauri state.

#![cfg(target_os = "macos")]

use std::{ffi::CStr, os::raw::c_char, os::raw::c_void};

use cocoa::{appkit::NSApp, base::id};
use objc::{
  msg_send,
  runtime::{BOOL, Class, Object, Sel, YES},
  sel, sel_impl,
};
use once_cell::sync::OnceCell;
use pm_core::{sources, OpenFileForwarder};
use tauri::Manager;

static APP_HANDLE: OnceCell<tauri::AppHandle> = OnceCell::new();
static INSTALLED: OnceCell<()> = OnceCell::new();

// ObjC runtime FFI (objc crate does not expose these helpers directly).
type IMP = *const c_void;
extern "C" {
  fn class_addMethod(cls: *const Class, name: Sel, imp: IMP, types: *const c_char) -> BOOL;
}

fn with_forwarder(f: impl FnOnce(&OpenFileForwarder)) {
  let Some(app) = APP_HANDLE.get() else {
    return;
  };
  if let Some(state) = app.try_state::<OpenFileForwarder>() {
    f(state.inner());
  }
}

unsafe fn nsstring_to_string(ns: id) -> Option<String> {
  if ns.is_null() {
    return None;
  }
  let c: *const c_char = msg_send![ns, UTF8String];
  if c.is_null() {
    return None;
  }
  Some(CStr::from_ptr(c).to_string_lossy().to_string())
}

/// Map each element of an NSArray through `to_str`, skipping misses.
unsafe fn collect_array(array: id, to_str: impl Fn(id) -> Option<String>) -> Vec<String> {
  if array.is_null() {
    return Vec::new();
  }
  let count: usize = msg_send![array, count];
  let mut out = Vec::with_capacity(count);
  for i in 0..count {
    let item: id = msg_send![array, objectAtIndex: i];
    if let Some(s) = to_str(item) {
      out.push(s);
    }
  }
  out
}

/// `- (BOOL)application:(NSApplication *)sender openFile:(NSString *)filename`
unsafe extern "C" fn application_open_file(
  _this: &Object,
  _cmd: Sel,
  _app: id,
  filename: id,
) -> BOOL {
  if let Some(p) = nsstring_to_string(filename) {
    with_forwarder(|fwd| {
      sources::open_file(fwd, &p);
    });
  }
  // Tell Finder we accepted the open request.
  YES
}

/// `- (void)application:(NSApplication *)sender openFiles:(NSArray<NSString *> *)filenames`
unsafe extern "C" fn application_open_files(_this: &Object, _cmd: Sel, _app: id, filenames: id) {
  let paths = collect_array(filenames, |ns| nsstring_to_string(ns));

  let mut reply = pm_core::DelegateReply::Success;
  with_forwarder(|fwd| {
    reply = sources::open_files(fwd, &paths);
  });

  // openFiles: must be answered explicitly or Finder reports an error.
  let ns_app = NSApp();
  let _: () = msg_send![ns_app, replyToOpenOrPrint: reply as u64];
}

/// `- (void)application:(NSApplication *)application openURLs:(NSArray<NSURL *> *)urls`
unsafe extern "C" fn application_open_urls(_this: &Object, _cmd: Sel, _app: id, urls: id) {
  let urls = collect_array(urls, |url| {
    if url.is_null() {
      return None;
    }
    let s: id = msg_send![url, absoluteString];
    nsstring_to_string(s)
  });
  with_forwarder(|fwd| sources::open_urls(fwd, &urls));
}

/// Install open-document handlers by patching the NSApplication delegate.
///
/// Call once during app setup, after the forwarder is in Tauri state.
pub fn install(app_handle: tauri::AppHandle) {
  let _ = APP_HANDLE.set(app_handle);
  if INSTALLED.set(()).is_err() {
    return;
  }

  unsafe {
    let ns_app = NSApp();
    let delegate: id = msg_send![ns_app, delegate];
    if delegate.is_null() {
      tracing::warn!("no NSApplication delegate; open-file callbacks not installed");
      return;
    }

    let cls: *const Class = msg_send![delegate, class];
    if cls.is_null() {
      return;
    }

    // BOOL return, self + _cmd + 2 object args => "c@:@@"
    let added = class_addMethod(
      cls,
      sel!(application:openFile:),
      application_open_file as IMP,
      b"c@:@@\0".as_ptr() as *const c_char,
    );
    log_added("application:openFile:", added);

    // void return, self + _cmd + 2 object args => "v@:@@"
    let added = class_addMethod(
      cls,
      sel!(application:openFiles:),
      application_open_files as IMP,
      b"v@:@@\0".as_ptr() as *const c_char,
    );
    log_added("application:openFiles:", added);

    let added = class_addMethod(
      cls,
      sel!(application:openURLs:),
      application_open_urls as IMP,
      b"v@:@@\0".as_ptr() as *const c_char,
    );
    log_added("application:openURLs:", added);
  }
}

fn log_added(selector: &str, added: BOOL) {
  if added == YES {
    tracing::debug!(selector, "delegate method installed");
  } else {
    // The delegate already answers this selector; its own handler stays.
    tracing::debug!(selector, "delegate method already present");
  }
}
