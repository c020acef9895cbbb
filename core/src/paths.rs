use std::{
  env,
  path::{Component, Path, PathBuf},
};

/// Lowercased extension of `path`, if it has one that is valid UTF-8.
pub fn extension_of(path: &Path) -> Option<String> {
  path
    .extension()
    .and_then(|s| s.to_str())
    .map(|s| s.to_ascii_lowercase())
}

pub fn is_recognized(path: &Path, extensions: &[String]) -> bool {
  match extension_of(path) {
    Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)),
    None => false,
  }
}

/// Turn a raw path from the OS into the absolute string form used as queue key.
///
/// Relative paths are anchored at the current working directory. `.` is
/// dropped and `..` is resolved lexically; symlinks are left alone.
pub fn normalize_path(raw: &str) -> Option<String> {
  if raw.is_empty() {
    return None;
  }

  let p = Path::new(raw);
  let absolute = if p.is_absolute() {
    p.to_path_buf()
  } else {
    match env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => p.to_path_buf(),
    }
  };

  let mut out = PathBuf::new();
  for comp in absolute.components() {
    match comp {
      Component::CurDir => {}
      Component::ParentDir => {
        // Never pop past the root.
        if out.parent().is_some() {
          out.pop();
        }
      }
      other => out.push(other.as_os_str()),
    }
  }

  let s = out.to_string_lossy().to_string();
  if s.is_empty() {
    None
  } else {
    Some(s)
  }
}

/// Decode a `file://` URL into a filesystem path string.
///
/// Only the `file` scheme is accepted, with an empty or `localhost` host.
/// Query and fragment parts are discarded.
pub fn file_url_to_path(url: &str) -> Option<String> {
  let (scheme, rest) = url.split_once(':')?;
  if !scheme.eq_ignore_ascii_case("file") {
    return None;
  }
  let rest = rest.strip_prefix("//")?;

  let (host, path) = match rest.find('/') {
    Some(idx) => (&rest[..idx], &rest[idx..]),
    None => return None,
  };
  if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
    return None;
  }

  let path = path.split(['?', '#']).next().unwrap_or(path);
  let decoded = percent_decode(path)?;
  if decoded.is_empty() {
    None
  } else {
    Some(decoded)
  }
}

fn percent_decode(encoded: &str) -> Option<String> {
  let raw = encoded.as_bytes();
  let mut bytes = Vec::with_capacity(raw.len());
  let mut i = 0;
  while i < raw.len() {
    if raw[i] == b'%'
      && i + 2 < raw.len()
      && raw[i + 1].is_ascii_hexdigit()
      && raw[i + 2].is_ascii_hexdigit()
    {
      bytes.push((hex_value(raw[i + 1]) << 4) | hex_value(raw[i + 2]));
      i += 3;
      continue;
    }
    bytes.push(raw[i]);
    i += 1;
  }
  String::from_utf8(bytes).ok()
}

fn hex_value(digit: u8) -> u8 {
  match digit {
    b'0'..=b'9' => digit - b'0',
    b'a'..=b'f' => digit - b'a' + 10,
    _ => digit - b'A' + 10,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn exts() -> Vec<String> {
    ["md", "markdown", "mdown", "mkd"]
      .iter()
      .map(|s| s.to_string())
      .collect()
  }

  #[test]
  fn recognizes_markdown_extensions_case_insensitively() {
    assert!(is_recognized(Path::new("/notes/README.MD"), &exts()));
    assert!(is_recognized(Path::new("/notes/a.Markdown"), &exts()));
    assert!(is_recognized(Path::new("/notes/a.mdown"), &exts()));
    assert!(is_recognized(Path::new("/notes/a.MKD"), &exts()));
    assert!(!is_recognized(Path::new("/notes/a.txt"), &exts()));
    assert!(!is_recognized(Path::new("/notes/md"), &exts()));
    assert!(!is_recognized(Path::new("/notes/.md"), &exts()));
  }

  #[test]
  fn normalize_cleans_dot_segments() {
    assert_eq!(
      normalize_path("/a/./b/../c.md").as_deref(),
      Some("/a/c.md")
    );
    assert_eq!(normalize_path("/../x.md").as_deref(), Some("/x.md"));
    assert_eq!(normalize_path("/docs/note.md/").as_deref(), Some("/docs/note.md"));
    assert_eq!(normalize_path(""), None);
  }

  #[test]
  fn normalize_anchors_relative_paths_at_cwd() {
    let cwd = env::current_dir().unwrap();
    let got = normalize_path("sub/x.md").unwrap();
    assert_eq!(PathBuf::from(got), cwd.join("sub").join("x.md"));
  }

  #[test]
  fn file_urls_decode_and_filter() {
    assert_eq!(
      file_url_to_path("file:///Users/me/My%20Notes/a.md").as_deref(),
      Some("/Users/me/My Notes/a.md")
    );
    assert_eq!(
      file_url_to_path("FILE://localhost/tmp/b.md").as_deref(),
      Some("/tmp/b.md")
    );
    assert_eq!(
      file_url_to_path("file:///tmp/c.md?x=1#top").as_deref(),
      Some("/tmp/c.md")
    );
    assert_eq!(file_url_to_path("https://example.com/a.md"), None);
    assert_eq!(file_url_to_path("file://server/share/a.md"), None);
    assert_eq!(file_url_to_path("file:relative.md"), None);
    // Malformed escapes pass through untouched.
    assert_eq!(
      file_url_to_path("file:///tmp/100%.md").as_deref(),
      Some("/tmp/100%.md")
    );
    // Sign characters are not hex digits.
    assert_eq!(
      file_url_to_path("file:///tmp/a%+d.md").as_deref(),
      Some("/tmp/a%+d.md")
    );
    assert_eq!(
      file_url_to_path("file:///tmp/%4A%4b.md").as_deref(),
      Some("/tmp/JK.md")
    );
  }
}
