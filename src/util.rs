//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let cut = s.char_indices().take_while(|(i, _)| *i < max).last().map(|(i, c)| i + c.len_utf8()).unwrap_or(0);
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

/// Uppercase letter marker for a 0-based alternative index: 0 -> "A",
/// 25 -> "Z", 26 -> "AA". Used by the assessment preview.
pub fn letter_marker(index: usize) -> String {
  let mut n = index;
  let mut out = String::new();
  loop {
    out.insert(0, (b'A' + (n % 26) as u8) as char);
    if n < 26 {
      break;
    }
    n = n / 26 - 1;
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_fills_all_occurrences() {
    let out = fill_template("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and y and x");
  }

  #[test]
  fn letter_markers_roll_over() {
    assert_eq!(letter_marker(0), "A");
    assert_eq!(letter_marker(3), "D");
    assert_eq!(letter_marker(25), "Z");
    assert_eq!(letter_marker(26), "AA");
  }
}
