//! HTML entity decoding for API-supplied titles.
//!
//! The Data API returns snippet titles HTML-escaped (`Tom &amp; Jerry`,
//! `Rock &#39;n&#39; Roll`). Titles are stored as received and decoded at
//! render time.

use std::borrow::Cow;

/// Named entities YouTube titles are known to carry, plus the common Latin-1 set.
const NAMED_ENTITIES: &[(&str, char)] = &[
  ("amp", '&'),
  ("lt", '<'),
  ("gt", '>'),
  ("quot", '"'),
  ("apos", '\''),
  ("nbsp", '\u{a0}'),
  ("copy", '©'),
  ("reg", '®'),
  ("trade", '™'),
  ("hellip", '…'),
  ("mdash", '—'),
  ("ndash", '–'),
  ("lsquo", '‘'),
  ("rsquo", '’'),
  ("ldquo", '“'),
  ("rdquo", '”'),
  ("laquo", '«'),
  ("raquo", '»'),
  ("middot", '·'),
  ("bull", '•'),
  ("deg", '°'),
  ("times", '×'),
  ("eacute", 'é'),
  ("egrave", 'è'),
  ("aacute", 'á'),
  ("agrave", 'à'),
  ("iacute", 'í'),
  ("oacute", 'ó'),
  ("uacute", 'ú'),
  ("ntilde", 'ñ'),
  ("auml", 'ä'),
  ("ouml", 'ö'),
  ("uuml", 'ü'),
  ("szlig", 'ß'),
  ("ccedil", 'ç'),
];

/// Longest entity body we try to match (`#x10FFFF` / `hellip`).
const MAX_ENTITY_LEN: usize = 8;

fn lookup(body: &str) -> Option<char> {
  if let Some(num) = body.strip_prefix('#') {
    let code = match num.strip_prefix(['x', 'X']) {
      Some(hex) => u32::from_str_radix(hex, 16).ok()?,
      None => num.parse::<u32>().ok()?,
    };
    if code == 0 {
      return Some(char::REPLACEMENT_CHARACTER);
    }
    return char::from_u32(code);
  }
  NAMED_ENTITIES.iter().find(|(name, _)| *name == body).map(|(_, c)| *c)
}

/// Decode HTML entities in `s`. Unknown or malformed entities are left untouched,
/// so text without entities comes back borrowed and unchanged.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
  if !s.contains('&') {
    return Cow::Borrowed(s);
  }

  let mut out = String::with_capacity(s.len());
  let mut rest = s;
  while let Some(amp) = rest.find('&') {
    out.push_str(&rest[..amp]);
    let tail = &rest[amp + 1..];
    let decoded = tail
      .find(';')
      .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
      .and_then(|end| lookup(&tail[..end]).map(|c| (c, end)));
    match decoded {
      Some((c, end)) => {
        out.push(c);
        rest = &tail[end + 1..];
      }
      None => {
        out.push('&');
        rest = tail;
      }
    }
  }
  out.push_str(rest);
  Cow::Owned(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_named_entities() {
    assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
    assert_eq!(decode_entities("&lt;b&gt; &quot;hi&quot;"), "<b> \"hi\"");
  }

  #[test]
  fn decodes_numeric_entities() {
    assert_eq!(decode_entities("Rock &#39;n&#39; Roll"), "Rock 'n' Roll");
    assert_eq!(decode_entities("&#x1F600; smile"), "😀 smile");
    assert_eq!(decode_entities("&#X41;"), "A");
  }

  #[test]
  fn plain_text_is_unchanged_and_borrowed() {
    let title = "Lo-fi beats to study to";
    let decoded = decode_entities(title);
    assert_eq!(decoded, title);
    assert!(matches!(decoded, Cow::Borrowed(_)));
  }

  #[test]
  fn decoding_plain_text_is_idempotent() {
    for title in ["A & B", "Q&A live", "100% fun; really", "日本語タイトル"] {
      assert_eq!(decode_entities(title), title);
      let once = decode_entities(title).into_owned();
      assert_eq!(decode_entities(&once), once);
    }
  }

  #[test]
  fn unknown_or_malformed_entities_pass_through() {
    assert_eq!(decode_entities("&bogus; &amp"), "&bogus; &amp");
    assert_eq!(decode_entities("&;"), "&;");
    assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
  }

  #[test]
  fn nul_reference_becomes_replacement_char() {
    assert_eq!(decode_entities("a&#0;b"), "a\u{FFFD}b");
    assert_eq!(decode_entities("&#x0;"), "\u{FFFD}");
  }

  #[test]
  fn double_encoded_decodes_one_level() {
    assert_eq!(decode_entities("&amp;amp;"), "&amp;");
  }

  #[test]
  fn trailing_ampersand() {
    assert_eq!(decode_entities("Salt &"), "Salt &");
  }
}
