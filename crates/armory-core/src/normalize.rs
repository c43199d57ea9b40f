//! Scalar normalizers: slugs, diacritic folding, rounding, parenthesis
//! extraction and placeholder interpolation. All functions are pure.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Fold accented letters to their unaccented form.
///
/// Canonical decomposition strips combining marks; letters with no
/// decomposition (`ß`, `Æ`, `Ł`, ...) go through a small table. Anything
/// else passes through untouched.
pub fn fold_diacritics(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for ch in input.nfd().filter(|c| !is_combining_mark(*c)) {
    match fold_letter(ch) {
      Some(folded) => out.push_str(folded),
      None => out.push(ch),
    }
  }
  out
}

fn fold_letter(ch: char) -> Option<&'static str> {
  let folded = match ch {
    'Æ' => "AE",
    'æ' => "ae",
    'Œ' => "OE",
    'œ' => "oe",
    'ß' => "ss",
    'Þ' => "TH",
    'þ' => "th",
    'Ð' | 'Đ' => "D",
    'ð' | 'đ' => "d",
    'Ħ' => "H",
    'ħ' => "h",
    'ı' => "i",
    'Ł' => "L",
    'ł' => "l",
    'Ø' => "O",
    'ø' => "o",
    'Ŧ' => "T",
    'ŧ' => "t",
    _ => return None,
  };
  Some(folded)
}

/// Lowercase, accent-folded, hyphen-delimited identifier token.
///
/// Every run of characters that are not alphanumeric collapses into a single
/// `-`; the result never starts or ends with a hyphen.
pub fn slugify(input: &str) -> String {
  let folded = fold_diacritics(input);
  let mut slug = String::with_capacity(folded.len());
  let mut pending_dash = false;
  for ch in folded.chars() {
    if ch.is_alphanumeric() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.extend(ch.to_lowercase());
    } else {
      pending_dash = true;
    }
  }
  slug
}

/// Whether `input` is already a non-empty slug, i.e. safe to use as a
/// stored identifier and file stem.
pub fn is_slug(input: &str) -> bool { !input.is_empty() && slugify(input) == input }

/// Round `value` to `places` decimal places. Non-finite input yields `0`.
pub fn round_to(value: f64, places: u32) -> f64 {
  if !value.is_finite() {
    return 0.0;
  }
  let factor = 10f64.powi(places as i32);
  let rounded = (value * factor).round() / factor;
  // Avoid persisting `-0`.
  if rounded == 0.0 { 0.0 } else { rounded }
}

/// Parse a source scalar as a number under the coerce-or-zero contract.
///
/// Thousands separators are not accepted; `"1,200"` coerces to `0`.
pub fn parse_number(input: &str) -> f64 {
  match input.trim().parse::<f64>() {
    Ok(value) if value.is_finite() => value,
    _ => 0.0,
  }
}

/// The input with every parenthesized group removed, whitespace collapsed.
///
/// An unclosed `(` drops the remainder of the string.
pub fn outside_parens(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut depth = 0usize;
  for ch in input.chars() {
    match ch {
      '(' => depth += 1,
      ')' if depth > 0 => depth -= 1,
      _ if depth == 0 => out.push(ch),
      _ => {}
    }
  }
  collapse_whitespace(&out)
}

/// The trimmed content of the first parenthesized group, if non-blank.
pub fn inside_parens(input: &str) -> Option<String> {
  let start = input.find('(')?;
  let rest = &input[start + 1..];
  let end = rest.find(')').unwrap_or(rest.len());
  let inner = collapse_whitespace(&rest[..end]);
  (!inner.is_empty()).then_some(inner)
}

/// Trim and collapse internal whitespace runs to single spaces.
pub fn collapse_whitespace(input: &str) -> String {
  input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace `{key}` placeholders using `lookup`.
///
/// Unknown keys and unbalanced braces are left verbatim.
pub fn interpolate<F>(template: &str, lookup: F) -> String
where
  F: Fn(&str) -> Option<String>,
{
  let mut out = String::with_capacity(template.len());
  let mut rest = template;
  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];
    match after.find('}') {
      Some(close) => {
        let key = &after[..close];
        match lookup(key) {
          Some(value) => out.push_str(&value),
          None => {
            out.push('{');
            out.push_str(key);
            out.push('}');
          }
        }
        rest = &after[close + 1..];
      }
      None => {
        out.push_str(&rest[open..]);
        rest = "";
      }
    }
  }
  out.push_str(rest);
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slugify_folds_accents_and_case() {
    assert_eq!(slugify("Ghulām  Cavalry"), "ghulam-cavalry");
    assert_eq!(slugify("Mañgonel — Élite"), "mangonel-elite");
    assert_eq!(slugify("Streltsy"), "streltsy");
    assert_eq!(slugify("  --Horse  Archer--  "), "horse-archer");
    assert_eq!(slugify("Straße"), "strasse");
    assert_eq!(slugify(""), "");
  }

  #[test]
  fn slugify_folds_any_decomposable_accent() {
    for (input, expected) in [
      ("Ṭughlaq Ạrcher", "tughlaq-archer"),
      ("Mǎngonel", "mangonel"),
      ("Ǵhazi Raider", "ghazi-raider"),
      ("Łucznik Øst", "lucznik-ost"),
      ("Œuvre Þing", "oeuvre-thing"),
    ] {
      let slug = slugify(input);
      assert_eq!(slug, expected);
      assert!(slug.is_ascii(), "{slug}");
    }
    assert_eq!(fold_diacritics("Ghulām"), "Ghulam");
  }

  #[test]
  fn is_slug_accepts_only_normalized_tokens() {
    assert!(is_slug("villager-1-english"));
    assert!(!is_slug("Villager"));
    assert!(!is_slug("../../escaped"));
    assert!(!is_slug("-1"));
    assert!(!is_slug(""));
  }

  #[test]
  fn slugify_never_emits_consecutive_hyphens() {
    let slug = slugify("A (b) -- c // D_e");
    assert_eq!(slug, "a-b-c-d-e");
    assert!(!slug.contains("--"));
  }

  #[test]
  fn round_to_removes_float_noise() {
    assert_eq!(round_to(1.125_000_000_1, 2), 1.13);
    assert_eq!(round_to(0.1 + 0.2, 1), 0.3);
    assert_eq!(round_to(f64::NAN, 2), 0.0);
    assert_eq!(round_to(-0.001, 1), 0.0);
    assert!(round_to(-0.001, 1).is_sign_positive());
  }

  #[test]
  fn parse_number_coerces_or_zeroes() {
    assert_eq!(parse_number(" 42 "), 42.0);
    assert_eq!(parse_number("1.5"), 1.5);
    assert_eq!(parse_number(""), 0.0);
    assert_eq!(parse_number("n/a"), 0.0);
    assert_eq!(parse_number("inf"), 0.0);
  }

  #[test]
  fn parenthesis_extraction() {
    assert_eq!(outside_parens("Archer (Longbow)"), "Archer");
    assert_eq!(outside_parens("Man (at) Arms"), "Man Arms");
    assert_eq!(outside_parens("Spearman"), "Spearman");
    assert_eq!(inside_parens("Archer ( Longbow )"), Some("Longbow".into()));
    assert_eq!(inside_parens("Archer ()"), None);
    assert_eq!(inside_parens("Archer"), None);
    assert_eq!(inside_parens("Knight (Royal"), Some("Royal".into()));
  }

  #[test]
  fn interpolate_replaces_known_keys() {
    let out = interpolate("{host}/images/{file}?v={missing}", |key| match key {
      "host" => Some("https://cdn.example".to_string()),
      "file" => Some("archer-2.png".to_string()),
      _ => None,
    });
    assert_eq!(out, "https://cdn.example/images/archer-2.png?v={missing}");
    assert_eq!(interpolate("open {brace", |_| None), "open {brace");
  }
}
