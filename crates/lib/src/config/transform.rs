//! Location-based rewriting of configuration strings.
//!
//! A location is a dot-separated list of steps:
//! - a plain name descends into that key of a mapping
//! - `[]` (on its own or suffixed to a name) visits every element of an array
//! - `*` visits every value of a mapping
//!
//! e.g. `activations.[].scripts.[]` or `icons.*`. Only string leaves are
//! rewritten; missing keys and mismatched shapes are skipped.

use serde_json::Value;

#[derive(Debug, PartialEq, Eq)]
enum Step<'a> {
  Key(&'a str),
  EachElement,
  EachValue,
}

fn steps(location: &str) -> Vec<Step<'_>> {
  let mut out = Vec::new();
  for part in location.split('.').filter(|p| !p.is_empty()) {
    match part {
      "[]" => out.push(Step::EachElement),
      "*" => out.push(Step::EachValue),
      _ => match part.strip_suffix("[]") {
        Some(name) => {
          out.push(Step::Key(name));
          out.push(Step::EachElement);
        }
        None => out.push(Step::Key(part)),
      },
    }
  }
  out
}

pub(super) fn apply(root: &mut Value, location: &str, f: &mut dyn FnMut(&str) -> String) {
  let steps = steps(location);
  visit(root, &steps, f);
}

fn visit(value: &mut Value, steps: &[Step<'_>], f: &mut dyn FnMut(&str) -> String) {
  let Some((step, rest)) = steps.split_first() else {
    if let Value::String(s) = value {
      *s = f(s);
    }
    return;
  };
  match (step, value) {
    (Step::Key(key), Value::Object(map)) => {
      if let Some(child) = map.get_mut(*key) {
        visit(child, rest, f);
      }
    }
    (Step::EachElement, Value::Array(items)) => {
      for item in items {
        visit(item, rest, f);
      }
    }
    (Step::EachValue, Value::Object(map)) => {
      for child in map.values_mut() {
        visit(child, rest, f);
      }
    }
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn upper(s: &str) -> String {
    s.to_uppercase()
  }

  #[test]
  fn parses_steps() {
    assert_eq!(
      steps("activations.[].scripts[]"),
      vec![
        Step::Key("activations"),
        Step::EachElement,
        Step::Key("scripts"),
        Step::EachElement
      ]
    );
    assert_eq!(steps("icons.*"), vec![Step::Key("icons"), Step::EachValue]);
  }

  #[test]
  fn rewrites_nested_arrays() {
    let mut value = json!({
      "activations": [
        { "scripts": ["a.js", "b.js"], "styles": ["c.css"] },
        { "scripts": ["d.js"] }
      ]
    });
    apply(&mut value, "activations.[].scripts.[]", &mut upper);
    assert_eq!(
      value,
      json!({
        "activations": [
          { "scripts": ["A.JS", "B.JS"], "styles": ["c.css"] },
          { "scripts": ["D.JS"] }
        ]
      })
    );
  }

  #[test]
  fn rewrites_every_mapping_value() {
    let mut value = json!({ "icons": { "16": "x.png", "32": "y.png" }, "name": "n" });
    apply(&mut value, "icons.*", &mut upper);
    assert_eq!(value, json!({ "icons": { "16": "X.PNG", "32": "Y.PNG" }, "name": "n" }));
  }

  #[test]
  fn missing_keys_and_non_strings_are_skipped() {
    let mut value = json!({ "browser_action": { "default_icon": 3 } });
    let before = value.clone();
    apply(&mut value, "browser_action.default_icon", &mut upper);
    apply(&mut value, "page_action.default_popup", &mut upper);
    assert_eq!(value, before);
  }
}
