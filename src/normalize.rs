//! Value canonicalization for arbitrary exporter JSON.
//!
//! Game-data exports are semi-structured and inconsistently shaped: a
//! "name" may be a bare string, a localized-text macro call
//! (`NSLOCTEXT("ns","key","Display")`), a single-key wrapper object
//! (`{"SourceString": "..."}`), or a tag/path handle. This module turns
//! any JSON-like value into a small set of renderable shapes through an
//! ordered chain of predicate+transform rules over [`serde_json::Value`].
//!
//! Two normal forms exist:
//!
//! - [`normalize_value`] — the search/canonical form. Unbounded depth,
//!   aggressive single-value collapses (wrapper, tag, path, identifier).
//! - [`normalize_value_for_display`] — structure-preserving. Keeps
//!   arrays/objects as structures (wrapper collapse only) and stops
//!   transforming below a fixed depth ceiling so deeply nested export
//!   data cannot blow up rendering cost.
//!
//! All functions are deterministic, side-effect free, and never panic
//! for any JSON input. Malformed exporter output degrades to best-effort
//! text rather than failing the surrounding operation.

use serde_json::{Map, Value};

/// Localized-text call prefixes recognized in the first 16 characters
/// (lowercased) of a string value.
const LOC_PREFIXES: [&str; 3] = ["nsloctext(", "loctext(", "invtext("];

/// Single-key passthrough wrappers. An object whose only key is one of
/// these is semantically equivalent to its inner value. Exporter keys
/// are PascalCase, so the match is exact.
const WRAPPER_KEYS: [&str; 5] = ["Value", "Text", "SourceString", "Name", "Title"];

/// Tag-handle fields, matched case-insensitively.
const TAG_KEYS: [&str; 2] = ["tag", "tags"];

/// Path-handle fields, matched case-insensitively.
const PATH_KEYS: [&str; 4] = ["path", "assetpath", "assetpathname", "objectpath"];

/// Identifier fields, matched case-insensitively. Only collapsed when
/// the object has two keys or fewer (data-table row handles like
/// `{DataTable, RowName}`).
const ID_KEYS: [&str; 3] = ["rowname", "key", "id"];

/// Recursion ceiling for the display form.
const DISPLAY_DEPTH_LIMIT: usize = 5;

/// Inline cap for string arrays in the compact form ([`format_value`]).
const INLINE_ITEMS_COMPACT: usize = 12;

/// Inline cap for string arrays in the display form ([`format_display_value`]).
const INLINE_ITEMS_DISPLAY: usize = 8;

/// Objects with at most this many primitive-valued keys are inlined.
const INLINE_OBJECT_KEYS: usize = 3;

/// Canonicalize a string-valued [`Value`]; everything else passes through.
pub fn pretty_text(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(pretty_str(s)),
        other => other.clone(),
    }
}

/// Turn one raw exporter string into display text.
///
/// Trims, strips exactly one layer of matching quote characters, then
/// either extracts the payload of a localized-text macro call (the
/// *last* double-quoted, escape-aware segment anywhere in the text) or
/// unescapes the string directly (`\n`, `\t`, `\"`, `\\`).
pub fn pretty_str(raw: &str) -> String {
    let mut s = raw.trim();

    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            s = &s[1..s.len() - 1];
        }
    }

    let head: String = s.chars().take(16).collect::<String>().to_lowercase();
    if LOC_PREFIXES.iter().any(|p| head.contains(p)) {
        // Malformed macro output (unterminated quotes, missing args) falls
        // back to the trimmed text unchanged.
        return match last_quoted_segment(s) {
            Some(inner) => unescape(&inner),
            None => s.to_string(),
        };
    }

    unescape(s)
}

/// Canonical (search) form: aggressive collapses, unbounded depth.
pub fn normalize_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(pretty_str(s)),
        Value::Array(items) => normalize_array(items),
        Value::Object(map) => normalize_object(map),
        other => other.clone(),
    }
}

fn normalize_array(items: &[Value]) -> Value {
    let normalized: Vec<Value> = items.iter().map(normalize_value).collect();

    // Collapse attempts, in order: already all strings; all elements
    // carry a tag handle; all elements carry a path handle.
    if normalized.iter().all(Value::is_string) {
        return Value::Array(normalized);
    }
    for keys in [&TAG_KEYS[..], &PATH_KEYS[..]] {
        if let Some(texts) = collapse_elements(items, keys) {
            return Value::Array(texts.into_iter().map(Value::String).collect());
        }
    }

    Value::Array(normalized)
}

fn normalize_object(map: &Map<String, Value>) -> Value {
    if map.len() == 1 {
        let (key, inner) = map.iter().next().expect("len checked");
        if WRAPPER_KEYS.contains(&key.as_str()) {
            return normalize_value(inner);
        }
    }

    if let Some(tag) = keyed_text(map, &TAG_KEYS) {
        return Value::String(tag);
    }
    if let Some(path) = keyed_text(map, &PATH_KEYS) {
        return Value::String(path);
    }
    if map.len() <= 2 {
        if let Some(id) = keyed_text(map, &ID_KEYS) {
            return Value::String(id);
        }
    }

    let mut out = Map::new();
    for (key, value) in map {
        let normalized = normalize_value(value);
        if is_discardable(&normalized) {
            continue;
        }
        out.insert(key.clone(), normalized);
    }
    Value::Object(out)
}

/// Display form: structure-preserving, wrapper collapse only, recursion
/// stops transforming once `depth` reaches the ceiling.
pub fn normalize_value_for_display(value: &Value, depth: usize) -> Value {
    if depth >= DISPLAY_DEPTH_LIMIT {
        return value.clone();
    }
    match value {
        Value::String(s) => Value::String(pretty_str(s)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| normalize_value_for_display(item, depth + 1))
                .collect(),
        ),
        Value::Object(map) => {
            if map.len() == 1 {
                let (key, inner) = map.iter().next().expect("len checked");
                if WRAPPER_KEYS.contains(&key.as_str()) {
                    return normalize_value_for_display(inner, depth);
                }
            }
            let mut out = Map::new();
            for (key, value) in map {
                let normalized = normalize_value_for_display(value, depth + 1);
                if is_discardable(&normalized) {
                    continue;
                }
                out.insert(key.clone(), normalized);
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// Render a normalized value as a single compact string (inline cap 12).
pub fn format_value(value: &Value) -> String {
    format_with_cap(value, INLINE_ITEMS_COMPACT)
}

/// Render a normalized value for record views (inline cap 8).
pub fn format_display_value(value: &Value) -> String {
    format_with_cap(value, INLINE_ITEMS_DISPLAY)
}

fn format_with_cap(value: &Value, max_inline: usize) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let strings: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
            match strings {
                Some(texts) if texts.len() <= max_inline => texts.join(", "),
                Some(texts) => format!(
                    "{} … +{}",
                    texts[..max_inline].join(", "),
                    texts.len() - max_inline
                ),
                None => format!("Array({})", items.len()),
            }
        }
        Value::Object(map) => {
            if map.len() <= INLINE_OBJECT_KEYS && map.values().all(is_primitive) {
                map.iter()
                    .map(|(key, value)| format!("{}: {}", key, format_with_cap(value, max_inline)))
                    .collect::<Vec<_>>()
                    .join(" • ")
            } else {
                format!("Object ({} keys)", map.len())
            }
        }
    }
}

/// Members dropped when rebuilding objects: nulls and empty strings.
fn is_discardable(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Look up `keys` (case-insensitive) in `map` and return the field's
/// unescaped text, if the field holds a string.
fn keyed_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let value = map.iter().find_map(|(key, value)| {
        let lower = key.to_lowercase();
        keys.iter().any(|k| lower == *k).then_some(value)
    })?;
    match value {
        Value::String(s) => Some(pretty_str(s)),
        _ => None,
    }
}

/// Collapse an array when *every* element is an object carrying one of
/// `keys`. Any element that does not qualify cancels the collapse.
fn collapse_elements(items: &[Value], keys: &[&str]) -> Option<Vec<String>> {
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| keyed_text(item.as_object()?, keys))
        .collect()
}

/// Scan for the last complete `"..."` segment, honoring backslash
/// escapes. Returns the raw inner text with escape sequences intact.
fn last_quoted_segment(s: &str) -> Option<String> {
    let mut last: Option<String> = None;
    let mut current: Option<String> = None;
    let mut escaped = false;

    for ch in s.chars() {
        match current {
            Some(ref mut buf) => {
                if escaped {
                    buf.push('\\');
                    buf.push(ch);
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == '"' {
                    last = current.take();
                } else {
                    buf.push(ch);
                }
            }
            None => {
                if ch == '"' {
                    current = Some(String::new());
                }
            }
        }
    }

    last
}

/// Resolve `\n`, `\t`, `\"`, and `\\`. Unknown escapes are kept verbatim.
fn unescape(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_str_plain() {
        assert_eq!(pretty_str("plain"), "plain");
        assert_eq!(pretty_str("  padded  "), "padded");
    }

    #[test]
    fn test_pretty_str_strips_one_quote_layer() {
        assert_eq!(pretty_str("\"quoted\""), "quoted");
        assert_eq!(pretty_str("'single'"), "single");
        assert_eq!(pretty_str("\"\"double-wrapped\"\""), "\"double-wrapped\"");
    }

    #[test]
    fn test_pretty_str_nsloctext() {
        assert_eq!(
            pretty_str("NSLOCTEXT(\"ns\",\"key\",\"Hello \\\"World\\\"\")"),
            "Hello \"World\""
        );
        assert_eq!(pretty_str("LOCTEXT(\"key\", \"Iron Sword\")"), "Iron Sword");
        assert_eq!(pretty_str("INVTEXT(\"Literal\")"), "Literal");
    }

    #[test]
    fn test_pretty_str_loc_case_insensitive() {
        assert_eq!(pretty_str("nsloctext(\"a\",\"b\",\"c\")"), "c");
    }

    #[test]
    fn test_pretty_str_malformed_macro_degrades() {
        // No quoted payload at all: fall back to the trimmed text.
        assert_eq!(pretty_str("NSLOCTEXT(broken"), "NSLOCTEXT(broken");
        // Unterminated final quote: the last complete segment wins.
        assert_eq!(pretty_str("NSLOCTEXT(\"ns\",\"key\",\"trailing"), "key");
    }

    #[test]
    fn test_pretty_str_unescapes() {
        assert_eq!(pretty_str("line\\none"), "line\none");
        assert_eq!(pretty_str("tab\\there"), "tab\there");
        assert_eq!(pretty_str("back\\\\slash"), "back\\slash");
        assert_eq!(pretty_str("odd\\zkeep"), "odd\\zkeep");
    }

    #[test]
    fn test_pretty_text_passes_non_strings() {
        assert_eq!(pretty_text(&json!(42)), json!(42));
        assert_eq!(pretty_text(&json!(true)), json!(true));
        assert_eq!(pretty_text(&json!(null)), json!(null));
    }

    #[test]
    fn test_normalize_wrapper_collapse() {
        assert_eq!(
            normalize_value(&json!({"SourceString": "Iron Sword"})),
            json!("Iron Sword")
        );
        assert_eq!(normalize_value(&json!({"Value": 7})), json!(7));
        // Nested wrappers collapse all the way down.
        assert_eq!(
            normalize_value(&json!({"Text": {"SourceString": "Deep"}})),
            json!("Deep")
        );
        // Two keys is not a wrapper.
        let two = json!({"Value": 1, "Other": 2});
        assert!(normalize_value(&two).is_object());
    }

    #[test]
    fn test_normalize_tag_and_path_fields() {
        assert_eq!(
            normalize_value(&json!({"Tag": "Weapon.Sword", "Extra": 1, "More": 2})),
            json!("Weapon.Sword")
        );
        assert_eq!(
            normalize_value(&json!({"AssetPathName": "/Game/Items/Sword", "X": 1, "Y": 2})),
            json!("/Game/Items/Sword")
        );
    }

    #[test]
    fn test_normalize_identifier_collapse_needs_small_object() {
        // Row handle: two keys, one of them an identifier.
        assert_eq!(
            normalize_value(&json!({"DataTable": "DT_Items", "RowName": "sword_01"})),
            json!("sword_01")
        );
        // Three keys: no collapse.
        let big = json!({"RowName": "x", "A": 1, "B": 2});
        assert!(normalize_value(&big).is_object());
    }

    #[test]
    fn test_normalize_array_tag_collapse() {
        let tags = json!([
            {"Tag": "Buff.Strength", "Weight": 1},
            {"Tag": "Buff.Speed", "Weight": 2}
        ]);
        assert_eq!(
            normalize_value(&tags),
            json!(["Buff.Strength", "Buff.Speed"])
        );
        // One element without a tag cancels the collapse.
        let mixed = json!([{"Tag": "A", "W": 1}, {"Weight": 2, "X": 3}]);
        assert!(normalize_value(&mixed).as_array().unwrap()[1].is_object());
    }

    #[test]
    fn test_normalize_drops_null_and_empty_members() {
        let record = json!({"Name": "Axe", "Junk": null, "Blank": "", "Weight": 0});
        let out = normalize_value(&record);
        let map = out.as_object().unwrap();
        assert!(map.contains_key("Name"));
        assert!(!map.contains_key("Junk"));
        assert!(!map.contains_key("Blank"));
        // Zero is a value, not an empty sentinel.
        assert_eq!(map.get("Weight"), Some(&json!(0)));
    }

    #[test]
    fn test_display_form_keeps_structure() {
        let handle = json!({"DataTable": "DT", "RowName": "row"});
        // Canonical form collapses, display form does not.
        assert!(normalize_value(&handle).is_string());
        assert!(normalize_value_for_display(&handle, 0).is_object());
        // Wrapper collapse still applies.
        assert_eq!(
            normalize_value_for_display(&json!({"Text": "hello"}), 0),
            json!("hello")
        );
    }

    #[test]
    fn test_display_form_depth_ceiling() {
        let deep = json!({"a": {"b": {"c": {"d": {"e": {"f": "NSLOCTEXT(\"n\",\"k\",\"v\")"}}}}}});
        let out = normalize_value_for_display(&deep, 0);
        // Below the ceiling the macro string is left untouched.
        let leaf = &out["a"]["b"]["c"]["d"]["e"]["f"];
        assert_eq!(leaf, &json!("NSLOCTEXT(\"n\",\"k\",\"v\")"));
    }

    #[test]
    fn test_format_string_array_inline_and_truncated() {
        let small = json!(["a", "b", "c"]);
        assert_eq!(format_value(&small), "a, b, c");

        let items: Vec<Value> = (0..15).map(|i| json!(format!("t{}", i))).collect();
        let big = Value::Array(items);
        let compact = format_value(&big);
        assert!(compact.ends_with("… +3"), "got: {}", compact);
        let display = format_display_value(&big);
        assert!(display.ends_with("… +7"), "got: {}", display);
    }

    #[test]
    fn test_format_mixed_array_placeholder() {
        assert_eq!(format_value(&json!([1, "a", true])), "Array(3)");
    }

    #[test]
    fn test_format_object_inline_and_placeholder() {
        let small = json!({"Damage": 12, "Speed": 1.5});
        assert_eq!(format_value(&small), "Damage: 12 • Speed: 1.5");

        let nested = json!({"Damage": {"Min": 1}});
        assert_eq!(format_value(&nested), "Object (1 keys)");

        let wide = json!({"a": 1, "b": 2, "c": 3, "d": 4});
        assert_eq!(format_value(&wide), "Object (4 keys)");
    }

    #[test]
    fn test_format_primitives() {
        assert_eq!(format_value(&json!("text")), "text");
        assert_eq!(format_value(&json!(3)), "3");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!(null)), "");
    }

    #[test]
    fn test_normalize_never_panics_on_awkward_shapes() {
        for value in [
            json!([]),
            json!({}),
            json!([[[[[[["deep"]]]]]]]),
            json!({"Tag": 42, "Other": 1}),
            json!({"": ""}),
        ] {
            let _ = normalize_value(&value);
            let _ = normalize_value_for_display(&value, 0);
            let _ = format_value(&normalize_value(&value));
        }
    }
}
