// src/core/sanitize.rs

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&").replace('\u{a0}', " ")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Scraped display text: entities decoded, whitespace collapsed.
pub fn clean_text(s: &str) -> String {
    normalize_ws(&normalize_entities(s))
}

/// `exterior_color` → `Exterior Color`. Each word capitalized, rest lowercased.
pub fn title_case(key: &str) -> String {
    key.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => s!(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Lookup key for category tables: lowercase, `' '`/`'-'`/`'_'` → single `_`.
/// `"Option Packages"`, `"option-packages"` and `"option_packages"` agree.
pub fn table_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_us = true; // suppress leading '_'
    for ch in s.trim().chars() {
        if ch == ' ' || ch == '-' || ch == '_' {
            if !last_us { out.push('_'); last_us = true; }
        } else {
            out.extend(ch.to_lowercase());
            last_us = false;
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Replace `{key}` placeholders. Unknown placeholders are left as-is.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = s!(template);
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}
