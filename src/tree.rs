// src/tree.rs
//! Classification of raw JSON category values into [`CategoryNode`].
//!
//! Feeds reuse the same list/mapping vocabulary for three different
//! meanings. This pass decides, once, which one a node is:
//!
//! - a **list** of option records → `OptionList`;
//! - a **mapping** of labels to option lists → `GroupedOptions`;
//! - anything deeper or mixed → `NestedGroupedOptions`.
//!
//! A JSON object is an option record when it carries one of the profile's
//! option keys (`name`, `price`, `selected`, image fields…); otherwise it is a
//! mapping of sub-groups. Lists may hold such mappings
//! (`[{"Main Colour": [...]}, {"Accent Colour": [...]}]`); the list itself adds
//! no label to the path.
//!
//! Scalars where a node is expected are dropped and recorded as
//! [`SkippedLeaf`]s. Nothing here fails.

use std::mem::take;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::consts::{FEATURES_SEP, PATH_SEP, TYPE_SEP};
use crate::config::profile::FieldAliases;
use crate::core::sanitize::clean_text;
use crate::error::{SkipReason, SkippedLeaf};
use crate::model::{Branch, CategoryNode, ConfigOption, OptionGroup};

pub struct Classifier<'a> {
    fields: &'a FieldAliases,
    skipped: Vec<SkippedLeaf>,
}

impl<'a> Classifier<'a> {
    pub fn new(fields: &'a FieldAliases) -> Self {
        Self { fields, skipped: Vec::new() }
    }

    /// Skips recorded so far, in encounter order.
    pub fn into_skipped(self) -> Vec<SkippedLeaf> {
        self.skipped
    }

    /// Classify one category value. `None` when the value has no usable shape.
    pub fn classify(&mut self, value: &Value, location: &str) -> Option<CategoryNode> {
        match value {
            Value::Array(items) => Some(self.classify_list(items, location)),
            Value::Object(map) if map.is_empty() => {
                self.note(location, SkipReason::UnexpectedShape("empty object"));
                None
            }
            Value::Object(map) if self.is_option(map) => {
                Some(CategoryNode::OptionList(vec![self.parse_option(map)]))
            }
            Value::Object(map) => Some(self.classify_mapping(map, location)),
            other => {
                self.note(location, SkipReason::UnexpectedShape(json_kind(other)));
                None
            }
        }
    }

    fn classify_list(&mut self, items: &[Value], location: &str) -> CategoryNode {
        let mut run: Vec<ConfigOption> = Vec::new();
        let mut branches: Vec<Branch> = Vec::new();

        for (i, item) in items.iter().enumerate() {
            let here = format!("{location}{PATH_SEP}{i}");
            match item {
                Value::Object(map) if map.is_empty() => {
                    self.note(&here, SkipReason::UnexpectedShape("empty object"));
                }
                Value::Object(map) if self.is_option(map) => run.push(self.parse_option(map)),
                Value::Object(map) => {
                    flush_run(&mut run, &mut branches);
                    for (key, value) in map {
                        let at = format!("{here}{PATH_SEP}{key}");
                        if let Some(node) = self.classify(value, &at) {
                            branches.push(Branch { label: Some(key.clone()), node });
                        }
                    }
                }
                Value::Array(inner) => {
                    flush_run(&mut run, &mut branches);
                    let node = self.classify_list(inner, &here);
                    branches.push(Branch { label: None, node });
                }
                other => self.note(&here, SkipReason::UnexpectedShape(json_kind(other))),
            }
        }

        if branches.is_empty() {
            CategoryNode::OptionList(run)
        } else {
            flush_run(&mut run, &mut branches);
            CategoryNode::NestedGroupedOptions(branches)
        }
    }

    fn classify_mapping(&mut self, map: &Map<String, Value>, location: &str) -> CategoryNode {
        let mut children: Vec<(String, CategoryNode)> = Vec::with_capacity(map.len());
        for (key, value) in map {
            let at = format!("{location}{PATH_SEP}{key}");
            if let Some(node) = self.classify(value, &at) {
                children.push((key.clone(), node));
            }
        }

        if children.iter().all(|(_, node)| matches!(node, CategoryNode::OptionList(_))) {
            let groups = children
                .into_iter()
                .filter_map(|(label, node)| match node {
                    CategoryNode::OptionList(options) => Some(OptionGroup { label, options }),
                    _ => None,
                })
                .collect();
            CategoryNode::GroupedOptions(groups)
        } else {
            let branches = children
                .into_iter()
                .map(|(label, node)| Branch { label: Some(label), node })
                .collect();
            CategoryNode::NestedGroupedOptions(branches)
        }
    }

    fn is_option(&self, map: &Map<String, Value>) -> bool {
        map.keys().any(|k| self.fields.is_option_key(k))
    }

    /// Read an option record through the alias lists. Never fails;
    /// missing fields take their defaults.
    pub fn parse_option(&self, map: &Map<String, Value>) -> ConfigOption {
        let f = self.fields;

        let name = first(map, &f.name)
            .and_then(scalar_text)
            .map(|s| clean_text(&s))
            .filter(|s| !s.is_empty())
            .map(|name| match first_text(map, &f.name_suffix).map(|s| clean_text(&s)) {
                Some(suffix) if !suffix.is_empty() => format!("{name}{TYPE_SEP}{suffix}"),
                _ => name,
            });
        let toggle = name.is_none()
            && map.keys().all(|k| f.state.iter().any(|s| s == k))
            && first(map, &f.state).is_some();

        let price = first(map, &f.price).and_then(scalar_text);

        let selected = match first(map, &f.selected) {
            Some(v) => truthy(v),
            None => first(map, &f.state).is_some_and(truthy),
        };

        let description = first_text(map, &f.description)
            .map(|s| clean_text(&s))
            .or_else(|| {
                let features: Vec<String> = first(map, &f.features)?
                    .as_array()?
                    .iter()
                    .filter_map(scalar_text)
                    .map(|s| clean_text(&s))
                    .filter(|s| !s.is_empty())
                    .collect();
                (!features.is_empty()).then(|| features.join(FEATURES_SEP))
            })
            .unwrap_or_default();

        ConfigOption {
            name,
            price,
            selected,
            toggle,
            disabled: first(map, &f.disabled).is_some_and(truthy),
            is_default: first(map, &f.is_default).is_some_and(truthy),
            car_image: first_text(map, &f.car_image).unwrap_or_default(),
            swatch_image: first_text(map, &f.swatch_image).unwrap_or_default(),
            description,
        }
    }

    /// Record a dropped node.
    pub fn note(&mut self, location: &str, reason: SkipReason) {
        debug!("skipping {location}: {reason}");
        self.skipped.push(SkippedLeaf { location: s!(location), reason });
    }
}

fn flush_run(run: &mut Vec<ConfigOption>, branches: &mut Vec<Branch>) {
    if !run.is_empty() {
        branches.push(Branch { label: None, node: CategoryNode::OptionList(take(run)) });
    }
}

/// First alias present with a non-null value.
fn first<'v>(map: &'v Map<String, Value>, aliases: &[String]) -> Option<&'v Value> {
    aliases.iter().filter_map(|k| map.get(k)).find(|v| !v.is_null())
}

/// First alias holding non-empty text.
fn first_text(map: &Map<String, Value>, aliases: &[String]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|k| map.get(k))
        .filter_map(scalar_text)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Strings and numbers as text; everything else has no text form.
pub fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JSON booleans, and `yes`/`true`/`y`/`1` strings, and non-zero numbers.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "y" | "true" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        _ => false,
    }
}

pub fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(v: Value) -> (Option<CategoryNode>, Vec<SkippedLeaf>) {
        let fields = FieldAliases::default();
        let mut c = Classifier::new(&fields);
        let node = c.classify(&v, "m/c/cat");
        (node, c.into_skipped())
    }

    fn names(options: &[ConfigOption]) -> Vec<&str> {
        options.iter().map(|o| o.name.as_deref().unwrap_or("?")).collect()
    }

    #[test]
    fn flat_list_is_option_list() {
        let (node, skipped) = classify(json!([
            {"name": "18in Silver", "price": "$500", "selected": true},
            {"name": "19in Black", "price": "Included"}
        ]));
        match node {
            Some(CategoryNode::OptionList(opts)) => {
                assert_eq!(names(&opts), ["18in Silver", "19in Black"]);
                assert!(opts[0].selected);
                assert_eq!(opts[1].price.as_deref(), Some("Included"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(skipped.is_empty());
    }

    #[test]
    fn mapping_of_lists_is_grouped() {
        let (node, _) = classify(json!({"Seats": [{"name": "Leather", "price": "$0"}], "Trim": []}));
        match node {
            Some(CategoryNode::GroupedOptions(groups)) => {
                assert_eq!(groups.len(), 2);
                assert_eq!(groups[0].label, "Seats");
                assert_eq!(names(&groups[0].options), ["Leather"]);
                assert!(groups[1].options.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn double_mapping_is_nested() {
        let (node, _) = classify(json!({"Front": {"Seats": [{"name": "Leather"}]}}));
        let Some(CategoryNode::NestedGroupedOptions(branches)) = node else { panic!("not nested") };
        assert_eq!(branches[0].label.as_deref(), Some("Front"));
        assert!(matches!(branches[0].node, CategoryNode::GroupedOptions(_)));
    }

    #[test]
    fn list_of_group_mappings_is_nested_without_list_label() {
        let (node, _) = classify(json!([
            {"Main Exterior Colour": [{"name": "Lyrical Copper"}]},
            {"Contrast Exterior Colour": [{"name": "Darkest Tungsten"}]}
        ]));
        let Some(CategoryNode::NestedGroupedOptions(branches)) = node else { panic!("not nested") };
        let labels: Vec<_> = branches.iter().map(|b| b.label.as_deref()).collect();
        assert_eq!(labels, [Some("Main Exterior Colour"), Some("Contrast Exterior Colour")]);
    }

    #[test]
    fn mixed_list_keeps_order() {
        let (node, _) = classify(json!([
            {"name": "A"},
            {"Extra": [{"name": "B"}]},
            {"name": "C"}
        ]));
        let Some(CategoryNode::NestedGroupedOptions(branches)) = node else { panic!("not nested") };
        assert_eq!(branches.len(), 3);
        assert_eq!(branches[0].label, None);
        assert_eq!(branches[1].label.as_deref(), Some("Extra"));
        assert_eq!(branches[2].label, None);
        assert_eq!(CategoryNode::NestedGroupedOptions(branches).leaf_count(), 3);
    }

    #[test]
    fn scalars_are_skipped_not_fatal() {
        let (node, skipped) = classify(json!([{"name": "A"}, "stray text", 42, null]));
        let Some(CategoryNode::OptionList(opts)) = node else { panic!("not a list") };
        assert_eq!(opts.len(), 1);
        assert_eq!(skipped.len(), 3);
        assert_eq!(skipped[0].location, "m/c/cat/1");
        assert_eq!(skipped[0].reason, SkipReason::UnexpectedShape("string"));

        let (node, skipped) = classify(json!("Included"));
        assert!(node.is_none());
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn option_without_name_is_kept_for_the_flattener() {
        let (node, skipped) = classify(json!([{"price": "$5"}, {"name": "  "}]));
        let Some(CategoryNode::OptionList(opts)) = node else { panic!("not a list") };
        assert_eq!(opts.len(), 2);
        assert!(opts.iter().all(|o| o.name.is_none()));
        assert!(skipped.is_empty());
    }

    #[test]
    fn aliases_and_coercions() {
        let fields = FieldAliases::default();
        let c = Classifier::new(&fields);
        let v = json!({
            "name": "Papaya&nbsp;Orange",
            "price": 4850,
            "currently_selected": "Yes",
            "is_default": 1,
            "swath_image": "chip.png",
            "features": ["Heated seats", "  ", "Ambient lighting"]
        });
        let o = c.parse_option(v.as_object().unwrap());
        assert_eq!(o.name.as_deref(), Some("Papaya Orange"));
        assert_eq!(o.price.as_deref(), Some("4850"));
        assert!(o.selected && o.is_default && !o.disabled);
        assert_eq!(o.image(), "chip.png");
        assert_eq!(o.description, "Heated seats, Ambient lighting");

        let toggle = json!({"state": "yes"});
        let o = c.parse_option(toggle.as_object().unwrap());
        assert!(o.selected && o.toggle && o.name.is_none());

        let priced = json!({"state": "no", "price": "$5"});
        assert!(!c.parse_option(priced.as_object().unwrap()).toggle);
    }

    #[test]
    fn name_suffix_joins_the_name() {
        let fields = FieldAliases { name_suffix: strings!["style"], ..FieldAliases::default() };
        let c = Classifier::new(&fields);
        let styled = json!({"name": "Classic", "style": "Chrome Line"});
        assert_eq!(c.parse_option(styled.as_object().unwrap()).name.as_deref(), Some("Classic - Chrome Line"));
        let plain = json!({"name": "Favoured", "style": ""});
        assert_eq!(c.parse_option(plain.as_object().unwrap()).name.as_deref(), Some("Favoured"));
    }
}
