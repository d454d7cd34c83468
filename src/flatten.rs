// src/flatten.rs
//! Option Flattener: one [`FlatRow`] per named option, in source order.
//!
//! The walk is driven by the classified [`CategoryNode`] tree and the feed's
//! [`FeedProfile`]; nothing here knows about a particular manufacturer.

use tracing::warn;

use crate::config::consts::{PATH_SEP, TYPE_SEP};
use crate::config::profile::{FeedProfile, TypeConvention};
use crate::core::normalize_price;
use crate::core::sanitize::fill_template;
use crate::error::{SkipReason, SkippedLeaf};
use crate::loader::Feed;
use crate::model::{CategoryNode, ConfigOption, VehicleModel};

/// One output record. Every field is always populated, possibly empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlatRow {
    pub car: String,
    pub model: String,
    pub base_price: String,
    pub type_label: String,
    pub category: String,
    pub sub_category: String,
    pub price: String,
    pub multi_allowed: bool,
    pub description: String,
    pub image: String,
    pub selected: bool,
    pub disabled: bool,
    pub configuration_name: String,
    pub configurator_url: String,
    pub base_image: String,
    pub swatch_image: String,
    pub car_image: String,
    pub is_default: bool,
}

/// Rows of one feed plus what was left out.
#[derive(Debug, Default)]
pub struct Flattened {
    pub rows: Vec<FlatRow>,
    /// Shape skips from loading followed by unnamed options.
    pub skipped: Vec<SkippedLeaf>,
    /// Options dropped on purpose (`skip_disabled`).
    pub filtered: usize,
}

pub fn flatten_feed(feed: &Feed, profile: &FeedProfile) -> Flattened {
    let mut out = flatten_models(&feed.models, profile);
    let mut skipped = feed.skipped.clone();
    skipped.append(&mut out.skipped);
    out.skipped = skipped;
    out
}

pub fn flatten_models(models: &[VehicleModel], profile: &FeedProfile) -> Flattened {
    let mut out = Flattened::default();
    for model in models {
        let base_price = match model.base_price.as_deref().map(str::trim) {
            None | Some("") => s!(),
            Some(p) if p.eq_ignore_ascii_case("null") => s!(),
            Some(p) => normalize_price(p, &profile.zero_price),
        };
        for cfg in &model.configurations {
            for category in &cfg.categories {
                let mut walker = Walker {
                    profile,
                    model,
                    base_price: &base_price,
                    configuration: &cfg.configuration_name,
                    category: &category.key,
                    category_label: profile.display_label(&category.key),
                    multi_allowed: profile.multi_allowed_for(&category.key),
                    out: &mut out,
                };
                let location = format!("{}{PATH_SEP}{}{PATH_SEP}{}", model.name, cfg.configuration_name, category.key);
                walker.node(&category.node, &mut Vec::new(), &location);
            }
        }
    }
    out
}

/// Walk state for one category of one configuration.
struct Walker<'a> {
    profile: &'a FeedProfile,
    model: &'a VehicleModel,
    base_price: &'a str,
    configuration: &'a str,
    category: &'a str,
    category_label: String,
    multi_allowed: bool,
    out: &'a mut Flattened,
}

impl<'a> Walker<'a> {
    fn node(&mut self, node: &'a CategoryNode, path: &mut Vec<&'a str>, location: &str) {
        match node {
            CategoryNode::OptionList(options) => self.options(options, path, location),
            CategoryNode::GroupedOptions(groups) => {
                for group in groups {
                    path.push(&group.label);
                    self.options(&group.options, path, &format!("{location}{PATH_SEP}{}", group.label));
                    path.pop();
                }
            }
            CategoryNode::NestedGroupedOptions(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    match &branch.label {
                        Some(label) => {
                            path.push(label);
                            self.node(&branch.node, path, &format!("{location}{PATH_SEP}{label}"));
                            path.pop();
                        }
                        None => self.node(&branch.node, path, &format!("{location}{PATH_SEP}{i}")),
                    }
                }
            }
        }
    }

    fn options(&mut self, options: &[ConfigOption], path: &[&str], location: &str) {
        let type_label = self.type_label(path);
        for (i, option) in options.iter().enumerate() {
            let name = match option.name.as_deref() {
                Some(name) => s!(name),
                None if option.toggle && self.profile.toggle_names => {
                    self.profile.display_label(path.last().copied().unwrap_or(self.category))
                }
                None => {
                    let location = format!("{location}{PATH_SEP}{i}");
                    warn!("skipping option without a name at {location}");
                    self.out.skipped.push(SkippedLeaf { location, reason: SkipReason::MissingName });
                    continue;
                }
            };
            if option.disabled && self.profile.skip_disabled {
                self.out.filtered += 1;
                continue;
            }
            let row = self.row(&name, option, &type_label);
            self.out.rows.push(row);
        }
    }

    /// `type` for options found under `path` (group labels, outermost first).
    fn type_label(&self, path: &[&str]) -> String {
        let p = self.profile;
        let keep = p.type_segments.map_or(path.len(), |n| n.min(path.len()));
        let mut parts: Vec<String> = path[..keep].iter().map(|l| p.type_label(l)).collect();

        match p.type_convention {
            TypeConvention::GroupPath if parts.is_empty() => p.type_label(self.category),
            TypeConvention::GroupPath => parts.join(TYPE_SEP),
            TypeConvention::CategoryPath => {
                parts.insert(0, p.type_label(self.category));
                parts.join(TYPE_SEP)
            }
        }
    }

    fn row(&self, name: &str, option: &ConfigOption, type_label: &str) -> FlatRow {
        let model = self.model;
        let description = if !option.description.is_empty() {
            option.description.clone()
        } else if let Some(template) = &self.profile.description_template {
            fill_template(
                template,
                &[
                    ("car", model.car_name()),
                    ("model", &model.name),
                    ("category", &self.category_label),
                    ("type", type_label),
                    ("name", name),
                ],
            )
        } else {
            s!()
        };

        FlatRow {
            car: s!(model.car_name()),
            model: model.name.clone(),
            base_price: s!(self.base_price),
            type_label: s!(type_label),
            category: self.category_label.clone(),
            sub_category: s!(name),
            price: normalize_price(option.price.as_deref().unwrap_or(""), &self.profile.zero_price),
            multi_allowed: self.multi_allowed,
            description,
            image: s!(option.image()),
            selected: option.selected,
            disabled: option.disabled,
            configuration_name: s!(self.configuration),
            configurator_url: model.url.clone(),
            base_image: model.base_image.clone(),
            swatch_image: option.swatch_image.clone(),
            car_image: option.car_image.clone(),
            is_default: option.is_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;
    use std::path::Path;

    fn run(json: &str, profile: &FeedProfile) -> Flattened {
        let feed = load_str(json, Path::new("t.json"), profile, false).unwrap();
        flatten_feed(&feed, profile)
    }

    fn one_category(category: &str, node: &str) -> String {
        format!(r#"[{{"name": "Ghost", "base_price": "$350,000", "categories": {{"{category}": {node}}}}}]"#)
    }

    #[test]
    fn flat_list_rows() {
        let json = one_category(
            "wheels",
            r#"[{"name":"18in Silver","price":"$500","selected":true},{"name":"19in Black","price":"Included","selected":false}]"#,
        );
        let out = run(&json, &FeedProfile::default());
        assert_eq!(out.rows.len(), 2);

        let (a, b) = (&out.rows[0], &out.rows[1]);
        assert_eq!((a.sub_category.as_str(), a.price.as_str(), a.selected), ("18in Silver", "$500", true));
        assert_eq!((b.sub_category.as_str(), b.price.as_str(), b.selected), ("19in Black", "$0", false));
        assert_eq!(a.type_label, "wheels");
        assert_eq!(a.category, "wheels");
        assert_eq!(a.car, "Ghost");
        assert_eq!(a.base_price, "$350000");
        assert_eq!(a.configuration_name, "Default Configuration");
        assert!(!a.multi_allowed);
    }

    #[test]
    fn grouped_type_follows_convention() {
        let json = one_category("interior", r#"{"Seats":[{"name":"Leather","price":"$0"}]}"#);

        let out = run(&json, &FeedProfile::default());
        assert_eq!(out.rows[0].type_label, "Seats");
        assert_eq!(out.rows[0].category, "interior");
        assert_eq!(out.rows[0].sub_category, "Leather");

        let profile = FeedProfile { type_convention: TypeConvention::CategoryPath, ..FeedProfile::default() };
        let out = run(&json, &profile);
        assert_eq!(out.rows[0].type_label, "interior - Seats");
    }

    #[test]
    fn nested_path_and_segment_cap() {
        let json = one_category(
            "interior_environments",
            r#"{"Mayfair": {"Leather": [{"Main": [{"name": "Arctic White"}]}]}}"#,
        );
        let out = run(&json, &FeedProfile::default());
        assert_eq!(out.rows[0].type_label, "Mayfair - Leather - Main");

        let rr = FeedProfile::resolve("rolls-royce").unwrap();
        let out = run(&json, &rr);
        assert_eq!(out.rows[0].type_label, "Mayfair - Leather");
        assert!(out.rows[0].multi_allowed);
    }

    #[test]
    fn unnamed_leaf_is_skipped_siblings_survive() {
        let json = one_category("paint", r#"[{"name":"Black"},{"price":"$900"},{"name":"White"}]"#);
        let out = run(&json, &FeedProfile::default());
        let names: Vec<_> = out.rows.iter().map(|r| r.sub_category.as_str()).collect();
        assert_eq!(names, ["Black", "White"]);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].location, "Ghost/Default Configuration/paint/1");
        assert_eq!(out.skipped[0].reason, SkipReason::MissingName);
    }

    #[test]
    fn toggles_take_their_group_label() {
        let json = r#"[{"name":"750S","categories":{"equipment":{
            "track_brake_upgrade":[{"state":"yes"}],
            "lightweight_titanium_wheel_bolts":[{"state":"no"}]},
            "nose_lift":[{"state":"yes"}]}}]"#;
        let out = run(json, &FeedProfile::resolve("mclaren").unwrap());
        assert!(out.skipped.is_empty());
        let rows: Vec<_> = out.rows.iter().map(|r| (r.sub_category.as_str(), r.selected)).collect();
        assert_eq!(
            rows,
            [("Track Brake Upgrade", true), ("Lightweight Titanium Wheel Bolts", false), ("Nose Lift", true)]
        );
        assert_eq!(out.rows[0].category, "Equipment");
        assert_eq!(out.rows[0].price, "$0");

        // Without the profile switch they are still unnamed.
        let out = run(json, &FeedProfile::default());
        assert!(out.rows.is_empty());
        assert_eq!(out.skipped.len(), 3);
    }

    #[test]
    fn load_skips_come_first() {
        let json = r#"[{"name":"A","categories":{"x":"junk","y":[{"price":"1"}]}}]"#;
        let out = run(json, &FeedProfile::default());
        let reasons: Vec<_> = out.skipped.iter().map(|s| s.reason.clone()).collect();
        assert_eq!(reasons, [SkipReason::UnexpectedShape("string"), SkipReason::MissingName]);
    }

    #[test]
    fn images_and_flags() {
        let json = one_category(
            "brakes",
            r#"[{"name":"Red","brake_image":"chip.png","disabled":"yes","is_default":true},
                {"name":"Black","car_image":"car.png","swatch_image":"sw.png"}]"#,
        );
        let out = run(&json, &FeedProfile::default());
        assert_eq!(out.rows[0].image, "chip.png");
        assert_eq!(out.rows[0].car_image, "");
        assert!(out.rows[0].disabled && out.rows[0].is_default);
        assert_eq!(out.rows[1].image, "car.png");
        assert_eq!(out.rows[1].swatch_image, "sw.png");
    }

    #[test]
    fn skip_disabled_filters() {
        let json = one_category("color", r#"[{"name":"papaya","disabled":true},{"name":"volcano_red"}]"#);
        let out = run(&json, &FeedProfile::resolve("mclaren").unwrap());
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.filtered, 1);
        assert!(out.skipped.is_empty());
        assert_eq!(out.rows[0].type_label, "Exterior Color");
        assert_eq!(out.rows[0].category, "Color");
    }

    #[test]
    fn description_template_fills_blanks() {
        let json = r#"[{"name":"Revuelto","categories":{"optional":[
            {"name":"Carbon Pack"},{"name":"Lift","description":"Front axle lift"}]}}]"#;
        let out = run(json, &FeedProfile::resolve("lamborghini").unwrap());
        assert_eq!(out.rows[0].description, "Revuelto - optional: Carbon Pack");
        assert_eq!(out.rows[1].description, "Front axle lift");
        assert!(!out.rows[0].multi_allowed);
    }

    #[test]
    fn base_price_null_is_blank() {
        let json = r#"[{"name":"A","base_price":"null","categories":{"p":[{"name":"x","price":null}]}},
                       {"name":"B","base_price":null,"categories":{"p":[{"name":"y","price":"null"}]}}]"#;
        let out = run(json, &FeedProfile::default());
        assert!(out.rows.iter().all(|r| r.base_price.is_empty()));
        assert!(out.rows.iter().all(|r| r.price == "$0"));
    }

    #[test]
    fn trims_keep_family_as_car() {
        let json = r#"{"name":"296","trims":[{"name":"GTB","price":"$322,000","specs":{"Exterior":[{"name":"Rosso"}]}}]}"#;
        let out = run(json, &FeedProfile::resolve("ferrari").unwrap());
        assert_eq!(out.rows[0].car, "296");
        assert_eq!(out.rows[0].model, "GTB");
        assert_eq!(out.rows[0].base_price, "$322000");
    }

    #[test]
    fn leaf_count_matches_named_leaves() {
        let json = one_category(
            "mix",
            r#"[{"name":"a"},{"G1":[{"name":"b"},{"name":"c"}]},[{"name":"d"},{"price":"1"}],{"G2":{"H":[{"name":"e"}]}}]"#,
        );
        let feed = load_str(&json, Path::new("t.json"), &FeedProfile::default(), false).unwrap();
        let leaves: usize = feed.models[0].configurations[0].categories.iter().map(|c| c.node.leaf_count()).sum();
        let out = flatten_feed(&feed, &FeedProfile::default());
        assert_eq!(leaves, 6);
        assert_eq!(out.rows.len(), leaves - 1);
        let names: Vec<_> = out.rows.iter().map(|r| r.sub_category.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d", "e"]);
        assert_eq!(out.rows[4].type_label, "G2 - H");
    }
}
