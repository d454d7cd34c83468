// src/config/profile.rs
//! Per-feed flattening choices.
//!
//! Every manufacturer feed nests its options a little differently, and feeds
//! disagree on labels and multi-select rules. A [`FeedProfile`] makes those
//! choices explicit instead of baking them into the walker.
//!
//! Profiles are either built in (see [`BUILTIN_PROFILES`]) or read from a JSON
//! file whose missing fields fall back to the `generic` profile.

use std::{collections::BTreeMap, fmt, fs, path::Path, str::FromStr};

use serde::Deserialize;

use super::consts::{DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_PROFILE, ZERO_PRICE};
use crate::core::sanitize::table_key;
use crate::error::FlattenError;

pub const BUILTIN_PROFILES: &[&str] = &[
    "generic", "rolls-royce", "lamborghini", "ferrari", "lincoln", "mclaren", "mini",
];

/// How the `type` column is built from the group labels above an option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeConvention {
    /// Group labels only: `Seats`, `Front - Seats`.
    #[default]
    GroupPath,
    /// Category key first: `interior - Seats`.
    CategoryPath,
}

impl FromStr for TypeConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match table_key(s).as_str() {
            "group_path" | "group" => Ok(TypeConvention::GroupPath),
            "category_path" | "category" => Ok(TypeConvention::CategoryPath),
            other => Err(format!("unknown type convention: {other} (group-path | category-path)")),
        }
    }
}

impl fmt::Display for TypeConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeConvention::GroupPath => write!(f, "group-path"),
            TypeConvention::CategoryPath => write!(f, "category-path"),
        }
    }
}

/// Field names an option record may use, tried in order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    pub name: Vec<String>,
    /// Appended to the name as `name - suffix` when present.
    pub name_suffix: Vec<String>,
    pub price: Vec<String>,
    pub selected: Vec<String>,
    /// Toggle fields holding `"yes"`/`"no"`.
    pub state: Vec<String>,
    pub disabled: Vec<String>,
    pub is_default: Vec<String>,
    pub car_image: Vec<String>,
    pub swatch_image: Vec<String>,
    pub description: Vec<String>,
    /// String lists joined into the description.
    pub features: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            name: strings!["name"],
            name_suffix: Vec::new(),
            price: strings!["price"],
            selected: strings!["selected", "currently_selected", "currently_enabled"],
            state: strings!["state"],
            disabled: strings!["disabled"],
            is_default: strings!["is_default"],
            car_image: strings!["car_image"],
            swatch_image: strings!["swatch_image", "swath_image", "wheel_image", "brake_image", "image"],
            description: strings!["description", "group"],
            features: strings!["features"],
        }
    }
}

impl FieldAliases {
    /// Keys whose presence marks a JSON object as an option record rather
    /// than a mapping of sub-groups.
    pub fn is_option_key(&self, key: &str) -> bool {
        [&self.name, &self.price, &self.selected, &self.state, &self.car_image, &self.swatch_image]
            .iter()
            .any(|list| list.iter().any(|k| k == key))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedProfile {
    pub name: String,
    pub type_convention: TypeConvention,
    /// Keep at most this many group labels in `type` (outermost first).
    pub type_segments: Option<usize>,
    /// Raw group/category label → display label for `type`.
    pub type_aliases: BTreeMap<String, String>,
    /// Render `snake_case` keys as `Title Case` in `type` and `category`.
    pub title_case_labels: bool,
    /// Category key → multiple options may be chosen together.
    pub multi_allowed: BTreeMap<String, bool>,
    pub multi_default: bool,
    pub zero_price: String,
    /// Drop options flagged `disabled` instead of emitting them.
    pub skip_disabled: bool,
    /// Append `swatch image`, `car image`, `is default` after the core columns.
    pub extra_columns: bool,
    /// Fallback description, e.g. `{car} - {type}: {name}`.
    pub description_template: Option<String>,
    /// Name state-only toggle records after their innermost group label,
    /// or the category key when they sit directly in the category.
    pub toggle_names: bool,
    /// Stripped from the front of model names (`2026 Lincoln Reserve` → `Reserve`).
    pub model_prefixes: Vec<String>,
    pub fields: FieldAliases,
    pub default_input: String,
    pub default_output: String,
}

impl Default for FeedProfile {
    fn default() -> Self {
        Self {
            name: s!(DEFAULT_PROFILE),
            type_convention: TypeConvention::GroupPath,
            type_segments: None,
            type_aliases: BTreeMap::new(),
            title_case_labels: false,
            multi_allowed: generic_multi_table(),
            multi_default: false,
            zero_price: s!(ZERO_PRICE),
            skip_disabled: false,
            extra_columns: true,
            description_template: None,
            toggle_names: false,
            model_prefixes: Vec::new(),
            fields: FieldAliases::default(),
            default_input: s!(DEFAULT_INPUT),
            default_output: s!(DEFAULT_OUTPUT),
        }
    }
}

impl FeedProfile {
    /// Built-in profile by name (case/separator-insensitive).
    pub fn builtin(name: &str) -> Option<FeedProfile> {
        let base = FeedProfile::default();
        let profile = match table_key(name).as_str() {
            "generic" => base,
            "rolls_royce" | "rr" => FeedProfile {
                name: s!("rolls-royce"),
                // env - interior type; the colour-list label below it is dropped
                type_segments: Some(2),
                multi_allowed: table(&[
                    ("exterior_style", true),
                    ("interior_environments", true),
                    ("headlining", true),
                    ("seat_options", true),
                    ("veneer_extended_applications", true),
                    ("additional_interior_options", true),
                ]),
                default_input: s!("RR.json"),
                default_output: s!("RR.csv"),
                ..base
            },
            "lamborghini" | "lambo" => {
                let mut multi = generic_multi_table();
                multi.insert(s!("optional"), false);
                multi.insert(s!("carbon"), false);
                multi.insert(s!("alleggerita_package"), false);
                FeedProfile {
                    name: s!("lamborghini"),
                    multi_allowed: multi,
                    description_template: Some(s!("{car} - {type}: {name}")),
                    default_input: s!("lamborghini_car_data.json"),
                    default_output: s!("lamborghini_cars_options.csv"),
                    ..base
                }
            }
            "ferrari" => FeedProfile {
                name: s!("ferrari"),
                default_input: s!("ferrari.json"),
                default_output: s!("ferrari.csv"),
                ..base
            },
            "lincoln" => FeedProfile {
                name: s!("lincoln"),
                type_aliases: aliases(&[
                    ("paint_colors", "Exterior Color"),
                    ("equipment_collections", "Equipment Collection"),
                    ("additional_packages", "Additional Package"),
                    ("engine", "Engine"),
                    ("drive", "Drive Type"),
                    ("transmission", "Transmission"),
                    ("wheels", "Wheels"),
                    ("exterior_options", "Exterior Option"),
                    ("color", "Interior Color"),
                    ("interior_options", "Interior Option"),
                    ("technology", "Tech Feature"),
                    ("entertainment", "Audio System"),
                    ("audio_upgrade", "Audio System"),
                ]),
                model_prefixes: strings!["2026 Lincoln "],
                default_input: s!("lincoln.json"),
                default_output: s!("lincoln_complete.csv"),
                ..base
            },
            "mclaren" => FeedProfile {
                name: s!("mclaren"),
                title_case_labels: true,
                skip_disabled: true,
                toggle_names: true,
                type_aliases: aliases(&[
                    ("color", "Exterior Color"),
                    ("wheels", "Wheel Style"),
                    ("wheel_finish", "Wheel Finish"),
                    ("brakes", "Brake Caliper Colour"),
                ]),
                fields: FieldAliases { name: strings!["name", "language"], ..FieldAliases::default() },
                default_input: s!("mclaren_car_data.json"),
                default_output: s!("mclaren_car_data.csv"),
                ..base
            },
            "mini" | "mini_cooper" => FeedProfile {
                name: s!("mini"),
                type_aliases: aliases(&[
                    ("exterior_colors", "Color"),
                    ("roof_mirror_caps", "Roof & Mirror"),
                    ("liveries_and_dreamlines", "Liveries"),
                    ("options", "Accessories"),
                ]),
                fields: FieldAliases {
                    name_suffix: strings!["style"],
                    description: strings!["description", "group", "style"],
                    ..FieldAliases::default()
                },
                default_input: s!("mini_cooper.json"),
                default_output: s!("mini_cooper.csv"),
                ..base
            },
            _ => return None,
        };
        Some(profile)
    }

    /// Built-in profile or a `Config` error listing the known names.
    pub fn resolve(name: &str) -> Result<FeedProfile, FlattenError> {
        FeedProfile::builtin(name).ok_or_else(|| {
            FlattenError::Config(format!(
                "unknown profile '{name}' (known: {})",
                BUILTIN_PROFILES.join(", ")
            ))
        })
    }

    /// Read a profile from a JSON file. Missing fields take `generic` values.
    pub fn from_file(path: &Path) -> Result<FeedProfile, FlattenError> {
        let text = fs::read_to_string(path)
            .map_err(|e| FlattenError::Config(format!("{}: {e}", path.display())))?;
        let mut profile: FeedProfile = serde_json::from_str(&text)
            .map_err(|e| FlattenError::Config(format!("{}: {e}", path.display())))?;
        if profile.name == DEFAULT_PROFILE {
            if let Some(stem) = path.file_stem() {
                profile.name = stem.to_string_lossy().into_owned();
            }
        }
        Ok(profile)
    }

    pub fn multi_allowed_for(&self, category: &str) -> bool {
        let key = table_key(category);
        self.multi_allowed
            .iter()
            .find(|(k, _)| table_key(k) == key)
            .map(|(_, v)| *v)
            .unwrap_or(self.multi_default)
    }

    /// Display label for one group/category label in `type`.
    pub fn type_label(&self, raw: &str) -> String {
        if let Some(alias) = self.type_aliases.get(raw) {
            return alias.clone();
        }
        let key = table_key(raw);
        if let Some((_, alias)) = self.type_aliases.iter().find(|(k, _)| table_key(k) == key) {
            return alias.clone();
        }
        self.display_label(raw)
    }

    /// `name` without the first matching `model_prefixes` entry. Names that
    /// are nothing but a prefix are kept whole.
    pub fn strip_model_prefix(&self, name: &str) -> String {
        self.model_prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .find_map(|p| name.strip_prefix(p.as_str()))
            .map(str::trim)
            .filter(|rest| !rest.is_empty())
            .map_or_else(|| s!(name), |rest| s!(rest))
    }

    /// Display form of a raw key for the `category` column.
    pub fn display_label(&self, raw: &str) -> String {
        if self.title_case_labels { crate::core::sanitize::title_case(raw) } else { s!(raw) }
    }
}

fn table(pairs: &[(&str, bool)]) -> BTreeMap<String, bool> {
    pairs.iter().map(|(k, v)| (s!(*k), *v)).collect()
}

fn aliases(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (s!(*k), s!(*v))).collect()
}

/// Packs, accessories and equipment groups allow several picks;
/// paint, wheels, trim and interior are single-select.
fn generic_multi_table() -> BTreeMap<String, bool> {
    table(&[
        ("packages", true),
        ("package", true),
        ("option_packages", true),
        ("additional_packages", true),
        ("equipment_collections", true),
        ("accessories", true),
        ("accessory", true),
        ("options", true),
        ("optional", true),
        ("equipment", true),
        ("exterior_options", true),
        ("interior_options", true),
        ("seat_options", true),
        ("additional_interior_options", true),
        ("paint", false),
        ("paint_colors", false),
        ("exterior_color", false),
        ("exterior_colors", false),
        ("wheels", false),
        ("wheel_style", false),
        ("trim", false),
        ("interior", false),
        ("interior_color", false),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_resolves() {
        for name in BUILTIN_PROFILES {
            let p = FeedProfile::resolve(name).unwrap();
            assert_eq!(&p.name, name);
            assert!(!p.default_input.is_empty());
        }
        assert!(FeedProfile::resolve("tesla").is_err());
    }

    #[test]
    fn multi_table_lookup_is_separator_insensitive() {
        let p = FeedProfile::default();
        assert!(p.multi_allowed_for("Option Packages"));
        assert!(p.multi_allowed_for("accessories"));
        assert!(!p.multi_allowed_for("paint_colors"));
        assert!(!p.multi_allowed_for("never_heard_of_it"));
    }

    #[test]
    fn feeds_disagree_on_optional() {
        assert!(FeedProfile::resolve("generic").unwrap().multi_allowed_for("optional"));
        assert!(!FeedProfile::resolve("lamborghini").unwrap().multi_allowed_for("optional"));
    }

    #[test]
    fn type_labels_use_aliases_then_title_case() {
        let mclaren = FeedProfile::resolve("mclaren").unwrap();
        assert_eq!(mclaren.type_label("wheels"), "Wheel Style");
        assert_eq!(mclaren.type_label("tyre_type"), "Tyre Type");
        assert_eq!(mclaren.display_label("safety_and_security"), "Safety And Security");

        let generic = FeedProfile::default();
        assert_eq!(generic.type_label("tyre_type"), "tyre_type");
    }

    #[test]
    fn model_prefix_is_stripped_once() {
        let lincoln = FeedProfile::resolve("lincoln").unwrap();
        assert_eq!(lincoln.strip_model_prefix("2026 Lincoln Reserve"), "Reserve");
        assert_eq!(lincoln.strip_model_prefix("Black Label"), "Black Label");
        assert_eq!(lincoln.strip_model_prefix("2026 Lincoln "), "2026 Lincoln ");
        assert_eq!(FeedProfile::default().strip_model_prefix("2026 Lincoln Reserve"), "2026 Lincoln Reserve");
    }

    #[test]
    fn partial_profile_file_keeps_generic_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.json");
        fs::write(&path, r#"{ "type_convention": "category-path", "zero_price": "0" }"#).unwrap();

        let p = FeedProfile::from_file(&path).unwrap();
        assert_eq!(p.name, "acme");
        assert_eq!(p.type_convention, TypeConvention::CategoryPath);
        assert_eq!(p.zero_price, "0");
        assert!(p.multi_allowed_for("packages"));
        assert_eq!(p.fields, FieldAliases::default());
    }

    #[test]
    fn bad_profile_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "type_convention": "sideways" }"#).unwrap();
        let err = FeedProfile::from_file(&path).unwrap_err();
        assert!(matches!(err, FlattenError::Config(_)));
    }

    #[test]
    fn type_convention_parses_cli_spellings() {
        assert_eq!("group-path".parse::<TypeConvention>().unwrap(), TypeConvention::GroupPath);
        assert_eq!("Category_Path".parse::<TypeConvention>().unwrap(), TypeConvention::CategoryPath);
        assert!("nope".parse::<TypeConvention>().is_err());
    }
}
