// src/loader.rs
//! Tree Loader: one JSON document → `Vec<VehicleModel>`.
//!
//! Accepted top-level shapes:
//! - a list of model objects (the common case);
//! - a single model object;
//! - a mapping of model name → model object.
//!
//! Model objects may carry their options directly (`categories`, `sections`,
//! `specs`, `data`), as a `configurations` list, or through a `trims` list
//! (possibly nested) in which case every trim becomes its own model with the
//! family name kept as `car`.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::consts::{DEFAULT_CONFIGURATION, PATH_SEP};
use crate::config::profile::FeedProfile;
use crate::error::{FlattenError, SkipReason, SkippedLeaf};
use crate::model::{Category, Configuration, VehicleModel};
use crate::tree::{json_kind, scalar_text, Classifier};

const NAME_KEYS: &[&str] = &["name", "vehicle", "model", "trim_name"];
const PRICE_KEYS: &[&str] = &["base_price", "trim_price", "price"];
const IMAGE_KEYS: &[&str] = &["base_image", "trim_image", "image"];
const URL_KEYS: &[&str] = &["url", "link", "configurator_url"];
const CATEGORY_KEYS: &[&str] = &["categories", "sections", "specs", "data"];
const CONFIG_NAME_KEYS: &[&str] = &["configuration_name", "name"];
const MODEL_KEYS: &[&str] = &[
    "name", "vehicle", "model", "trim_name", "configurations", "trims",
    "categories", "sections", "specs", "data", "base_price", "base_image", "url",
];

/// Stray backslashes before `]` after a `}` (seen in scraped McLaren dumps).
static BACKSLASH_BEFORE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}\\(\s*\])").expect("static regex"));
/// Trailing backslashes in front of `,` `]` `}`.
static BACKSLASH_BEFORE_CLOSER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(\s*[,\]\}])").expect("static regex"));

/// A loaded input file.
#[derive(Debug)]
pub struct Feed {
    pub source: PathBuf,
    pub models: Vec<VehicleModel>,
    /// Nodes dropped while classifying the tree.
    pub skipped: Vec<SkippedLeaf>,
    /// The text only parsed after `repair_json`.
    pub repaired: bool,
}

pub fn load_path(path: &Path, profile: &FeedProfile, repair: bool) -> Result<Feed, FlattenError> {
    let bytes = fs::read(path).map_err(|e| FlattenError::from_read(path, e))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| FlattenError::malformed(path, format!("not valid UTF-8: {e}")))?;
    load_str(&text, path, profile, repair)
}

pub fn load_reader<R: Read>(
    mut reader: R,
    source: &Path,
    profile: &FeedProfile,
    repair: bool,
) -> Result<Feed, FlattenError> {
    let mut text = s!();
    reader
        .read_to_string(&mut text)
        .map_err(|e| FlattenError::from_read(source, e))?;
    load_str(&text, source, profile, repair)
}

pub fn load_str(text: &str, source: &Path, profile: &FeedProfile, repair: bool) -> Result<Feed, FlattenError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let (value, repaired) = parse_json(text, source, repair)?;

    let mut builder = Builder { profile, classifier: Classifier::new(&profile.fields), models: Vec::new() };
    for (fallback, map) in top_level_models(&value, source, &mut builder.classifier)? {
        builder.model(map, fallback, None);
    }
    let Builder { models, classifier, .. } = builder;

    info!("{}: {} model(s)", source.display(), models.len());
    Ok(Feed { source: source.to_path_buf(), models, skipped: classifier.into_skipped(), repaired })
}

/// Strip the backslash defects some scraped dumps contain.
pub fn repair_json(text: &str) -> String {
    let once = BACKSLASH_BEFORE_BRACKET.replace_all(text, "}${1}");
    BACKSLASH_BEFORE_CLOSER.replace_all(&once, "${1}").into_owned()
}

fn parse_json(text: &str, source: &Path, repair: bool) -> Result<(Value, bool), FlattenError> {
    match serde_json::from_str::<Value>(text) {
        Ok(v) => Ok((v, false)),
        Err(err) => {
            if repair {
                let fixed = repair_json(text);
                if let Ok(v) = serde_json::from_str::<Value>(&fixed) {
                    warn!("{}: parsed after removing stray backslashes", source.display());
                    return Ok((v, true));
                }
            }
            Err(FlattenError::malformed(source, describe_parse_error(&err, text)))
        }
    }
}

/// Parser message plus the offending source line, when known.
fn describe_parse_error(err: &serde_json::Error, text: &str) -> String {
    let line_no = err.line();
    let snippet = (line_no > 0)
        .then(|| text.lines().nth(line_no - 1))
        .flatten()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty());
    match snippet {
        Some(line) => {
            let short: String = line.chars().take(80).collect();
            format!("{err}; near `{short}`")
        }
        None => err.to_string(),
    }
}

/// Normalize the three top-level shapes to `(fallback name, model object)` pairs.
fn top_level_models<'v>(
    value: &'v Value,
    source: &Path,
    classifier: &mut Classifier<'_>,
) -> Result<Vec<(Option<String>, &'v Map<String, Value>)>, FlattenError> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Object(map) => out.push((None, map)),
                    other => classifier.note(&format!("[{i}]"), SkipReason::UnexpectedShape(json_kind(other))),
                }
            }
            Ok(out)
        }
        Value::Object(map) if looks_like_model(map) => Ok(vec![(None, map)]),
        Value::Object(map) if !map.is_empty() && map.values().all(Value::is_object) => Ok(map
            .iter()
            .filter_map(|(k, v)| v.as_object().map(|m| (Some(k.clone()), m)))
            .collect()),
        Value::Object(_) => Err(FlattenError::malformed(
            source,
            "top-level object is neither a model nor a mapping of model name to model",
        )),
        other => Err(FlattenError::malformed(
            source,
            format!("top level must be a list or an object, found {}", json_kind(other)),
        )),
    }
}

fn looks_like_model(map: &Map<String, Value>) -> bool {
    MODEL_KEYS.iter().any(|k| map.contains_key(*k))
}

/// What a trim inherits from its family.
struct Parent {
    car: String,
    base_price: Option<String>,
    base_image: String,
    url: String,
}

struct Builder<'p> {
    profile: &'p FeedProfile,
    classifier: Classifier<'p>,
    models: Vec<VehicleModel>,
}

impl Builder<'_> {
    fn model(&mut self, map: &Map<String, Value>, fallback: Option<String>, parent: Option<&Parent>) {
        let index = self.models.len() + 1;
        let name = first_text(map, NAME_KEYS)
            .map(|n| self.profile.strip_model_prefix(&n))
            .or(fallback)
            .unwrap_or_else(|| format!("Model {index}"));

        let base_price = first_text(map, PRICE_KEYS).or_else(|| parent.and_then(|p| p.base_price.clone()));
        let base_image = first_text(map, IMAGE_KEYS)
            .or_else(|| parent.map(|p| p.base_image.clone()))
            .unwrap_or_default();
        let url = first_text(map, URL_KEYS)
            .or_else(|| parent.map(|p| p.url.clone()))
            .unwrap_or_default();

        if let Some(trims) = map.get("trims").and_then(Value::as_array).filter(|t| !t.is_empty()) {
            let family = Parent {
                car: parent.map_or_else(|| name.clone(), |p| p.car.clone()),
                base_price,
                base_image,
                url,
            };
            for (i, trim) in trims.iter().enumerate() {
                match trim {
                    Value::Object(t) => self.model(t, Some(format!("{name} {}", i + 1)), Some(&family)),
                    other => self.classifier_note(
                        &format!("{name}{PATH_SEP}trims{PATH_SEP}{i}"),
                        SkipReason::UnexpectedShape(json_kind(other)),
                    ),
                }
            }
            return;
        }

        let configurations = self.configurations(map, &name);
        if configurations.is_empty() {
            debug!("{name}: no configurations");
        }
        self.models.push(VehicleModel {
            car: parent.map(|p| p.car.clone()),
            name,
            base_price,
            base_image,
            url,
            configurations,
        });
    }

    fn configurations(&mut self, map: &Map<String, Value>, model_name: &str) -> Vec<Configuration> {
        match map.get("configurations") {
            Some(Value::Array(list)) => {
                let mut out = Vec::with_capacity(list.len());
                for (i, item) in list.iter().enumerate() {
                    match item {
                        Value::Object(cfg) => {
                            let cfg_name = first_text(cfg, CONFIG_NAME_KEYS).unwrap_or_else(|| s!(DEFAULT_CONFIGURATION));
                            let categories = self.categories(cfg, model_name, &cfg_name);
                            out.push(Configuration { configuration_name: cfg_name, categories });
                        }
                        other => self.classifier_note(
                            &format!("{model_name}{PATH_SEP}configurations{PATH_SEP}{i}"),
                            SkipReason::UnexpectedShape(json_kind(other)),
                        ),
                    }
                }
                out
            }
            Some(other) => {
                self.classifier_note(
                    &format!("{model_name}{PATH_SEP}configurations"),
                    SkipReason::UnexpectedShape(json_kind(other)),
                );
                Vec::new()
            }
            None if CATEGORY_KEYS.iter().any(|k| map.contains_key(*k)) => {
                let cfg_name = s!(DEFAULT_CONFIGURATION);
                let categories = self.categories(map, model_name, &cfg_name);
                vec![Configuration { configuration_name: cfg_name, categories }]
            }
            None => Vec::new(),
        }
    }

    fn categories(&mut self, holder: &Map<String, Value>, model_name: &str, cfg_name: &str) -> Vec<Category> {
        let base = format!("{model_name}{PATH_SEP}{cfg_name}");
        let Some(value) = CATEGORY_KEYS.iter().filter_map(|k| holder.get(*k)).find(|v| !v.is_null()) else {
            return Vec::new();
        };

        match value {
            Value::Object(map) => {
                let mut out = Vec::with_capacity(map.len());
                for (key, node) in map {
                    let at = format!("{base}{PATH_SEP}{key}");
                    if let Some(node) = self.classifier.classify(node, &at) {
                        out.push(Category { key: key.clone(), node });
                    }
                }
                out
            }
            // A bare list is one category named after its configuration.
            Value::Array(_) => self
                .classifier
                .classify(value, &base)
                .map(|node| vec![Category { key: s!(cfg_name), node }])
                .unwrap_or_default(),
            other => {
                self.classifier_note(&base, SkipReason::UnexpectedShape(json_kind(other)));
                Vec::new()
            }
        }
    }

    fn classifier_note(&mut self, location: &str, reason: SkipReason) {
        self.classifier.note(location, reason);
    }
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .filter_map(scalar_text)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}
