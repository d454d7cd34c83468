// src/model.rs
//
// Typed option tree. The loader builds it from JSON; the flattener walks it.
// Nothing here is mutated after load.

/// One car line / trim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VehicleModel {
    /// Trim or model display name; the `model` column.
    pub name: String,
    /// Family name when this model came from a `trims` list; the `car` column.
    /// `None` means `car` repeats `name`.
    pub car: Option<String>,
    /// Raw sticker price. `None` when the feed has no price or an explicit null.
    pub base_price: Option<String>,
    pub base_image: String,
    pub url: String,
    pub configurations: Vec<Configuration>,
}

impl VehicleModel {
    pub fn car_name(&self) -> &str {
        self.car.as_deref().unwrap_or(&self.name)
    }
}

/// Named snapshot of a model's option tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Configuration {
    pub configuration_name: String,
    /// Source order is kept.
    pub categories: Vec<Category>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub node: CategoryNode,
}

/// The three structural meanings a feed encodes with lists and mappings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryNode {
    /// Plain list of options (paint colours, wheels).
    OptionList(Vec<ConfigOption>),
    /// Sub-group label → options (interior → seats/trim).
    GroupedOptions(Vec<OptionGroup>),
    /// Deeper or mixed nesting (environment → trim type → colours).
    NestedGroupedOptions(Vec<Branch>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionGroup {
    pub label: String,
    pub options: Vec<ConfigOption>,
}

/// One child of a nested node. `label` is `None` for list wrappers, which
/// add nothing to the `type` path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Branch {
    pub label: Option<String>,
    pub node: CategoryNode,
}

impl CategoryNode {
    /// Option records reachable from this node, named or not.
    pub fn leaf_count(&self) -> usize {
        match self {
            CategoryNode::OptionList(options) => options.len(),
            CategoryNode::GroupedOptions(groups) => groups.iter().map(|g| g.options.len()).sum(),
            CategoryNode::NestedGroupedOptions(branches) => branches.iter().map(|b| b.node.leaf_count()).sum(),
        }
    }
}

/// A single selectable choice, as found in the feed.
///
/// `name` stays optional here: dropping unnamed records is the flattener's
/// call, so that it can report them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOption {
    pub name: Option<String>,
    /// Raw price text; `None` when absent or null.
    pub price: Option<String>,
    pub selected: bool,
    /// Nameless on/off record carrying only a state field.
    pub toggle: bool,
    pub disabled: bool,
    pub is_default: bool,
    pub car_image: String,
    pub swatch_image: String,
    pub description: String,
}

impl ConfigOption {
    /// `car_image` when present, otherwise `swatch_image`.
    pub fn image(&self) -> &str {
        if self.car_image.is_empty() { &self.swatch_image } else { &self.car_image }
    }
}
