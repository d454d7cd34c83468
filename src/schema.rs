// src/schema.rs
use crate::config::profile::FeedProfile;
use crate::flatten::FlatRow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Car,
    Model,
    BasePrice,
    Type,
    Category,
    SubCategory,
    Price,
    MultiAllowed,
    Description,
    Image,
    Selected,
    Disabled,
    ConfigurationName,
    ConfiguratorUrl,
    BaseImage,
    SwatchImage,
    CarImage,
    IsDefault,
}

/// The cross-manufacturer columns, in their fixed order.
pub const CORE_COLUMNS: [Column; 15] = [
    Column::Car,
    Column::Model,
    Column::BasePrice,
    Column::Type,
    Column::Category,
    Column::SubCategory,
    Column::Price,
    Column::MultiAllowed,
    Column::Description,
    Column::Image,
    Column::Selected,
    Column::Disabled,
    Column::ConfigurationName,
    Column::ConfiguratorUrl,
    Column::BaseImage,
];

pub const EXTRA_COLUMNS: [Column; 3] = [Column::SwatchImage, Column::CarImage, Column::IsDefault];

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::Car => "car",
            Column::Model => "model",
            Column::BasePrice => "base price of car",
            Column::Type => "type",
            Column::Category => "category",
            Column::SubCategory => "sub category",
            Column::Price => "price",
            Column::MultiAllowed => "multi allowed",
            Column::Description => "description",
            Column::Image => "image",
            Column::Selected => "selected",
            Column::Disabled => "disabled",
            Column::ConfigurationName => "configuration_name",
            Column::ConfiguratorUrl => "configurator_url",
            Column::BaseImage => "base_image",
            Column::SwatchImage => "swatch image",
            Column::CarImage => "car image",
            Column::IsDefault => "is default",
        }
    }
}

/// Column set for one run. Fixed before the first row is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn core() -> Self {
        Self { columns: CORE_COLUMNS.to_vec() }
    }

    pub fn extended() -> Self {
        let mut columns = CORE_COLUMNS.to_vec();
        columns.extend(EXTRA_COLUMNS);
        Self { columns }
    }

    pub fn for_profile(profile: &FeedProfile, core_only: bool) -> Self {
        if core_only || !profile.extra_columns { Self::core() } else { Self::extended() }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.header())
    }

    /// One cell per column, in column order.
    pub fn record<'r>(&'r self, row: &'r FlatRow) -> impl Iterator<Item = &'r str> + 'r {
        self.columns.iter().map(move |c| row.cell(*c))
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn true_false(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

impl FlatRow {
    pub fn cell(&self, column: Column) -> &str {
        match column {
            Column::Car => &self.car,
            Column::Model => &self.model,
            Column::BasePrice => &self.base_price,
            Column::Type => &self.type_label,
            Column::Category => &self.category,
            Column::SubCategory => &self.sub_category,
            Column::Price => &self.price,
            Column::MultiAllowed => yes_no(self.multi_allowed),
            Column::Description => &self.description,
            Column::Image => &self.image,
            Column::Selected => true_false(self.selected),
            Column::Disabled => true_false(self.disabled),
            Column::ConfigurationName => &self.configuration_name,
            Column::ConfiguratorUrl => &self.configurator_url,
            Column::BaseImage => &self.base_image,
            Column::SwatchImage => &self.swatch_image,
            Column::CarImage => &self.car_image,
            Column::IsDefault => true_false(self.is_default),
        }
    }
}
