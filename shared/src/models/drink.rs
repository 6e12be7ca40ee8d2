//! Drink (menu item) Model

use crate::error::{AppError, AppResult};
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_price,
    validate_required_text,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Image used when a drink is created without one
pub const DEFAULT_DRINK_IMAGE: &str = "https://images.unsplash.com/photo-1509042239860-f550ce710b93";

/// Cup size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Medium, Size::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sugar level
///
/// Older clients stored sugar as a plain boolean. Deserialization accepts
/// that form (`false` -> no sugar, `true` -> one shot); serialization always
/// writes the level string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Sugar {
    #[default]
    NoSugar,
    OneShot,
    TwoShots,
    ThreeShots,
}

impl Sugar {
    pub const ALL: [Sugar; 4] = [Sugar::NoSugar, Sugar::OneShot, Sugar::TwoShots, Sugar::ThreeShots];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sugar::NoSugar => "no_sugar",
            Sugar::OneShot => "1_shot",
            Sugar::TwoShots => "2_shots",
            Sugar::ThreeShots => "3_shots",
        }
    }

    /// Human label ("1 shot"), empty for no sugar
    pub fn label(&self) -> &'static str {
        match self {
            Sugar::NoSugar => "",
            Sugar::OneShot => "1 shot",
            Sugar::TwoShots => "2 shots",
            Sugar::ThreeShots => "3 shots",
        }
    }

    /// Normalize the legacy boolean encoding
    pub fn from_legacy_flag(flag: bool) -> Self {
        if flag { Sugar::OneShot } else { Sugar::NoSugar }
    }
}

impl FromStr for Sugar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_sugar" => Ok(Sugar::NoSugar),
            "1_shot" => Ok(Sugar::OneShot),
            "2_shots" => Ok(Sugar::TwoShots),
            "3_shots" => Ok(Sugar::ThreeShots),
            other => Err(format!("unknown sugar level: {other}")),
        }
    }
}

impl fmt::Display for Sugar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sugar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sugar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Level(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(flag) => Ok(Sugar::from_legacy_flag(flag)),
            Raw::Level(level) => level.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Drink customizations chosen by the customer
///
/// Field order never matters for identity: two values are equal when every
/// field is equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(default)]
pub struct Customizations {
    pub sugar: Sugar,
    pub spiced: bool,
}

impl Customizations {
    pub fn new(sugar: Sugar, spiced: bool) -> Self {
        Self { sugar, spiced }
    }

    /// Canonical key fragment (`sugar|spiced`)
    pub fn canonical_key(&self) -> String {
        format!("{}|{}", self.sugar.as_str(), self.spiced)
    }

    /// Short description, e.g. "2 shots, Spiced"
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.sugar != Sugar::NoSugar {
            parts.push(self.sugar.label());
        }
        if self.spiced {
            parts.push("Spiced");
        }
        parts.join(", ")
    }
}

/// Price of one size
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SizePrice {
    pub size: Size,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Which customizations the drink allows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DrinkOptions {
    pub sugar: bool,
    pub spiced: bool,
}

/// Drink entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Drink {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Menu category (coffee, espresso, cappuccino, tea)
    #[serde(default)]
    pub coffee_type: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub sizes: Vec<SizePrice>,
    #[serde(default)]
    pub options: DrinkOptions,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

impl Drink {
    /// Unit price for a size, if the drink offers it
    pub fn price_for(&self, size: Size) -> Option<Decimal> {
        self.sizes.iter().find(|s| s.size == size).map(|s| s.price)
    }

    /// First listed size (the menu default, usually small)
    pub fn default_size(&self) -> Option<Size> {
        self.sizes.first().map(|s| s.size)
    }
}

/// Create drink payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrinkCreate {
    pub title: String,
    pub description: String,
    pub coffee_type: String,
    pub image: String,
    pub sizes: Vec<SizePrice>,
    pub options: DrinkOptions,
    pub is_available: bool,
}

impl DrinkCreate {
    /// Build the payload the admin menu form submits
    ///
    /// All three sizes are always sent; a blank image falls back to the
    /// house placeholder and both customizations are enabled.
    pub fn from_form(
        title: impl Into<String>,
        description: impl Into<String>,
        coffee_type: impl Into<String>,
        image: Option<String>,
        prices: [Decimal; 3],
    ) -> Self {
        let image = image
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DRINK_IMAGE.to_string());
        let sizes = Size::ALL
            .iter()
            .zip(prices)
            .map(|(size, price)| SizePrice { size: *size, price })
            .collect();

        Self {
            title: title.into(),
            description: description.into(),
            coffee_type: coffee_type.into(),
            image,
            sizes,
            options: DrinkOptions { sugar: true, spiced: true },
            is_available: true,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_required_text(&self.title, "title", MAX_NAME_LEN)?;
        validate_required_text(&self.coffee_type, "coffeeType", MAX_NAME_LEN)?;
        if self.description.len() > MAX_NOTE_LEN {
            return Err(AppError::validation(format!(
                "description is too long ({} chars, max {MAX_NOTE_LEN})",
                self.description.len()
            )));
        }
        if self.image.len() > MAX_URL_LEN {
            return Err(AppError::validation("image URL is too long"));
        }
        if self.sizes.is_empty() {
            return Err(AppError::required("sizes"));
        }
        for s in &self.sizes {
            validate_price(s.price, s.size.as_str())?;
        }
        Ok(())
    }
}

/// Update drink payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrinkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coffee_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<SizePrice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<DrinkOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

impl DrinkUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            validate_required_text(title, "title", MAX_NAME_LEN)?;
        }
        validate_optional_text(&self.description, "description", MAX_NOTE_LEN)?;
        validate_optional_text(&self.image, "image", MAX_URL_LEN)?;
        if let Some(sizes) = &self.sizes {
            for s in sizes {
                validate_price(s.price, s.size.as_str())?;
            }
        }
        Ok(())
    }
}
