use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type WhiskeyId = i64;
pub type OwnerId = i64;

/// Whiskey categories accepted on create, update and import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiskeyType {
    Bourbon,
    Rye,
    Scotch,
    Tennessee,
    Canadian,
    Irish,
    Japanese,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid whiskey type \"{0}\"")]
pub struct UnknownWhiskeyType(pub String);

impl WhiskeyType {
    pub const ALL: [WhiskeyType; 8] = [
        WhiskeyType::Bourbon,
        WhiskeyType::Rye,
        WhiskeyType::Scotch,
        WhiskeyType::Tennessee,
        WhiskeyType::Canadian,
        WhiskeyType::Irish,
        WhiskeyType::Japanese,
        WhiskeyType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WhiskeyType::Bourbon => "bourbon",
            WhiskeyType::Rye => "rye",
            WhiskeyType::Scotch => "scotch",
            WhiskeyType::Tennessee => "tennessee",
            WhiskeyType::Canadian => "canadian",
            WhiskeyType::Irish => "irish",
            WhiskeyType::Japanese => "japanese",
            WhiskeyType::Other => "other",
        }
    }
}

impl fmt::Display for WhiskeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhiskeyType {
    type Err = UnknownWhiskeyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        WhiskeyType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownWhiskeyType(s.to_string()))
    }
}

impl TryFrom<String> for WhiskeyType {
    type Error = UnknownWhiskeyType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Field-level constraint violation raised by create/update validation
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every user-editable attribute of a stored whiskey.
///
/// Dates are kept as the text the collector entered; flags are never null.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct WhiskeyFields {
    // identity
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub whiskey_type: WhiskeyType,
    pub distillery: String,
    pub region: Option<String>,
    pub country: Option<String>,

    // physical
    pub age: Option<i32>,
    pub abv: Option<f64>,
    pub proof: Option<f64>,
    pub size: Option<String>,
    pub quantity: Option<i32>,

    // commercial
    pub msrp: Option<f64>,
    pub secondary_price: Option<f64>,
    pub purchase_date: Option<String>,
    pub purchase_price: Option<f64>,
    pub purchase_location: Option<String>,
    pub bottle_code: Option<String>,
    pub current_market_value: Option<f64>,
    pub value_gain_loss: Option<f64>,
    pub is_investment_bottle: bool,
    pub asking_price: Option<f64>,
    pub is_for_sale: bool,
    pub is_for_trade: bool,

    // tasting
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub tasting_notes: Option<String>,
    pub nose_notes: Option<String>,
    pub palate_notes: Option<String>,
    pub finish_notes: Option<String>,
    pub color: Option<String>,
    pub food_pairings: Option<String>,
    pub times_tasted: Option<i32>,
    pub last_tasted_date: Option<String>,

    // provenance
    pub cask_type: Option<String>,
    pub cask_finish: Option<String>,
    pub barrel_number: Option<String>,
    pub bottle_number: Option<String>,
    pub vintage_year: Option<String>,
    pub bottled_date: Option<String>,
    pub mash_bill: Option<String>,
    pub awards: Option<String>,
    pub limited_edition: bool,
    pub chill_filtered: bool,
    pub natural_color: bool,

    // lifecycle
    pub status: Option<String>,
    pub is_opened: bool,
    pub date_opened: Option<String>,
    pub remaining_volume: Option<f64>,
    pub storage_location: Option<String>,

    // sharing
    pub shared_with: Option<String>,
    pub private_notes: Option<String>,
}

/// A persisted whiskey record owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Whiskey {
    pub id: WhiskeyId,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: WhiskeyFields,
    pub created_by: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied attributes for create and update.
///
/// Every field is optional; on update only the supplied ones change. Owner is
/// not part of the payload and is fixed when the record is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiskeyData {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub whiskey_type: Option<String>,
    pub distillery: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub age: Option<i32>,
    pub abv: Option<f64>,
    pub proof: Option<f64>,
    pub size: Option<String>,
    pub quantity: Option<i32>,
    pub msrp: Option<f64>,
    pub secondary_price: Option<f64>,
    pub purchase_date: Option<String>,
    pub purchase_price: Option<f64>,
    pub purchase_location: Option<String>,
    pub bottle_code: Option<String>,
    pub current_market_value: Option<f64>,
    pub value_gain_loss: Option<f64>,
    pub is_investment_bottle: Option<bool>,
    pub asking_price: Option<f64>,
    pub is_for_sale: Option<bool>,
    pub is_for_trade: Option<bool>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub tasting_notes: Option<String>,
    pub nose_notes: Option<String>,
    pub palate_notes: Option<String>,
    pub finish_notes: Option<String>,
    pub color: Option<String>,
    pub food_pairings: Option<String>,
    pub times_tasted: Option<i32>,
    pub last_tasted_date: Option<String>,
    pub cask_type: Option<String>,
    pub cask_finish: Option<String>,
    pub barrel_number: Option<String>,
    pub bottle_number: Option<String>,
    pub vintage_year: Option<String>,
    pub bottled_date: Option<String>,
    pub mash_bill: Option<String>,
    pub awards: Option<String>,
    pub limited_edition: Option<bool>,
    pub chill_filtered: Option<bool>,
    pub natural_color: Option<bool>,
    pub status: Option<String>,
    pub is_opened: Option<bool>,
    pub date_opened: Option<String>,
    pub remaining_volume: Option<f64>,
    pub storage_location: Option<String>,
    pub shared_with: Option<String>,
    pub private_notes: Option<String>,
}

// Copies every optional attribute that the patch supplies.
macro_rules! merge_optional {
    ($target:ident, $patch:ident; $($field:ident),+ $(,)?) => {
        $(
            if $patch.$field.is_some() {
                $target.$field = $patch.$field;
            }
        )+
    };
}

// Flags overwrite only when supplied.
macro_rules! merge_flag {
    ($target:ident, $patch:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    };
}

impl WhiskeyData {
    /// Validate and convert into a complete record body for create
    pub fn into_fields(self) -> Result<WhiskeyFields, FieldError> {
        let name = required_text(self.name, "name", "Name is required")?;
        let whiskey_type = match self.whiskey_type.as_deref() {
            Some(value) => parse_type(value)?,
            None => return Err(FieldError::new("type", "Invalid whiskey type")),
        };
        let distillery = required_text(self.distillery, "distillery", "Distillery is required")?;

        let fields = WhiskeyFields {
            name,
            whiskey_type,
            distillery,
            region: self.region,
            country: self.country,
            age: self.age,
            abv: self.abv,
            proof: self.proof,
            size: self.size,
            quantity: self.quantity,
            msrp: self.msrp,
            secondary_price: self.secondary_price,
            purchase_date: self.purchase_date,
            purchase_price: self.purchase_price,
            purchase_location: self.purchase_location,
            bottle_code: self.bottle_code,
            current_market_value: self.current_market_value,
            value_gain_loss: self.value_gain_loss,
            is_investment_bottle: self.is_investment_bottle.unwrap_or(false),
            asking_price: self.asking_price,
            is_for_sale: self.is_for_sale.unwrap_or(false),
            is_for_trade: self.is_for_trade.unwrap_or(false),
            rating: self.rating,
            description: self.description,
            tasting_notes: self.tasting_notes,
            nose_notes: self.nose_notes,
            palate_notes: self.palate_notes,
            finish_notes: self.finish_notes,
            color: self.color,
            food_pairings: self.food_pairings,
            times_tasted: self.times_tasted,
            last_tasted_date: self.last_tasted_date,
            cask_type: self.cask_type,
            cask_finish: self.cask_finish,
            barrel_number: self.barrel_number,
            bottle_number: self.bottle_number,
            vintage_year: self.vintage_year,
            bottled_date: self.bottled_date,
            mash_bill: self.mash_bill,
            awards: self.awards,
            limited_edition: self.limited_edition.unwrap_or(false),
            chill_filtered: self.chill_filtered.unwrap_or(false),
            natural_color: self.natural_color.unwrap_or(false),
            status: self.status,
            is_opened: self.is_opened.unwrap_or(false),
            date_opened: self.date_opened,
            remaining_volume: self.remaining_volume,
            storage_location: self.storage_location,
            shared_with: self.shared_with,
            private_notes: self.private_notes,
        };

        fields.validate()?;
        Ok(fields)
    }
}

impl WhiskeyFields {
    /// Numeric range constraints shared by create and update
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.age.is_some_and(|v| v < 0) {
            return Err(FieldError::new("age", "Age must be a positive number"));
        }
        if self.abv.is_some_and(|v| !(0.0..=100.0).contains(&v)) {
            return Err(FieldError::new("abv", "ABV must be between 0 and 100"));
        }
        if self.quantity.is_some_and(|v| v < 0) {
            return Err(FieldError::new("quantity", "Quantity must be a positive number"));
        }
        if self.msrp.is_some_and(|v| v < 0.0) {
            return Err(FieldError::new("msrp", "MSRP must be a positive number"));
        }
        if self.secondary_price.is_some_and(|v| v < 0.0) {
            return Err(FieldError::new("secondary_price", "Secondary price must be a positive number"));
        }
        if self.rating.is_some_and(|v| !(0.0..=10.0).contains(&v)) {
            return Err(FieldError::new("rating", "Rating must be between 0 and 10"));
        }
        Ok(())
    }

    /// Return a copy with the supplied patch applied and re-validated
    pub fn merged(&self, patch: WhiskeyData) -> Result<WhiskeyFields, FieldError> {
        let mut next = self.clone();

        if let Some(name) = patch.name {
            next.name = required_text(Some(name), "name", "Name cannot be empty")?;
        }
        if let Some(value) = patch.whiskey_type.as_deref() {
            next.whiskey_type = parse_type(value)?;
        }
        if let Some(distillery) = patch.distillery {
            next.distillery = required_text(Some(distillery), "distillery", "Distillery cannot be empty")?;
        }

        merge_optional!(next, patch;
            region, country, age, abv, proof, size, quantity, msrp, secondary_price,
            purchase_date, purchase_price, purchase_location, bottle_code,
            current_market_value, value_gain_loss, asking_price, rating, description,
            tasting_notes, nose_notes, palate_notes, finish_notes, color, food_pairings,
            times_tasted, last_tasted_date, cask_type, cask_finish, barrel_number,
            bottle_number, vintage_year, bottled_date, mash_bill, awards, status,
            date_opened, remaining_volume, storage_location, shared_with, private_notes,
        );
        merge_flag!(next, patch;
            is_investment_bottle, is_for_sale, is_for_trade, limited_edition,
            chill_filtered, natural_color, is_opened,
        );

        next.validate()?;
        Ok(next)
    }

    /// Case-insensitive substring match over the searchable text columns.
    /// `needle` must already be lower-cased.
    pub fn matches_text(&self, needle: &str) -> bool {
        let haystacks = [
            Some(self.name.as_str()),
            Some(self.distillery.as_str()),
            self.region.as_deref(),
            self.country.as_deref(),
            self.description.as_deref(),
            self.tasting_notes.as_deref(),
            self.nose_notes.as_deref(),
            self.palate_notes.as_deref(),
            self.finish_notes.as_deref(),
        ];
        haystacks
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(needle))
    }
}

/// Columns searched by `WhiskeyStore::search`, in SQL form
pub const SEARCHABLE_COLUMNS: [&str; 9] = [
    "name",
    "distillery",
    "region",
    "country",
    "description",
    "tasting_notes",
    "nose_notes",
    "palate_notes",
    "finish_notes",
];

fn required_text(value: Option<String>, field: &'static str, message: &str) -> Result<String, FieldError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(FieldError::new(field, message)),
    }
}

fn parse_type(value: &str) -> Result<WhiskeyType, FieldError> {
    value
        .parse::<WhiskeyType>()
        .map_err(|e| FieldError::new("type", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_data;

    #[test]
    fn parses_known_types_only() {
        assert_eq!("Bourbon".parse::<WhiskeyType>(), Ok(WhiskeyType::Bourbon));
        assert_eq!(" scotch".parse::<WhiskeyType>(), Ok(WhiskeyType::Scotch));
        assert_eq!(
            "vodka".parse::<WhiskeyType>(),
            Err(UnknownWhiskeyType("vodka".to_string()))
        );
    }

    #[test]
    fn create_requires_name_type_and_distillery() {
        let mut data = sample_data("Eagle Rare", "bourbon");
        data.distillery = Some("   ".to_string());
        let err = data.into_fields().unwrap_err();
        assert_eq!(err.field, "distillery");

        let mut data = sample_data("Eagle Rare", "bourbon");
        data.whiskey_type = None;
        assert_eq!(data.into_fields().unwrap_err().field, "type");

        let data = sample_data("", "bourbon");
        assert_eq!(data.into_fields().unwrap_err().field, "name");
    }

    #[test]
    fn create_rejects_unknown_type() {
        let data = sample_data("Tito's", "vodka");
        let err = data.into_fields().unwrap_err();
        assert_eq!(err.field, "type");
        assert_eq!(err.message, "Invalid whiskey type \"vodka\"");
    }

    #[test]
    fn create_defaults_flags_to_false() {
        let fields = sample_data("Eagle Rare", "bourbon").into_fields().unwrap();
        assert!(!fields.is_opened);
        assert!(!fields.limited_edition);
        assert_eq!(fields.whiskey_type, WhiskeyType::Bourbon);
    }

    #[test]
    fn range_violations_name_the_field() {
        let mut data = sample_data("Booker's", "bourbon");
        data.abv = Some(130.0);
        assert_eq!(data.into_fields().unwrap_err().field, "abv");

        let mut data = sample_data("Booker's", "bourbon");
        data.rating = Some(11.0);
        assert_eq!(data.into_fields().unwrap_err().field, "rating");

        let mut data = sample_data("Booker's", "bourbon");
        data.quantity = Some(-1);
        assert_eq!(data.into_fields().unwrap_err().field, "quantity");
    }

    #[test]
    fn merge_only_touches_supplied_fields() {
        let mut data = sample_data("Lagavulin 16", "scotch");
        data.region = Some("Islay".to_string());
        data.rating = Some(9.0);
        let fields = data.into_fields().unwrap();

        let patch = WhiskeyData {
            rating: Some(9.5),
            is_opened: Some(true),
            ..Default::default()
        };
        let merged = fields.merged(patch).unwrap();

        assert_eq!(merged.rating, Some(9.5));
        assert!(merged.is_opened);
        assert_eq!(merged.region.as_deref(), Some("Islay"));
        assert_eq!(merged.name, "Lagavulin 16");
    }

    #[test]
    fn merge_rejects_blank_name_and_bad_type() {
        let fields = sample_data("Lagavulin 16", "scotch").into_fields().unwrap();

        let patch = WhiskeyData {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.merged(patch).unwrap_err().field, "name");

        let patch = WhiskeyData {
            whiskey_type: Some("gin".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.merged(patch).unwrap_err().field, "type");
    }

    #[test]
    fn text_search_is_case_insensitive() {
        let mut data = sample_data("Ardbeg Uigeadail", "scotch");
        data.tasting_notes = Some("Smoky, sherried, Christmas cake".to_string());
        let fields = data.into_fields().unwrap();

        assert!(fields.matches_text("christmas"));
        assert!(fields.matches_text("ardbeg"));
        assert!(!fields.matches_text("vanilla"));
    }
}
