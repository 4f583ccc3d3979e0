// Listing entity and its closed vocabularies.
//
// The area/areaUnit pair is coupled: a listing either has both or neither.
// Modelling it as a single Option<Area> makes the half-set state
// unrepresentable; the wire format still shows two sibling fields via
// serde(flatten).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use thiserror::Error;
use uuid::Uuid;

pub mod search;
pub mod validate;

pub use search::{ListingFilter, SearchParams};
pub use validate::{validate_create, validate_update, ListingPatch, NewListing, ValidationError};

/// Compass direction a property faces. Exact, case-sensitive strings on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    North,
    South,
    East,
    West,
    #[serde(rename = "North-East")]
    NorthEast,
    #[serde(rename = "North-West")]
    NorthWest,
    #[serde(rename = "South-East")]
    SouthEast,
    #[serde(rename = "South-West")]
    SouthWest,
}

#[derive(Debug, Error)]
#[error("'{0}' is not a valid facing direction")]
pub struct ParseFacingError(String);

impl Facing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::North => "North",
            Facing::South => "South",
            Facing::East => "East",
            Facing::West => "West",
            Facing::NorthEast => "North-East",
            Facing::NorthWest => "North-West",
            Facing::SouthEast => "South-East",
            Facing::SouthWest => "South-West",
        }
    }
}

impl std::str::FromStr for Facing {
    type Err = ParseFacingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "North" => Ok(Facing::North),
            "South" => Ok(Facing::South),
            "East" => Ok(Facing::East),
            "West" => Ok(Facing::West),
            "North-East" => Ok(Facing::NorthEast),
            "North-West" => Ok(Facing::NorthWest),
            "South-East" => Ok(Facing::SouthEast),
            "South-West" => Ok(Facing::SouthWest),
            other => Err(ParseFacingError(other.to_string())),
        }
    }
}

/// Unit of measure for a listing's area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    Sqft,
    Sqyd,
    Sqmt,
    Acre,
}

#[derive(Debug, Error)]
#[error("'{0}' is not a valid area unit")]
pub struct ParseAreaUnitError(String);

impl AreaUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaUnit::Sqft => "sqft",
            AreaUnit::Sqyd => "sqyd",
            AreaUnit::Sqmt => "sqmt",
            AreaUnit::Acre => "acre",
        }
    }
}

impl std::str::FromStr for AreaUnit {
    type Err = ParseAreaUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqft" => Ok(AreaUnit::Sqft),
            "sqyd" => Ok(AreaUnit::Sqyd),
            "sqmt" => Ok(AreaUnit::Sqmt),
            "acre" => Ok(AreaUnit::Acre),
            other => Err(ParseAreaUnitError(other.to_string())),
        }
    }
}

/// Area with its unit. Flattened on the wire so clients see `area` and
/// `areaUnit` as two sibling fields of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    #[serde(rename = "area")]
    pub value: f64,
    #[serde(rename = "areaUnit")]
    pub unit: AreaUnit,
}

/// A single property-for-sale record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Storage-assigned identifier. Immutable.
    pub id: Uuid,
    /// Human-facing auto-incrementing display id. Assigned once at creation.
    pub sequential_id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    #[serde(flatten)]
    pub area: Option<Area>,
    pub facing: Facing,
    pub image_urls: Vec<String>,
    pub features: Vec<String>,
    /// Set once at creation, never mutated by updates.
    pub created_at: DateTime<Utc>,
}

impl FromRow<'_, PgRow> for Listing {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let facing: String = row.try_get("facing")?;
        let facing = facing.parse::<Facing>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "facing".into(),
            source: Box::new(e),
        })?;

        // area and area_unit are stored as two nullable columns guarded by a
        // CHECK constraint; reassemble them into the composite here.
        let area_value: Option<f64> = row.try_get("area")?;
        let area_unit: Option<String> = row.try_get("area_unit")?;
        let area = match (area_value, area_unit) {
            (Some(value), Some(unit)) => {
                let unit = unit.parse::<AreaUnit>().map_err(|e| sqlx::Error::ColumnDecode {
                    index: "area_unit".into(),
                    source: Box::new(e),
                })?;
                Some(Area { value, unit })
            }
            (None, None) => None,
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "area_unit".into(),
                    source: "area and area_unit must be set together".into(),
                })
            }
        };

        Ok(Self {
            id: row.try_get("id")?,
            sequential_id: row.try_get("sequential_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            location: row.try_get("location")?,
            area,
            facing,
            image_urls: row.try_get("image_urls")?,
            features: row.try_get("features")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
