// Acceptance rules for listing payloads, applied before anything reaches
// the store. Payloads arrive as loose JSON (numbers may be strings, arrays
// may contain junk), so validation works over serde_json::Value and produces
// fully typed output.

use serde_json::Value;
use thiserror::Error;

use super::{Area, AreaUnit, Facing};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required fields: title, description, price, location, facing.")]
    MissingRequiredFields,
    #[error("{0} must be a valid non-negative number.")]
    InvalidNumber(&'static str),
    #[error("{0} must be a non-blank string.")]
    BlankField(&'static str),
    #[error("'{0}' is not a valid facing direction.")]
    InvalidFacing(String),
    #[error("'{0}' is not a valid area unit.")]
    InvalidAreaUnit(String),
    #[error("Area unit is required if area is provided.")]
    AreaUnitRequired,
    #[error("Request body must be a JSON object.")]
    NotAnObject,
}

/// A listing payload that passed create validation. The store assigns
/// id, sequential_id and created_at on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub area: Option<Area>,
    pub facing: Facing,
    pub image_urls: Vec<String>,
    pub features: Vec<String>,
}

/// A partial update. `None` means "field not supplied, leave unchanged".
/// `area: Some(None)` is an explicit clear of both area and its unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub area: Option<Option<Area>>,
    pub facing: Option<Facing>,
    pub image_urls: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.location.is_none()
            && self.area.is_none()
            && self.facing.is_none()
            && self.image_urls.is_none()
            && self.features.is_none()
    }
}

pub fn validate_create(payload: &Value) -> Result<NewListing, ValidationError> {
    let map = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let title = non_blank_string(map.get("title"));
    let description = non_blank_string(map.get("description"));
    let location = non_blank_string(map.get("location"));
    let facing_raw = non_blank_string(map.get("facing"));
    let price_raw = map.get("price").filter(|v| !v.is_null());

    let (Some(title), Some(description), Some(location), Some(facing_raw), Some(price_raw)) =
        (title, description, location, facing_raw, price_raw)
    else {
        return Err(ValidationError::MissingRequiredFields);
    };

    let price = parse_number(price_raw)
        .filter(|p| *p >= 0.0)
        .ok_or(ValidationError::InvalidNumber("Price"))?;

    let facing = facing_raw
        .parse::<Facing>()
        .map_err(|_| ValidationError::InvalidFacing(facing_raw))?;

    let area = validate_area(map.get("area"), map.get("areaUnit"))?;

    Ok(NewListing {
        title,
        description,
        price,
        location,
        area,
        facing,
        image_urls: filtered_strings(map.get("imageUrls"), true),
        features: filtered_strings(map.get("features"), false),
    })
}

pub fn validate_update(payload: &Value) -> Result<ListingPatch, ValidationError> {
    let map = payload.as_object().ok_or(ValidationError::NotAnObject)?;
    let mut patch = ListingPatch::default();

    if map.contains_key("title") {
        patch.title = Some(non_blank_string(map.get("title")).ok_or(ValidationError::BlankField("Title"))?);
    }
    if map.contains_key("description") {
        patch.description =
            Some(non_blank_string(map.get("description")).ok_or(ValidationError::BlankField("Description"))?);
    }
    if map.contains_key("location") {
        patch.location =
            Some(non_blank_string(map.get("location")).ok_or(ValidationError::BlankField("Location"))?);
    }
    if let Some(price_raw) = map.get("price") {
        patch.price = Some(
            parse_number(price_raw)
                .filter(|p| *p >= 0.0)
                .ok_or(ValidationError::InvalidNumber("Price"))?,
        );
    }
    if let Some(facing_raw) = map.get("facing") {
        let s = facing_raw.as_str().unwrap_or_default();
        patch.facing = Some(
            s.parse::<Facing>()
                .map_err(|_| ValidationError::InvalidFacing(s.to_string()))?,
        );
    }
    if let Some(area_raw) = map.get("area") {
        // An explicit null or empty string clears area and areaUnit together;
        // the pair never survives half-set.
        if is_explicit_clear(area_raw) {
            patch.area = Some(None);
        } else {
            patch.area = Some(validate_area(Some(area_raw), map.get("areaUnit"))?);
        }
    }
    if let Some(urls) = map.get("imageUrls") {
        patch.image_urls = Some(filtered_strings(Some(urls), true));
    }
    if let Some(features) = map.get("features") {
        patch.features = Some(filtered_strings(Some(features), false));
    }

    Ok(patch)
}

/// Shared area rule: a present area must be a non-negative number and must
/// carry one of the four enumerated units.
fn validate_area(area: Option<&Value>, unit: Option<&Value>) -> Result<Option<Area>, ValidationError> {
    let Some(area) = area.filter(|v| !is_explicit_clear(v)) else {
        return Ok(None);
    };

    let value = parse_number(area)
        .filter(|a| *a >= 0.0)
        .ok_or(ValidationError::InvalidNumber("Area"))?;

    let unit = unit
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::AreaUnitRequired)?;
    let unit = unit
        .parse::<AreaUnit>()
        .map_err(|_| ValidationError::InvalidAreaUnit(unit.to_string()))?;

    Ok(Some(Area { value, unit }))
}

fn is_explicit_clear(v: &Value) -> bool {
    v.is_null() || v.as_str().is_some_and(|s| s.is_empty())
}

fn non_blank_string(v: Option<&Value>) -> Option<String> {
    v.and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

/// Accept either a JSON number or a numeric string (form-encoded clients
/// send strings).
fn parse_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Keep only string entries; optionally drop blank ones as well. Non-array
/// input yields an empty list rather than an error.
fn filtered_strings(v: Option<&Value>, drop_blank: bool) -> Vec<String> {
    let Some(Value::Array(items)) = v else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.as_str())
        .filter(|s| !s.is_empty() && (!drop_blank || !s.trim().is_empty()))
        .map(|s| s.to_string())
        .collect()
}
