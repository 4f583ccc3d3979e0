// Search query normalization: loosely-typed query-string input in, precise
// filter out. Criteria that fail to parse are dropped silently - a search
// request never fails on bad input, it just constrains less.

use serde::Deserialize;

use super::Facing;

/// Raw query-string parameters as the client sent them.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchParams {
    pub price: Option<String>,
    pub facing: Option<String>,
    pub location: Option<String>,
    pub area: Option<String>,
}

/// Normalized filter. All criteria are independent and combine with AND;
/// `None` imposes no constraint.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListingFilter {
    /// listing.price <= max_price
    pub max_price: Option<f64>,
    /// listing.facing == facing
    pub facing: Option<Facing>,
    /// case-insensitive substring match on listing.location
    pub location: Option<String>,
    /// listing.area <= max_area. Compares the stored numeric value only;
    /// no conversion between area units happens here.
    pub max_area: Option<f64>,
}

impl SearchParams {
    pub fn normalize(&self) -> ListingFilter {
        ListingFilter {
            max_price: self.price.as_deref().and_then(parse_finite),
            facing: self
                .facing
                .as_deref()
                .and_then(|s| s.parse::<Facing>().ok()),
            location: self
                .location
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
            max_area: self.area.as_deref().and_then(parse_finite),
        }
    }
}

impl ListingFilter {
    pub fn is_empty(&self) -> bool {
        self.max_price.is_none() && self.facing.is_none() && self.location.is_none() && self.max_area.is_none()
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
