use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value as JsonValue};
use sqlx::types::BigDecimal;
use validator::{Validate, ValidationError};

use crate::{
    config::Config,
    models::{
        commentmodel::CommentWithAuthor,
        propertymodel::{Availability, Property},
    },
    utils::currency::parse_amount,
};

/// Blank strings from form posts count as absent.
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn validate_non_negative(value: &BigDecimal) -> Result<(), ValidationError> {
    if *value < BigDecimal::from(0) {
        return Err(ValidationError::new("must_not_be_negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoUploadDto {
    pub file_name: String,
    /// Base64 payload, optionally as a `data:` URL.
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePropertyDto {
    pub general_features: Option<Vec<String>>,
    pub services: Option<Vec<String>>,
    pub exteriors: Option<Vec<String>>,
    pub environmentals: Option<Vec<String>>,

    #[validate(length(min = 1, max = 255, message = "Street is required and may not exceed 255 characters"))]
    pub street: String,
    #[validate(length(min = 1, max = 10, message = "Number is required and may not exceed 10 characters"))]
    pub number: String,
    #[validate(length(min = 1, max = 100, message = "City is required and may not exceed 100 characters"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "State is required and may not exceed 100 characters"))]
    pub state: String,
    #[validate(length(min = 1, max = 20, message = "Postal code is required and may not exceed 20 characters"))]
    pub postal_code: String,
    pub availability: Availability,
    pub total_bathrooms: i32,
    pub total_rooms: i32,
    pub total_m2: i32,
    pub have_parking: bool,
    pub accept_mascots: bool,
    #[validate(custom = "validate_non_negative")]
    pub property_price: BigDecimal,
    #[validate(length(min = 1, message = "Property details are required"))]
    pub property_details: String,
    pub zone_id: i64,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 100))]
    pub colony: Option<String>,
    pub half_bathrooms: Option<i32>,
    pub surface_built: Option<i32>,
    #[validate(custom = "validate_non_negative")]
    pub total_surface: Option<BigDecimal>,
    pub antiquity: Option<i32>,
    pub maintenance: Option<BigDecimal>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50))]
    pub state_conservation: Option<String>,
    pub wineries: Option<i32>,
    pub closets: Option<i32>,
    pub levels: Option<i32>,
    pub parking: Option<i32>,

    #[serde(default)]
    pub property_photos: Vec<PhotoUploadDto>,
}

/// Full replacement of an existing property. Optional fields left out are cleared.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePropertyDto {
    #[validate(length(min = 1, max = 255, message = "Street is required and may not exceed 255 characters"))]
    pub street: String,
    #[validate(length(min = 1, max = 10, message = "Number is required and may not exceed 10 characters"))]
    pub number: String,
    #[validate(length(min = 1, max = 100, message = "City is required and may not exceed 100 characters"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "State is required and may not exceed 100 characters"))]
    pub state: String,
    #[validate(length(min = 1, max = 20, message = "Postal code is required and may not exceed 20 characters"))]
    pub postal_code: String,
    pub availability: Availability,
    pub total_bathrooms: i32,
    pub total_rooms: i32,
    pub total_m2: i32,
    pub have_parking: bool,
    pub accept_mascots: bool,
    #[validate(custom = "validate_non_negative")]
    pub property_price: BigDecimal,
    #[validate(length(min = 1, message = "Property details are required"))]
    pub property_details: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 100))]
    pub colony: Option<String>,
    #[serde(default)]
    pub half_bathrooms: Option<i32>,
    #[serde(default)]
    pub surface_built: Option<i32>,
    #[serde(default)]
    #[validate(custom = "validate_non_negative")]
    pub total_surface: Option<BigDecimal>,
    #[serde(default)]
    pub antiquity: Option<i32>,
    #[serde(default)]
    pub maintenance: Option<BigDecimal>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50))]
    pub state_conservation: Option<String>,
    #[serde(default)]
    pub wineries: Option<i32>,
    #[serde(default)]
    pub closets: Option<i32>,
    #[serde(default)]
    pub levels: Option<i32>,
    #[serde(default)]
    pub parking: Option<i32>,
}

/// Raw query string of `/properties/filter`. Every value arrives as text.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPropertiesQuery {
    pub max_price: Option<String>,
    pub selected_zone: Option<String>,
    pub allow_pets: Option<String>,
    pub parking: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub m2: Option<String>,
}

/// Sentinel sent by the price slider's last step, meaning "no ceiling".
pub const NO_PRICE_CEILING: &str = "+10000";

/// Typed filters derived from `FilterPropertiesQuery`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PropertySearchFilters {
    pub max_price: Option<BigDecimal>,
    pub zone_name: Option<String>,
    pub accept_mascots: Option<bool>,
    pub have_parking: Option<bool>,
    pub min_rooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
    pub min_m2: Option<i32>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_minimum(name: &str, value: &Option<String>) -> Result<Option<i32>, String> {
    non_blank(value)
        .map(|v| v.parse::<i32>().map_err(|_| format!("{} must be an integer", name)))
        .transpose()
}

impl TryFrom<FilterPropertiesQuery> for PropertySearchFilters {
    type Error = String;

    fn try_from(query: FilterPropertiesQuery) -> Result<Self, Self::Error> {
        let max_price = match non_blank(&query.max_price) {
            None | Some(NO_PRICE_CEILING) => None,
            Some(raw) => Some(parse_amount(raw).map_err(|e| format!("maxPrice: {}", e))?),
        };

        // Only an explicit "true" turns a flag filter on
        let flag = |value: &Option<String>| (non_blank(value) == Some("true")).then_some(true);

        Ok(PropertySearchFilters {
            max_price,
            zone_name: non_blank(&query.selected_zone).map(str::to_string),
            accept_mascots: flag(&query.allow_pets),
            have_parking: flag(&query.parking),
            min_rooms: parse_minimum("bedrooms", &query.bedrooms)?,
            min_bathrooms: parse_minimum("bathrooms", &query.bathrooms)?,
            min_m2: parse_minimum("m2", &query.m2)?,
        })
    }
}

/// Serialize a property with its photo paths turned into public URLs.
pub fn property_json(property: &Property, zone_name: Option<&str>, config: &Config) -> JsonValue {
    let mut value = serde_json::to_value(property).unwrap_or_else(|_| json!({}));

    let photos: Vec<String> = property
        .property_photos_path
        .0
        .iter()
        .map(|path| config.asset_url(path))
        .collect();

    if let Some(object) = value.as_object_mut() {
        object.insert("property_photos_path".to_string(), json!(photos));
        if let Some(zone_name) = zone_name {
            object.insert("zone_name".to_string(), json!(zone_name));
        }
    }

    value
}

/// Comments as embedded under a property, each with a nested `user`.
pub fn comments_json(comments: &[CommentWithAuthor]) -> JsonValue {
    JsonValue::Array(
        comments
            .iter()
            .map(|c| {
                let mut value = serde_json::to_value(&c.comment).unwrap_or_else(|_| json!({}));
                if let Some(object) = value.as_object_mut() {
                    object.insert(
                        "user".to_string(),
                        json!({
                            "id": c.comment.user_id,
                            "first_name": c.first_name,
                            "last_name": c.last_name,
                        }),
                    );
                }
                value
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn query(pairs: &[(&str, &str)]) -> FilterPropertiesQuery {
        let map: serde_json::Map<String, JsonValue> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        serde_json::from_value(JsonValue::Object(map)).unwrap()
    }

    #[test]
    fn price_sentinel_means_no_ceiling() {
        let filters = PropertySearchFilters::try_from(query(&[("maxPrice", "+10000")])).unwrap();
        assert_eq!(filters.max_price, None);
    }

    #[test]
    fn numeric_price_is_a_ceiling() {
        let filters = PropertySearchFilters::try_from(query(&[("maxPrice", "7500.50")])).unwrap();
        assert_eq!(filters.max_price, Some(BigDecimal::from_str("7500.50").unwrap()));
    }

    #[test]
    fn bad_price_is_rejected() {
        assert!(PropertySearchFilters::try_from(query(&[("maxPrice", "cheap")])).is_err());
    }

    #[test]
    fn flags_only_filter_when_true() {
        let filters = PropertySearchFilters::try_from(query(&[
            ("allowPets", "false"),
            ("parking", "true"),
        ]))
        .unwrap();
        assert_eq!(filters.accept_mascots, None);
        assert_eq!(filters.have_parking, Some(true));
    }

    #[test]
    fn blank_values_are_ignored() {
        let filters = PropertySearchFilters::try_from(query(&[
            ("selectedZone", ""),
            ("bedrooms", " "),
            ("bathrooms", "2"),
            ("m2", "80"),
        ]))
        .unwrap();
        assert_eq!(
            filters,
            PropertySearchFilters {
                min_bathrooms: Some(2),
                min_m2: Some(80),
                ..Default::default()
            }
        );
    }

    #[test]
    fn non_integer_minimums_are_rejected() {
        let err = PropertySearchFilters::try_from(query(&[("bedrooms", "two")])).unwrap_err();
        assert!(err.contains("bedrooms"));
    }

    #[test]
    fn update_clears_missing_optional_fields() {
        let dto: UpdatePropertyDto = serde_json::from_value(json!({
            "street": "Av. Reforma",
            "number": "12",
            "city": "CDMX",
            "state": "CDMX",
            "postal_code": "06600",
            "availability": "Not Available",
            "total_bathrooms": 2,
            "total_rooms": 3,
            "total_m2": 90,
            "have_parking": true,
            "accept_mascots": false,
            "property_price": 12000,
            "property_details": "Bright flat",
            "colony": ""
        }))
        .unwrap();

        assert_eq!(dto.availability, Availability::NotAvailable);
        assert_eq!(dto.colony, None);
        assert_eq!(dto.levels, None);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn negative_price_fails_validation() {
        let dto: UpdatePropertyDto = serde_json::from_value(json!({
            "street": "Calle 5",
            "number": "1",
            "city": "Puebla",
            "state": "Puebla",
            "postal_code": "72000",
            "availability": "Available",
            "total_bathrooms": 1,
            "total_rooms": 1,
            "total_m2": 40,
            "have_parking": false,
            "accept_mascots": false,
            "property_price": -5,
            "property_details": "Studio"
        }))
        .unwrap();

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("property_price"));
    }
}
