use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::{BigDecimal, Json}};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "availability_status")]
pub enum Availability {
    #[sqlx(rename = "Available")]
    #[serde(rename = "Available")]
    Available,
    #[sqlx(rename = "Not Available")]
    #[serde(rename = "Not Available")]
    NotAvailable,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Zone {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: i64,
    pub property_code: Option<String>,

    // Location
    pub street: String,
    pub number: String,
    pub colony: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,

    pub availability: Availability,

    // Layout and surfaces
    pub total_bathrooms: i32,
    pub half_bathrooms: Option<i32>,
    pub total_rooms: i32,
    pub total_m2: i32,
    pub surface_built: Option<i32>,
    pub total_surface: Option<BigDecimal>,
    pub antiquity: Option<i32>,
    pub maintenance: Option<BigDecimal>,
    pub state_conservation: Option<String>,
    pub wineries: Option<i32>,
    pub closets: Option<i32>,
    pub levels: Option<i32>,
    pub parking: Option<i32>,
    pub have_parking: bool,
    pub accept_mascots: bool,

    // Pricing
    pub property_price: BigDecimal,
    /// Mean comment rating. Written by comment creation, never by the owner.
    pub rental_rate: Option<f64>,

    pub property_details: String,
    pub zone_id: i64,
    pub owner_user_id: i64,

    // Features
    pub general_features: Json<Vec<String>>,
    pub services: Json<Vec<String>>,
    pub exteriors: Json<Vec<String>>,
    pub environmentals: Json<Vec<String>>,

    // Relative paths under the public upload directory
    pub property_photos_path: Json<Vec<String>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}",
            self.street, self.number, self.city, self.state, self.postal_code
        )
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PropertyWithZone {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub property: Property,
    pub zone_name: String,
}
