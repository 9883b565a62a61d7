use serde::{Deserialize, Serialize};

use super::ServiceError;

/// A cafe record as stored and as served by the list and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cafe {
    pub id: i64,
    pub name: String,
    pub map_url: String,
    pub img_url: String,
    pub location: String,
    pub seats: String,
    pub has_toilet: bool,
    pub has_wifi: bool,
    pub has_sockets: bool,
    pub can_take_calls: bool,
    pub coffee_price: Option<String>,
}

/// Validated input for creating a new cafe. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCafeRequest {
    pub name: String,
    pub map_url: String,
    pub img_url: String,
    pub location: String,
    pub seats: String,
    pub has_toilet: bool,
    pub has_wifi: bool,
    pub has_sockets: bool,
    pub can_take_calls: bool,
    pub coffee_price: Option<String>,
}

/// Raw form payload accepted by the add endpoint. Field names follow the
/// public form contract (`loc`, `sockets`, `toilet`, `wifi`, `calls`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddCafeForm {
    pub name: Option<String>,
    pub map_url: Option<String>,
    pub img_url: Option<String>,
    pub loc: Option<String>,
    pub sockets: Option<String>,
    pub toilet: Option<String>,
    pub wifi: Option<String>,
    pub calls: Option<String>,
    pub seats: Option<String>,
    pub coffee_price: Option<String>,
}

/// Response envelope for the list and search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CafeListResponse {
    pub cafes: Vec<Cafe>,
}

/// Reduced projection returned by the random-pick endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CafeProjection {
    pub name: String,
    pub map_url: String,
    pub location: String,
    // The misspelled key is part of the public contract.
    #[serde(rename = "ammenities")]
    pub amenities: Amenities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenities {
    pub seats: String,
    pub has_toilet: bool,
}

impl Cafe {
    /// Build a Cafe from a validated request and a store-assigned id.
    pub fn new(id: i64, request: CreateCafeRequest) -> Self {
        Self {
            id,
            name: request.name,
            map_url: request.map_url,
            img_url: request.img_url,
            location: request.location,
            seats: request.seats,
            has_toilet: request.has_toilet,
            has_wifi: request.has_wifi,
            has_sockets: request.has_sockets,
            can_take_calls: request.can_take_calls,
            coffee_price: request.coffee_price,
        }
    }

    /// Reduced projection for the random-pick endpoint.
    pub fn to_projection(&self) -> CafeProjection {
        CafeProjection {
            name: self.name.clone(),
            map_url: self.map_url.clone(),
            location: self.location.clone(),
            amenities: Amenities {
                seats: self.seats.clone(),
                has_toilet: self.has_toilet,
            },
        }
    }
}

impl AddCafeForm {
    /// Validate the form into a create request.
    ///
    /// Amenity flags use the truthy-string rule: any non-empty value counts
    /// as true (including the literal text "false"); an absent or empty field
    /// is false. An absent or empty required text field is an error.
    pub fn into_request(self) -> Result<CreateCafeRequest, ServiceError> {
        let has_sockets = truthy(&self.sockets);
        let has_toilet = truthy(&self.toilet);
        let has_wifi = truthy(&self.wifi);
        let can_take_calls = truthy(&self.calls);

        Ok(CreateCafeRequest {
            name: require(self.name, "name")?,
            map_url: require(self.map_url, "map_url")?,
            img_url: require(self.img_url, "img_url")?,
            location: require(self.loc, "loc")?,
            seats: require(self.seats, "seats")?,
            has_toilet,
            has_wifi,
            has_sockets,
            can_take_calls,
            coffee_price: self.coffee_price.filter(|p| !p.is_empty()),
        })
    }
}

fn require(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::MissingField {
            field: field.to_string(),
        }),
    }
}

fn truthy(value: &Option<String>) -> bool {
    matches!(value, Some(v) if !v.is_empty())
}
