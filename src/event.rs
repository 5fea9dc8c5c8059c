//! The downstream event schema and its fixed-precision formatting.

use serde::Serialize;

use crate::feed::VehicleUpdate;

/// JSON payload posted to the event ingestion API, one per vehicle.
///
/// Coordinates and speed are fixed-precision strings, not floats: the
/// ingestion API treats them as opaque fixed-precision values, so they are
/// rendered once here and never reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEvent {
    pub location: Location,
    #[serde(rename = "dynamicAttributes")]
    pub dynamic_attributes: DynamicAttributes,
}

/// GeoJSON point carrying `[longitude, latitude]` to five decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: [String; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicAttributes {
    pub name: String,
    pub id: String,
    pub speed: String,
}

/// Renders `value` with exactly `decimals` fractional digits, rounding the
/// underlying binary value to nearest.
fn fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// Maps one reduced update into the downstream event shape.
pub fn format_event(update: &VehicleUpdate) -> OutboundEvent {
    OutboundEvent {
        location: Location {
            kind: "Point",
            coordinates: [fixed(update.longitude, 5), fixed(update.latitude, 5)],
        },
        dynamic_attributes: DynamicAttributes {
            name: update.label.clone(),
            id: update.vehicle_id.clone(),
            speed: fixed(update.speed, 2),
        },
    }
}
