mod shipment;
mod user;

pub use shipment::{NewShipment, Shipment, ShipmentPatch, ShipmentStatus};
pub use user::{NewUser, Role, User};

/// Raised when a stored enum column holds a value the code does not know.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
