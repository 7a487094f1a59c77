pub mod client;
pub mod serialization;
pub mod transmission;

pub use client::{API_KEY_HEADER, ClientStats, DeliveryStats, HttpTransport};
pub use serialization::PayloadSerializer;
pub use transmission::{Endpoint, Transport, TransportResponse, deliver};
