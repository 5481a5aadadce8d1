//! Publisher adapters.

mod transport_publisher;

pub use transport_publisher::{TransportPublisher, DEFAULT_SEND_TIMEOUT};
