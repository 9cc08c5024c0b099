// External services the hub talks to

pub mod homeassistant;
pub mod sink;

pub use homeassistant::HomeAssistantSink;
pub use sink::{Attributes, NotificationMetadata, Sink};
