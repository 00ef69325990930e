//! Push payload parsing and the display decision pipeline.
//!
//! # Flow
//!
//! ```text
//! DeliveryEnvelope -> duplicate check -> parse_notification -> NotificationProcessor
//!                                                                 |
//!                     DecisionGate::display_notification (at most once)
//!                                                                 |
//!                  Extended | MarkedProcessed | DefaultDisplayed
//! ```
//!
//! The processor is the developer's single chance to intercept a
//! notification. Whatever it does (display with overrides, consume, fail or
//! panic), each envelope ends with exactly one of the outcomes in
//! [`Resolution`].

mod envelope;
mod extender;
mod gate;
mod overrides;
mod parser;
mod types;

pub use envelope::DeliveryEnvelope;
pub use extender::{NoopProcessor, NotificationExtenderService, NotificationProcessor, Resolution};
pub use gate::{DecisionGate, DisplayResult};
pub use overrides::{merge, OverrideSettings};
pub use parser::parse_notification;
pub use types::{ActionButton, BackgroundImageLayout, JsonObject, Notification};
