pub mod app;
pub mod desktop_notifications;
pub mod driver;
pub mod events;
pub mod global_prefs;
pub mod logging;
pub mod model;
pub mod services;
pub mod state;
pub mod ui;

pub use app::App;
pub use events::{EventSender, InboundEvent, OutboundEvent};
