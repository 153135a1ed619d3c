pub mod settings;

pub use settings::{ApiSettings, BoardSettings, SessionSettings, Settings};
