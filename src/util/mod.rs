pub mod dates;
pub mod logging;
pub mod settings;
pub mod version;
