pub mod capture;
pub mod child;
pub mod config;
pub mod poller;
pub mod protocol;
pub mod relay;
pub mod session;
pub mod surface;
pub mod telemetry;

pub use config::AppConfig;
pub use session::HarnessSession;
