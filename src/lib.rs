// Infrastructure layer (shared components)
pub mod infrastructure;

// Re-export infrastructure modules
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;

// Domain layer (decision pipeline)
pub mod notification;

// Collaborators
pub mod display;
pub mod store;

// Supporting modules
pub mod tasks;
pub mod telemetry;
