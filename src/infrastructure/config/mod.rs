mod settings;

pub use settings::{LogConfig, LogFormat, Settings, StoreConfig, WorkerConfig};
