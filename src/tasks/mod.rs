mod cleanup;

pub use cleanup::StoreCleanupTask;
