//! Global hooks: process-wide interception of escaped errors.

pub mod manager;
pub mod notifier;
pub mod process;

pub use manager::GlobalHookManager;
pub use notifier::{Notifier, SubscriptionId, UnhandledNotification, UnobservedNotification};
pub use process::NotificationSources;
