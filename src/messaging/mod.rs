pub mod notification;

pub use notification::{Notification, NotificationCategory, NotificationLevel};
