pub mod task;
pub mod user;

pub use task::{Task, TaskDocument, TaskInput, TaskPatch, TaskPriority, TaskQuery, TaskStatus};
pub use user::{normalize_email, User, UserDocument};
