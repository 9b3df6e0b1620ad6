pub mod task;
pub mod user;

pub use task::{NewTask, PageQuery, Task, TaskPage, TaskPatch, TaskQuery};
pub use user::{OwnerId, User, UserProfile};
