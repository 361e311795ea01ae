pub mod event;
pub mod plan;
pub mod store;
pub mod task;

pub use event::CalendarEvent;
pub use plan::LearningPlan;
pub use store::Store;
pub use task::{Priority, Task};
