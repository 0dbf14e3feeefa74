pub mod recurrence;
pub mod reminder;
pub mod todo;

pub use recurrence::{Recurrence, RecurrenceKind};
pub use todo::{Todo, TodoId};
