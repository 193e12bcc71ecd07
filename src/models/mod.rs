pub mod entry;
pub mod enums;
pub mod macros;
pub mod timetable;

pub use entry::*;
pub use enums::*;
pub use timetable::*;
