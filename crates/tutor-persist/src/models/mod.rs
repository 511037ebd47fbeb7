mod message;
mod student;
mod teacher;
mod thread;

pub use message::{Message, NewMessage};
pub use student::{NewStudent, Student};
pub use teacher::{NewTeacher, Teacher};
pub use thread::{NewThread, Thread};
