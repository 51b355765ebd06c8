pub mod student;

pub use student::{parse_student_id, Address, NewStudent};
