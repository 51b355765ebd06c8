pub mod students;

pub use students::{
    CreateStudentResponse, ListStudentsParams, StudentListResponse, StudentResponse,
    StudentSummary,
};
