pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoStudentStore;
pub use memory::InMemoryStudentStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::{StudentFilter, StudentStore, LIST_LIMIT};
