pub mod validation;

pub use validation::{PatchBody, ValidatedJson, ValidatedQuery};
