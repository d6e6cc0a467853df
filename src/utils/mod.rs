pub mod id;
pub mod phone;

pub use id::IdGenerator;
pub use phone::*;
