pub mod complaint;

pub use complaint::{Priority, Status};
