pub mod classifier;

pub use classifier::{ClassifierClient, Prediction};
