pub use super::complaints::Entity as Complaints;
pub use super::prediction_log::Entity as PredictionLog;
pub use super::sessions::Entity as Sessions;
pub use super::status_history::Entity as StatusHistory;
pub use super::users::Entity as Users;
