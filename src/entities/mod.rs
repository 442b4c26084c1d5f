pub mod prelude;

pub mod complaints;
pub mod prediction_log;
pub mod sessions;
pub mod status_history;
pub mod users;
