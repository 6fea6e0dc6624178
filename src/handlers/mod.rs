mod auth_handler;
mod benchmark_handler;
mod like_handler;
mod submission_handler;
mod upload_handler;

pub use auth_handler::*;
pub use benchmark_handler::*;
pub use like_handler::*;
pub use submission_handler::*;
pub use upload_handler::*;
