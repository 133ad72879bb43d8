//! gRPC service implementations for Roster.
//!
//! Each handler is stateless across calls: requests are translated into
//! repository operations and repository results back into wire messages,
//! with nothing held between invocations.

mod posts;
mod users;

pub use posts::PostServiceImpl;
pub use users::UserServiceImpl;
