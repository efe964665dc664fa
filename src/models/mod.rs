pub mod auth;
pub mod draw;
pub mod pagination;
pub mod participant;
pub mod prize;

pub use auth::*;
pub use draw::*;
pub use pagination::*;
pub use participant::*;
pub use prize::*;
