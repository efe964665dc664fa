pub mod auth_service;
pub mod draw_service;
pub mod participant_service;
pub mod prize_service;

pub use auth_service::*;
pub use draw_service::*;
pub use participant_service::*;
pub use prize_service::*;
