pub mod draw_history;
pub mod participants;
pub mod prizes;
pub mod users;

pub use draw_history as draw_history_entity;
pub use participants as participant_entity;
pub use prizes as prize_entity;
pub use users as user_entity;
pub use users::UserRole;
