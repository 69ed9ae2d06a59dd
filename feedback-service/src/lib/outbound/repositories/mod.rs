pub mod feedback;
pub mod user;

pub use feedback::PostgresFeedbackRepository;
pub use user::PostgresUserRepository;
