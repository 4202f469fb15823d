//! PostgreSQL implementations of the store traits.

pub mod share;
pub mod user;

pub use share::ShareRepository;
pub use user::UserRepository;
