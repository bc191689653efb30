//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems.

pub mod admin;
pub mod ai;
pub mod diet;
pub mod energy;
pub mod message;
pub mod profile;
pub mod user;
pub mod workout;

pub use admin::AdminService;
pub use ai::AiService;
pub use diet::DietService;
pub use energy::EnergyService;
pub use message::MessageService;
pub use profile::ProfileService;
pub use user::UserService;
pub use workout::WorkoutService;
