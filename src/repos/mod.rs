//! Repos is a module responsible for interacting with postgres db
#[macro_use]
pub mod acl;
pub mod bookings;
pub mod brands;
pub mod categories;
pub mod contact_messages;
pub mod content_blocks;
pub mod device_models;
pub mod repair_services;
pub mod repo_factory;
pub mod settings;
pub mod staff_users;
pub mod types;

pub use self::acl::*;
pub use self::bookings::*;
pub use self::brands::*;
pub use self::categories::*;
pub use self::contact_messages::*;
pub use self::content_blocks::*;
pub use self::device_models::*;
pub use self::repair_services::*;
pub use self::repo_factory::*;
pub use self::settings::*;
pub use self::staff_users::*;
pub use self::types::*;
