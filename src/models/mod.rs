//! Models contains all structures that are used in different
//! modules of the app

pub mod authorization;
pub mod booking;
pub mod brand;
pub mod category;
pub mod contact_message;
pub mod content_block;
pub mod device_model;
pub mod language;
pub mod price;
pub mod repair_service;
pub mod search;
pub mod session;
pub mod setting;
pub mod site;
pub mod staff_user;
pub mod validation_rules;
pub mod wizard;

pub use self::authorization::*;
pub use self::booking::*;
pub use self::brand::*;
pub use self::category::*;
pub use self::contact_message::*;
pub use self::content_block::*;
pub use self::device_model::*;
pub use self::language::*;
pub use self::price::*;
pub use self::repair_service::*;
pub use self::search::*;
pub use self::session::*;
pub use self::setting::*;
pub use self::site::*;
pub use self::staff_user::*;
pub use self::validation_rules::*;
pub use self::wizard::*;
