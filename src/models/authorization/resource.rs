//! Enum for resources available in ACLs
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resource {
    Bookings,
    Brands,
    Categories,
    ContactMessages,
    ContentBlocks,
    DeviceModels,
    RepairServices,
    Settings,
    StaffUsers,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Resource::Bookings => write!(f, "bookings"),
            Resource::Brands => write!(f, "brands"),
            Resource::Categories => write!(f, "categories"),
            Resource::ContactMessages => write!(f, "contact messages"),
            Resource::ContentBlocks => write!(f, "content blocks"),
            Resource::DeviceModels => write!(f, "device models"),
            Resource::RepairServices => write!(f, "repair services"),
            Resource::Settings => write!(f, "settings"),
            Resource::StaffUsers => write!(f, "staff users"),
        }
    }
}
