pub mod admins;
pub mod media;
pub mod messages;
pub mod products;
