pub mod auth;
pub mod friends;
pub mod register;
pub mod users;
