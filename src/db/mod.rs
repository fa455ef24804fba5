pub mod accounts;
pub mod events;
pub mod news;
