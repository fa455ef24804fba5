pub mod account;
pub mod event;
pub mod news;

pub use account::Account;
pub use event::Event;
pub use news::News;
