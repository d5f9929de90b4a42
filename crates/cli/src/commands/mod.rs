pub mod chat;
pub mod context;
pub mod doctor;
pub mod onboard;
pub mod repl;
pub mod status;
pub mod upload;
