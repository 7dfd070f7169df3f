//! Route handlers behind `handle_request`. Each takes the raw query string
//! (GET) or body (POST) and returns a JSON document.

pub mod data;
pub mod profile;
pub mod progress;
pub mod session;
pub mod settings;
pub mod util;
pub mod vocabulary;
pub mod words;
