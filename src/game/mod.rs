//! Game state module: the persisted aggregates, the engine that owns them,
//! and the attempt flows played on top of it. State lives in WASM memory
//! (thread_local) and is written through to localStorage on every change.

pub mod achievements;
pub mod engine;
pub mod play;
pub mod profile;
pub mod progress;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod state;
pub mod words;
