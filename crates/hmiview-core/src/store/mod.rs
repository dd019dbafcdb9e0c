// ── Shared status store ──
//
// The one mutable record in the engine, readable from any thread.

mod status_store;

pub use status_store::StatusStore;
