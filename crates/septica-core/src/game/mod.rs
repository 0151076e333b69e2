pub mod events;
pub mod serialization;
pub mod state;
