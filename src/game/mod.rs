pub mod engine;
pub use engine::*;

pub mod history;
pub use history::*;

pub mod phase;
pub use phase::*;

pub mod player;
pub use player::*;

pub mod proposal;
pub use proposal::*;

pub mod resolution;
pub use resolution::*;

pub mod state;
pub use state::*;

pub mod summary;
pub use summary::*;
