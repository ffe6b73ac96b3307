pub mod arbiter;
pub use arbiter::*;

pub mod clients;
pub use clients::*;

pub mod handlers;
pub use handlers::*;

pub mod scheduler;
pub use scheduler::*;

pub mod server;
pub use server::*;

pub mod timer;
pub use timer::*;

pub mod workspace;
pub use workspace::*;
