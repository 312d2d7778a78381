pub mod clock;
pub mod directory;
pub mod gateway;
pub mod session;

pub use clock::*;
pub use directory::*;
pub use gateway::*;
pub use session::*;
