pub mod clock;
pub mod session;

pub use clock::Clock;
pub use session::Session;
