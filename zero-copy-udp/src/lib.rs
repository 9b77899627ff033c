// Public modules and re-exports
pub mod buffer;
pub mod config;
pub mod create;
pub mod mmap;
pub mod pool;
pub mod queue;
pub mod resolve;
pub mod socket;
pub mod sockopt;

pub use buffer::{RecvBuffer, SendBuffer};
pub use config::{DEFAULT_NUM_FRAMES, TransportConfig, UDP_MTU};
pub use create::create_transport;
pub use socket::{Transport, TransportStats};
pub use sockopt::SockBuf;

// Internal modules, hidden from documentation
#[doc(hidden)]
pub mod lane;
#[doc(hidden)]
pub mod poll;
#[doc(hidden)]
pub mod recv;
#[doc(hidden)]
pub mod send;

mod tests;
