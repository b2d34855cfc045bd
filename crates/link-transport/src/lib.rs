//! TCP framing and transport tuning shared by the netplay and GBA link
//! modes (spec §4.1). GB link-cable mode never constructs a [`Transport`];
//! the cable itself is owned by the core.

pub mod error;
pub mod stream_buffer;
pub mod transport;
mod tuning;

pub use error::TransportError;
pub use stream_buffer::StreamBuffer;
pub use transport::Transport;
