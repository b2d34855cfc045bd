use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] link_transport::TransportError),

    #[error(transparent)]
    Proto(#[from] link_proto::ProtoError),

    #[error("operation not valid in state {0:?}")]
    InvalidTransition(&'static str),

    #[error("peer did not send READY within {0:?}")]
    HandshakeTimeout(std::time::Duration),

    #[error("state-transfer size mismatch: host declared {declared}, received {received}")]
    StateSizeMismatch { declared: u32, received: u32 },

    #[error("{0}")]
    Fatal(String),
}
