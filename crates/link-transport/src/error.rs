use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("peer closed the connection")]
    Closed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Proto(#[from] link_proto::ProtoError),

    #[error("receive buffer grew past the {0}-byte hard cap")]
    BufferOverflow(usize),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("send stalled past the {0:?} budget for this link mode")]
    Fatal(std::time::Duration),
}
