use thiserror::Error;

#[derive(Error, Debug)]
pub enum GbaLinkError {
    #[error(transparent)]
    Session(#[from] link_session::SessionError),

    #[error(transparent)]
    Transport(#[from] link_transport::TransportError),

    #[error(transparent)]
    Proto(#[from] link_proto::ProtoError),

    #[error(transparent)]
    Discovery(#[from] link_discovery::DiscoveryError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
