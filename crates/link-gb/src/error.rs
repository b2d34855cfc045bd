use thiserror::Error;

#[derive(Error, Debug)]
pub enum GbLinkError {
    #[error(transparent)]
    Session(#[from] link_session::SessionError),

    #[error("core option write failed: {0}")]
    OptionWrite(String),
}
