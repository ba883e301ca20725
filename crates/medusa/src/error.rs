#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two nodes share an id; the id-keyed position map would be ill-defined.
    #[error("graph contains duplicate node id: {id}")]
    DuplicateNode { id: String },
    /// A persisted or user-supplied layout-kind token matched no known kind.
    #[error("unknown layout kind token: {token}")]
    UnknownLayoutKind { token: String },
}

pub type Result<T> = std::result::Result<T, Error>;
