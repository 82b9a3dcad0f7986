#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("making {parent} the parent of {child} would create a cycle")]
    Cycle { child: String, parent: String },

    #[error("lowest common ancestors require at least one root")]
    NoRoots,
}

pub type Result<T> = std::result::Result<T, Error>;
