use crate::layout::NodeLayoutKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("tension must lie within [0, 1], got {tension}")]
    InvalidTension { tension: f32 },

    #[error("edge #{edge} has an endpoint (node #{node}) outside the laid out node set")]
    UnknownEndpoint { edge: usize, node: usize },

    #[error("edge #{edge}: ancestor {ancestor} of an endpoint is outside the laid out node set")]
    MissingAncestor { edge: usize, ancestor: String },

    #[error("no implementation registered for node layout {kind}")]
    UnsupportedLayout { kind: NodeLayoutKind },

    #[error("node layout {kind} cannot host sublayouts")]
    CannotHostSublayouts { kind: NodeLayoutKind },

    #[error("invalid {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error(transparent)]
    Hierarchy(#[from] skyline_hierarchy::Error),

    #[error("layout configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
