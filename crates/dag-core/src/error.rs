use crate::id::Id;
use thiserror::Error;

/// Failures of the exchange layer. Editing operations never fail.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid graph json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id `{0}`")]
    DuplicateNode(Id),

    #[error("duplicate port id `{port}` on node `{node}`")]
    DuplicatePort { node: Id, port: Id },

    #[error("duplicate edge id `{0}`")]
    DuplicateEdge(Id),

    #[error("edge `{edge}` references missing node `{node}`")]
    DanglingEdge { edge: Id, node: Id },
}

pub type Result<T> = std::result::Result<T, GraphError>;
