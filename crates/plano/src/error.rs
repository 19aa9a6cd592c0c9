use thiserror::Error;

/// Failure reported by a [`crate::CourtSource`] implementation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanoError {
    #[error("invalid zoom bounds: min-zoom {min} is greater than max-zoom {max}")]
    InvalidZoomBounds { min: f64, max: f64 },

    #[error("invalid viewport config: {0}")]
    InvalidConfig(String),

    #[error("reposition session busy: court `{active}` is being dragged")]
    SessionBusy { active: String },

    #[error("court `{0}` not found")]
    NotFound(String),

    #[error("failed to fetch courts for `{container}`")]
    Fetch {
        container: String,
        #[source]
        source: SourceError,
    },

    #[error("failed to persist position of court `{id}`")]
    Persist {
        id: String,
        #[source]
        source: SourceError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformParseError {
    #[error("unrecognized transform `{0}`")]
    Unrecognized(String),

    #[error("transform matrix is not a uniform scale (a={a}, b={b}, c={c}, d={d})")]
    NotUniformScale { a: f64, b: f64, c: f64, d: f64 },

    #[error("invalid number `{0}` in transform")]
    InvalidNumber(String),
}
