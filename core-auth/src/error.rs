use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Session coordinator was already initialized")]
    AlreadyInitialized,

    #[error(
        "Identity provider project id is missing. \
         Set it with AuthConfig::builder().project_id() or the SESSION_PROJECT_ID environment variable."
    )]
    MissingProjectId,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Credential storage unavailable: {0}")]
    Storage(String),

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
