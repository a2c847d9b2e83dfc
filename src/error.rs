use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Anything else is handled at the item boundary and only
/// surfaces in the run summary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("spreadsheet write failed: {0}")]
    Write(#[from] WriteError),

    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential file unreadable: {}: {source}", path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file malformed: {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("token refresh request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token refresh rejected (HTTP {status}): {body}")]
    RefreshRejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("could not persist refreshed token: {0}")]
    Persist(#[source] std::io::Error),
}

/// Per-page search failure. Never propagated past the page: the page
/// contributes zero identifiers and the run continues.
#[derive(Debug, Error)]
pub enum SearchPageError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Per-listing failure. The listing is skipped and counted; the run continues.
#[derive(Debug, Error)]
pub enum DetailError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("detail page returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("missing mandatory field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rejected by the spreadsheet service (HTTP {status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response from the spreadsheet service: {0}")]
    MalformedResponse(&'static str),
}
