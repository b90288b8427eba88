use thiserror::Error;

/// Errors that can occur when fetching a page or a tile over HTTP
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server answered with another non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),
}

impl FetchError {
    /// Whether the resource is simply absent (404) rather than unreachable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Errors raised while extracting artwork metadata from a page
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The page carries no `__RELAY_BOOTSTRAP__` payload
    #[error("Could not find the embedded JSON payload in the page")]
    MarkerNotFound,

    /// The payload string contains an invalid escape sequence
    #[error("Invalid escape sequence in embedded payload: {0}")]
    Unescape(String),

    /// The decoded payload is not valid JSON or has an unexpected shape
    #[error("Invalid JSON payload: {0}")]
    Json(String),

    /// The page body is not valid UTF-8
    #[error("Page is not valid UTF-8: {0}")]
    Encoding(String),

    /// The slug cannot be used as part of a file name
    #[error("Invalid artwork slug: {0:?}")]
    InvalidSlug(String),

    /// A required field is missing from the payload
    #[error("Missing field in payload: {0}")]
    MissingField(&'static str),

    /// A figure's deep-zoom record has unusable geometry
    #[error("Invalid deep-zoom descriptor for figure {figure}: {message}")]
    InvalidDescriptor { figure: usize, message: String },
}

/// Errors that abort the assembly of a single figure
#[derive(Debug, Clone, Error)]
pub enum AssembleError {
    /// Tile (0, 0) is not reachable even at zoom level 0
    #[error("No tile set available at {base_url}")]
    NoTileset { base_url: String },

    /// Image or tile dimensions cannot be turned into a grid
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Errors raised by an image sink
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    /// The output location could not be created or written
    #[error("I/O error: {0}")]
    Io(String),

    /// The image could not be encoded in the requested format
    #[error("Encode error: {0}")]
    Encode(String),
}

/// Top-level errors of a stitching run
#[derive(Debug, Clone, Error)]
pub enum StitchError {
    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The artwork page could not be retrieved
    #[error("Failed to fetch page: {0}")]
    Page(#[from] FetchError),

    /// Metadata extraction failed
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A figure could not be assembled
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    /// A figure could not be saved
    #[error("Failed to save image: {0}")]
    Sink(#[from] SinkError),
}
