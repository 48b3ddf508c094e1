use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum PDFError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),

    #[error("a page referenced by the document is missing")]
    /// The page order refers to a page that is no longer in the document
    PageMissing,

    #[error("no page has been started yet")]
    /// Something was drawn before the first page was added
    NoPage,

    #[error("`{0}` is a reserved tag name")]
    /// A style was registered under one of the engine's pseudo-tags
    ReservedTag(String),

    #[error("tag names cannot be empty")]
    /// A style was registered without a tag name
    EmptyTagName,

    #[error("`{0}` is not a valid font size")]
    /// A style size that is neither a number nor a percentage
    InvalidFontSize(String),

    #[error("`{0}` is not a valid colour")]
    /// A colour string that doesn't have 1, 3, or 4 numeric components
    InvalidColour(String),

    #[error("`{0}` is not a valid alignment")]
    /// An alignment string other than L, R, C, or J
    InvalidAlign(String),

    #[error("text was drawn before a style was activated")]
    /// A cell with text was drawn while no font was selected
    NoActiveStyle,

    #[error("no font registered for family `{family}` (variant `{variant}`)")]
    /// A style names a font that the surface doesn't know about
    UnknownFont { family: String, variant: String },

    #[error("text flow did not finish after {0} page breaks")]
    /// The host kept accepting page breaks without ever making room for a line
    PaginationRunaway(usize),
}
