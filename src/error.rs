use miette::Diagnostic;
use thiserror::Error;

/// Main error type for rastershade operations
#[derive(Error, Diagnostic, Debug)]
pub enum ShadeError {
    #[error("IO error: {0}")]
    #[diagnostic(code(rastershade::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(rastershade::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(rastershade::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid colormap: {message}")]
    #[diagnostic(code(rastershade::colormap))]
    InvalidColormap {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid span: {message}")]
    #[diagnostic(code(rastershade::span))]
    InvalidSpan {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid interpolation method: {name}")]
    #[diagnostic(
        code(rastershade::how),
        help("Use one of: linear, log, cbrt, eq_hist")
    )]
    InvalidHow { name: String },

    #[error("Invalid spread: {message}")]
    #[diagnostic(code(rastershade::spread))]
    InvalidSpread {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid threshold: {message}")]
    #[diagnostic(code(rastershade::threshold))]
    InvalidThreshold { message: String },

    #[error("Shape mismatch: {message}")]
    #[diagnostic(code(rastershade::shape))]
    ShapeMismatch { message: String },

    #[error("Invalid aggregate: {message}")]
    #[diagnostic(code(rastershade::aggregate))]
    InvalidAggregate {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Encode error: {message}")]
    #[diagnostic(code(rastershade::encode))]
    Encode { message: String },
}

pub type Result<T> = std::result::Result<T, ShadeError>;
