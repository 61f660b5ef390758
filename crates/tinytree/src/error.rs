use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur in tree cache operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    NotFound(PathBuf),
    NotADirectory(PathBuf),
    NotAFile(PathBuf),
    AlreadyExists(PathBuf),
    EmptyPath,
}

impl Error {
    pub fn not_found<P: AsRef<Path>>(path: P) -> Self {
        Error::NotFound(path.as_ref().to_path_buf())
    }

    pub fn not_a_directory<P: AsRef<Path>>(path: P) -> Self {
        Error::NotADirectory(path.as_ref().to_path_buf())
    }

    pub fn not_a_file<P: AsRef<Path>>(path: P) -> Self {
        Error::NotAFile(path.as_ref().to_path_buf())
    }

    pub fn already_exists<P: AsRef<Path>>(path: P) -> Self {
        Error::AlreadyExists(path.as_ref().to_path_buf())
    }

    pub fn empty_path() -> Self {
        Error::EmptyPath
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NotFound(path) => write!(f, "Path not found: {}", path.display()),
            Error::NotADirectory(path) => write!(f, "Not a directory: {}", path.display()),
            Error::NotAFile(path) => write!(f, "Not a file: {}", path.display()),
            Error::AlreadyExists(path) => write!(f, "Entry already exists: {}", path.display()),
            Error::EmptyPath => write!(f, "Path is empty"),
        }
    }
}

impl std::error::Error for Error {}
