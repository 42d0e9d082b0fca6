//! Application errors
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
}

impl std::error::Error for AppError {}

#[derive(Debug)]
pub enum ErrorKind {
    Chip8(chip8_core::Chip8Error),
    Io(std::io::Error),
    Config(serde_yaml::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "application error: {}", self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chip8(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "invalid run configuration: {err}"),
        }
    }
}

impl From<chip8_core::Chip8Error> for AppError {
    fn from(err: chip8_core::Chip8Error) -> Self {
        Self {
            kind: ErrorKind::Chip8(err),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err),
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        Self {
            kind: ErrorKind::Config(err),
        }
    }
}
