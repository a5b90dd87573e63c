/// Broad category of a failure, used to pick the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent input data (token count, mixed arity, bad numbers).
    Format,
    /// Invalid option values.
    Config,
    /// Filesystem failures while reading input or writing artifacts.
    Io,
    /// Too few bootstrap values to estimate a variance.
    DegenerateSample,
    /// A bootstrap slot hit its attempt cap without a successful fit.
    ResampleExhausted,
    /// A computation produced values that cannot be used (e.g. zero y-range).
    Numeric,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Format | ErrorKind::Config | ErrorKind::Io => 2,
            ErrorKind::DegenerateSample | ErrorKind::Numeric => 4,
            ErrorKind::ResampleExhausted => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_follows_kind() {
        assert_eq!(AppError::format("bad").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::DegenerateSample, "n=1").exit_code(), 4);
        assert_eq!(AppError::new(ErrorKind::ResampleExhausted, "cap").exit_code(), 5);
        assert_eq!(AppError::config("x").to_string(), "x");
    }
}
