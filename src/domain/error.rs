//! Domain error types.

/// A parse error with position information for rule parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    ///
    /// `position` is a byte offset; the caret column counts characters.
    pub fn display_with_context(&self, input: &str) -> String {
        let column = input
            .char_indices()
            .take_while(|(offset, _)| *offset < self.position)
            .count();
        let caret = " ".repeat(column) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("unknown indicator algorithm '{name}'")]
    UnknownAlgorithm { name: String },

    #[error("invalid parameter for indicator '{indicator}': {reason}")]
    InvalidParameter { indicator: String, reason: String },

    #[error("rule references undefined operand '{name}'")]
    UndefinedOperand { name: String },

    #[error("indicator '{indicator}' reads input '{input}' which does not exist")]
    UnknownInput { indicator: String, input: String },

    #[error("column '{name}' is produced more than once")]
    DuplicateColumn { name: String },

    #[error("{combinator} requires at least one child rule")]
    EmptyCombinator { combinator: &'static str },

    #[error("invalid strategy: {reason}")]
    InvalidStrategy { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    RuleParse(#[from] ParseError),

    #[error("bar {index} is out of order: timestamps must be strictly increasing")]
    BarOrder { index: usize },

    #[error("bar {index} is invalid: {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error("column '{name}' has {actual} values, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtraderError {
    /// True for errors caused by a malformed strategy configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SigtraderError::UnknownAlgorithm { .. }
                | SigtraderError::InvalidParameter { .. }
                | SigtraderError::UndefinedOperand { .. }
                | SigtraderError::UnknownInput { .. }
                | SigtraderError::DuplicateColumn { .. }
                | SigtraderError::EmptyCombinator { .. }
                | SigtraderError::InvalidStrategy { .. }
                | SigtraderError::ConfigParse { .. }
                | SigtraderError::ConfigMissing { .. }
                | SigtraderError::ConfigInvalid { .. }
                | SigtraderError::RuleParse(_)
        )
    }
}

impl SigtraderError {
    /// Process exit status: 1 I/O, 2 configuration, 3 data, 4 rule.
    pub fn exit_status(&self) -> u8 {
        match self {
            SigtraderError::Io(_) => 1,
            SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. }
            | SigtraderError::UnknownAlgorithm { .. }
            | SigtraderError::InvalidParameter { .. }
            | SigtraderError::UnknownInput { .. }
            | SigtraderError::DuplicateColumn { .. }
            | SigtraderError::InvalidStrategy { .. } => 2,
            SigtraderError::BarOrder { .. }
            | SigtraderError::InvalidBar { .. }
            | SigtraderError::LengthMismatch { .. }
            | SigtraderError::Data { .. } => 3,
            SigtraderError::RuleParse(_)
            | SigtraderError::UndefinedOperand { .. }
            | SigtraderError::EmptyCombinator { .. } => 4,
        }
    }
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
