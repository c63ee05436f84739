pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Parse error - {0}")]
    Parse(#[from] ParseError),

    #[error("count must be positive (got {count})")]
    NonPositiveCount { count: u32 },

    #[error("no rolls to modify")]
    NoRolls,
}

/// Failures while reading dice notation such as `3d6`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{notation:?} is not of the form <count>d<sides>")]
    Malformed { notation: String },

    #[error("{notation:?} does not fit in a 32-bit dice count or side count")]
    Overflow { notation: String },
}

impl ParseError {
    pub fn notation(&self) -> &str {
        match self {
            ParseError::Malformed { notation } | ParseError::Overflow { notation } => notation,
        }
    }
}
