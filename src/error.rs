/// Result alias that carries the crate [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the fallible edges of the crate.
///
/// Builders never fail; these cover configuration, node dispatch and
/// golden-data handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Step configuration failed validation.
    #[error("invalid step configuration: {0}")]
    InvalidConfig(String),

    /// Step configuration text could not be parsed.
    #[error("failed to parse step configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A different step configuration was already installed for this process.
    #[error("step configuration already installed with different values")]
    ConfigConflict,

    /// A node was evaluated before one of its upstream outputs was available.
    #[error("{kind} node is missing its {input} input")]
    MissingInput {
        kind: &'static str,
        input: &'static str,
    },

    /// Golden data could not be decoded.
    #[error("failed to parse golden data: {0}")]
    GoldenParse(#[from] serde_json::Error),

    /// A golden section names a node type with no builder here.
    #[error("unsupported golden section type: {0}")]
    UnsupportedSection(String),

    /// Replayed sequence length differs from the reference.
    #[error("point count mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A replayed point field drifted beyond tolerance.
    #[error(
        "point {index} field `{field}` mismatch: expected {expected}, got {actual} (tolerance {tolerance})"
    )]
    FieldMismatch {
        index: usize,
        field: &'static str,
        expected: f32,
        actual: f32,
        tolerance: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_names_kind_and_input() {
        let err = Error::MissingInput {
            kind: "bridge",
            input: "target anchor",
        };
        assert_eq!(err.to_string(), "bridge node is missing its target anchor input");
    }

    #[test]
    fn golden_parse_wraps_json_error() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::GoldenParse(_)));
    }
}
