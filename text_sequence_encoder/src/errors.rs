/// Errors produced while building or using a [`crate::Vocabulary`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncoderError {
    #[error("Invalid value for \"{option}\": {reason}")]
    InvalidConfig {
        option: &'static str,
        reason: String,
    },
    #[error("The corpus doesn't contain any tokens")]
    EmptyCorpus,
    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),
    #[error("The vocabulary has more tokens than can be represented by an i32")]
    TooManyTokens,
}

impl EncoderError {
    pub(crate) fn invalid_config(
        option: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        EncoderError::InvalidConfig {
            option,
            reason: reason.into(),
        }
    }
}
