use hotg_rune_proc_blocks::ndarray::Array2;

use crate::{
    errors::EncoderError,
    vocab::{TokenId, PADDING_ID},
};

/// Which end of a sequence padding is added to or tokens are removed from.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::EnumVariantNames,
    strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Pre,
    #[default]
    Post,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PaddingConfig {
    /// The length every sequence is padded or truncated to. When unset, the
    /// longest sequence in the batch is used.
    pub maxlen: Option<usize>,
    pub padding: Side,
    pub truncating: Side,
}

impl PaddingConfig {
    pub fn new(maxlen: usize) -> Self {
        PaddingConfig {
            maxlen: Some(maxlen),
            ..Default::default()
        }
    }

    pub fn with_padding(self, padding: Side) -> Self {
        PaddingConfig { padding, ..self }
    }

    pub fn with_truncating(self, truncating: Side) -> Self {
        PaddingConfig { truncating, ..self }
    }

    pub fn validate(&self) -> Result<(), EncoderError> {
        if self.maxlen == Some(0) {
            return Err(EncoderError::invalid_config(
                "maxlen",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Pad or truncate a single sequence so it has exactly `maxlen` elements.
pub fn pad_sequence(
    sequence: &[TokenId],
    maxlen: usize,
    padding: Side,
    truncating: Side,
) -> Vec<TokenId> {
    let kept = if sequence.len() > maxlen {
        match truncating {
            Side::Pre => &sequence[sequence.len() - maxlen..],
            Side::Post => &sequence[..maxlen],
        }
    } else {
        sequence
    };

    let fill = maxlen - kept.len();
    let mut padded = Vec::with_capacity(maxlen);

    match padding {
        Side::Pre => {
            padded.resize(fill, PADDING_ID);
            padded.extend_from_slice(kept);
        },
        Side::Post => {
            padded.extend_from_slice(kept);
            padded.resize(maxlen, PADDING_ID);
        },
    }

    padded
}

/// Assemble a rectangular `(sequences.len(), maxlen)` batch.
///
/// # Examples
///
/// ```rust
/// # use hotg_rune_proc_blocks::ndarray;
/// # use text_sequence_encoder::{pad_sequences, PaddingConfig, Side};
/// let sequences = vec![vec![1, 2, 3], vec![1, 2, 3, 4, 5]];
/// let config = PaddingConfig::new(4).with_padding(Side::Pre);
///
/// let batch = pad_sequences(&sequences, &config)?;
///
/// assert_eq!(batch, ndarray::arr2(&[[0, 1, 2, 3], [1, 2, 3, 4]]));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn pad_sequences<S>(
    sequences: &[S],
    config: &PaddingConfig,
) -> Result<Array2<TokenId>, EncoderError>
where
    S: AsRef<[TokenId]>,
{
    config.validate()?;

    let maxlen = config.maxlen.unwrap_or_else(|| {
        sequences
            .iter()
            .map(|s| s.as_ref().len())
            .max()
            .unwrap_or_default()
    });

    let mut batch = Array2::zeros((sequences.len(), maxlen));

    for (mut row, sequence) in batch.rows_mut().into_iter().zip(sequences) {
        let sequence = sequence.as_ref();

        if sequence.len() > maxlen {
            tracing::trace!(
                length = sequence.len(),
                maxlen,
                "Truncating a sequence"
            );
        }

        let padded =
            pad_sequence(sequence, maxlen, config.padding, config.truncating);
        row.iter_mut()
            .zip(padded)
            .for_each(|(dest, id)| *dest = id);
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use hotg_rune_proc_blocks::ndarray;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sequences() -> Vec<Vec<TokenId>> { vec![vec![1, 2, 3], vec![1, 2, 3, 4, 5]] }

    #[test]
    fn post_padding() {
        let config = PaddingConfig::new(7);

        let batch = pad_sequences(&sequences(), &config).unwrap();

        assert_eq!(
            batch,
            ndarray::arr2(&[[1, 2, 3, 0, 0, 0, 0], [1, 2, 3, 4, 5, 0, 0]])
        );
    }

    #[test]
    fn pre_padding() {
        let config = PaddingConfig::new(7).with_padding(Side::Pre);

        let batch = pad_sequences(&sequences(), &config).unwrap();

        assert_eq!(
            batch,
            ndarray::arr2(&[[0, 0, 0, 0, 1, 2, 3], [0, 0, 1, 2, 3, 4, 5]])
        );
    }

    #[test]
    fn truncate_from_the_back() {
        let padded = pad_sequence(&[1, 2, 3, 4, 5], 3, Side::Post, Side::Post);

        assert_eq!(padded, vec![1, 2, 3]);
    }

    #[test]
    fn truncate_from_the_front() {
        let padded = pad_sequence(&[1, 2, 3, 4, 5], 3, Side::Post, Side::Pre);

        assert_eq!(padded, vec![3, 4, 5]);
    }

    #[test]
    fn sequences_of_the_right_length_are_unchanged() {
        for padding in [Side::Pre, Side::Post] {
            for truncating in [Side::Pre, Side::Post] {
                let padded = pad_sequence(&[7, 8, 9], 3, padding, truncating);
                assert_eq!(padded, vec![7, 8, 9]);
            }
        }
    }

    #[test]
    fn padding_twice_changes_nothing() {
        let once = pad_sequence(&[4, 5], 6, Side::Pre, Side::Pre);
        let twice = pad_sequence(&once, 6, Side::Pre, Side::Pre);

        assert_eq!(once, twice);
    }

    #[test]
    fn empty_sequences_are_all_padding() {
        let padded = pad_sequence(&[], 4, Side::Post, Side::Post);

        assert_eq!(padded, vec![0, 0, 0, 0]);
    }

    #[test]
    fn without_maxlen_the_longest_sequence_wins() {
        let config = PaddingConfig::default();

        let batch = pad_sequences(&sequences(), &config).unwrap();

        assert_eq!(batch.dim(), (2, 5));
        assert_eq!(batch.row(0).to_vec(), vec![1, 2, 3, 0, 0]);
    }

    #[test]
    fn empty_batch() {
        let empty: Vec<Vec<TokenId>> = Vec::new();

        let batch = pad_sequences(&empty, &PaddingConfig::new(3)).unwrap();

        assert_eq!(batch.dim(), (0, 3));
    }

    #[test]
    fn zero_maxlen_is_rejected() {
        let err = pad_sequences(&sequences(), &PaddingConfig::new(0))
            .unwrap_err();

        assert!(matches!(
            err,
            EncoderError::InvalidConfig {
                option: "maxlen",
                ..
            }
        ));
    }

    #[test]
    fn sides_round_trip_through_strings() {
        assert_eq!("pre".parse::<Side>().unwrap(), Side::Pre);
        assert_eq!("post".parse::<Side>().unwrap(), Side::Post);
        assert_eq!(Side::Pre.to_string(), "pre");
        assert!("middle".parse::<Side>().is_err());
        assert_eq!(Side::default(), Side::Post);
    }
}
