//! Turn free text into fixed-length sequences of integer token ids.
//!
//! A [`Vocabulary`] is built from a corpus, ranking words by how often they
//! occur. Text is then encoded against that vocabulary and each sequence is
//! padded or truncated to the same length so a batch of them can be fed to
//! an embedding layer.

mod errors;
mod padding;
mod tokenizer;
mod vocab;

pub use crate::{
    errors::EncoderError,
    padding::{pad_sequence, pad_sequences, PaddingConfig, Side},
    tokenizer::{Tokenizer, DEFAULT_FILTERS},
    vocab::{
        TokenId, TokenStats, UnknownTokens, Vocabulary, VocabularyConfig,
        OOV_ID, PADDING_ID,
    },
};

use hotg_rune_proc_blocks::{
    guest::{
        parse, Argument, ArgumentError, ArgumentHint, ArgumentMetadata,
        ArgumentType, CreateError, ElementType, ElementTypeConstraint, InvalidInput,
        Metadata, ProcBlock, RunError, Tensor, TensorConstraint,
        TensorConstraints, TensorHint, TensorMetadata,
    },
    ndarray::Array2,
};
use strum::VariantNames;

hotg_rune_proc_blocks::export_proc_block! {
    metadata: metadata,
    proc_block: TextSequenceEncoder,
}

fn metadata() -> Metadata {
    Metadata::new("Text Sequence Encoder", env!("CARGO_PKG_VERSION"))
        .with_description(env!("CARGO_PKG_DESCRIPTION"))
        .with_repository(env!("CARGO_PKG_REPOSITORY"))
        .with_homepage(env!("CARGO_PKG_HOMEPAGE"))
        .with_tag("nlp")
        .with_tag("text")
        .with_tag("tokenizer")
        .with_argument(
            ArgumentMetadata::new("num_words")
                .with_description(
                    "Only the (num_words - 1) most frequent words are kept. All words are kept if this isn't set.",
                )
                .with_hint(ArgumentHint::NonNegativeNumber),
        )
        .with_argument(
            ArgumentMetadata::new("oov_token")
                .with_description(
                    "A marker used in place of words that aren't in the vocabulary. Those words are dropped if this isn't set.",
                )
                .with_hint(ArgumentType::String),
        )
        .with_argument(
            ArgumentMetadata::new("maxlen")
                .with_description("The length of every encoded sequence.")
                .with_hint(ArgumentHint::NonNegativeNumber),
        )
        .with_argument(
            ArgumentMetadata::new("padding")
                .with_description(
                    "Whether zeros are added to the start (\"pre\") or end (\"post\") of short sequences.",
                )
                .with_default_value(Side::Post)
                .with_hint(ArgumentHint::one_of(Side::VARIANTS)),
        )
        .with_argument(
            ArgumentMetadata::new("truncating")
                .with_description(
                    "Whether long sequences lose tokens from the start (\"pre\") or end (\"post\").",
                )
                .with_default_value(Side::Post)
                .with_hint(ArgumentHint::one_of(Side::VARIANTS)),
        )
        .with_argument(
            ArgumentMetadata::new("lowercase")
                .with_description("Convert text to lowercase before tokenizing.")
                .with_default_value(true)
                .with_hint(ArgumentType::Boolean),
        )
        .with_argument(
            ArgumentMetadata::new("filters")
                .with_description(
                    "Characters which are treated as word boundaries, in addition to whitespace.",
                )
                .with_default_value(DEFAULT_FILTERS)
                .with_hint(ArgumentType::String),
        )
        .with_input(
            TensorMetadata::new("corpus")
                .with_description("The documents used to build the vocabulary.")
                .with_hint(TensorHint::supported_shape(
                    &[ElementType::Utf8],
                    [0],
                )),
        )
        .with_input(
            TensorMetadata::new("text")
                .with_description("The strings to encode.")
                .with_hint(TensorHint::supported_shape(
                    &[ElementType::Utf8],
                    [0],
                )),
        )
        .with_output(
            TensorMetadata::new("sequences")
                .with_description(
                    "One row of token ids per string, padded or truncated to maxlen.",
                )
                .with_hint(TensorHint::supported_shape(
                    &[ElementType::I32],
                    [0, 0],
                )),
        )
        .with_output(
            TensorMetadata::new("vocabulary_size")
                .with_description(
                    "The largest token id plus one, for use as an embedding layer's input dimension.",
                )
                .with_hint(TensorHint::supported_shape(
                    &[ElementType::U32],
                    [1],
                )),
        )
}

/// Build a vocabulary from a corpus and use it to encode text as padded
/// sequences of token ids.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSequenceEncoder {
    vocabulary: VocabularyConfig,
    padding: PaddingConfig,
}

impl TextSequenceEncoder {
    pub fn new(
        vocabulary: VocabularyConfig,
        padding: PaddingConfig,
    ) -> Result<Self, EncoderError> {
        vocabulary.validate()?;
        padding.validate()?;

        if let Some(maxlen) = padding.maxlen {
            if u32::try_from(maxlen).is_err() {
                return Err(EncoderError::invalid_config(
                    "maxlen",
                    format!("must be at most {}", u32::MAX),
                ));
            }
        }

        Ok(TextSequenceEncoder {
            vocabulary,
            padding,
        })
    }

    /// Build a vocabulary, failing if the corpus has no tokens.
    pub fn fit<I>(&self, corpus: I) -> Result<Vocabulary, EncoderError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let vocab = Vocabulary::build(corpus, self.vocabulary.clone())?;
        vocab.ensure_not_empty()?;

        Ok(vocab)
    }

    /// Encode a batch of text with a previously built vocabulary.
    pub fn transform<S>(
        &self,
        vocab: &Vocabulary,
        text: &[S],
    ) -> Result<Array2<TokenId>, EncoderError>
    where
        S: AsRef<str>,
    {
        let sequences = vocab.encode_batch(text);
        pad_sequences(&sequences, &self.padding)
    }

    fn maxlen(&self) -> u32 {
        self.padding
            .maxlen
            .and_then(|maxlen| u32::try_from(maxlen).ok())
            .unwrap_or_default()
    }
}

impl ProcBlock for TextSequenceEncoder {
    fn tensor_constraints(&self) -> TensorConstraints {
        TensorConstraints {
            inputs: vec![
                TensorConstraint::new(
                    "corpus",
                    ElementTypeConstraint::UTF8,
                    vec![0],
                ),
                TensorConstraint::new(
                    "text",
                    ElementTypeConstraint::UTF8,
                    vec![0],
                ),
            ],
            outputs: vec![
                TensorConstraint::new(
                    "sequences",
                    ElementTypeConstraint::I32,
                    vec![0, self.maxlen()],
                ),
                TensorConstraint::new(
                    "vocabulary_size",
                    ElementTypeConstraint::U32,
                    vec![1],
                ),
            ],
        }
    }

    fn run(&self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>, RunError> {
        let TensorConstraints { inputs: expected, .. } =
            self.tensor_constraints();
        for constraint in &expected {
            Tensor::get_named(&inputs, &constraint.name)?.check(constraint)?;
        }

        let corpus = Tensor::get_named(&inputs, "corpus")?.string_view_1d()?;
        let text = Tensor::get_named(&inputs, "text")?.string_view_1d()?;

        let vocab = self.fit(&corpus).map_err(|e| match e {
            EncoderError::EmptyCorpus => {
                RunError::from(InvalidInput::invalid_value("corpus", e))
            },
            other => RunError::other(other),
        })?;

        let sequences = self.transform(&vocab, &text).map_err(RunError::other)?;

        let vocabulary_size = u32::try_from(vocab.vocabulary_size())
            .map_err(|_| RunError::other(EncoderError::TooManyTokens))?;

        tracing::debug!(
            documents = corpus.len(),
            strings = text.len(),
            vocabulary_size,
            "Encoded text"
        );

        Ok(vec![
            Tensor::new("sequences", &sequences),
            Tensor::new_1d("vocabulary_size", &[vocabulary_size]),
        ])
    }
}

impl TryFrom<Vec<Argument>> for TextSequenceEncoder {
    type Error = CreateError;

    fn try_from(args: Vec<Argument>) -> Result<Self, Self::Error> {
        let defaults = Tokenizer::default();
        let tokenizer = Tokenizer {
            lowercase: parse::optional_arg(&args, "lowercase")?
                .unwrap_or(defaults.lowercase),
            filters: parse::optional_arg(&args, "filters")?
                .unwrap_or(defaults.filters),
            ..defaults
        };

        let vocabulary = VocabularyConfig {
            num_words: parse::optional_arg(&args, "num_words")?,
            oov_token: parse::optional_arg(&args, "oov_token")?,
            tokenizer,
        };

        let padding = PaddingConfig {
            maxlen: Some(parse::required_arg(&args, "maxlen")?),
            padding: parse::optional_arg(&args, "padding")?.unwrap_or_default(),
            truncating: parse::optional_arg(&args, "truncating")?
                .unwrap_or_default(),
        };

        TextSequenceEncoder::new(vocabulary, padding).map_err(|e| match e {
            EncoderError::InvalidConfig { option, reason } => {
                ArgumentError::invalid_value(option, reason).into()
            },
            other => CreateError::other(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use hotg_rune_proc_blocks::{
        guest::{ArgumentErrorReason, Dimensions, InvalidInputReason},
        ndarray,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    const CORPUS: [&str; 3] = [
        "This is the first sentence",
        "This is the second sentence",
        "This is the third sentence which has more words",
    ];

    fn args(pairs: &[(&str, &str)]) -> Vec<Argument> {
        pairs
            .iter()
            .map(|&(name, value)| Argument::new(name, value))
            .collect()
    }

    fn inputs(corpus: &[&str], text: &[&str]) -> Vec<Tensor> {
        vec![
            Tensor::from_strings_1d("corpus", corpus),
            Tensor::from_strings_1d("text", text),
        ]
    }

    #[test]
    fn encode_with_an_oov_marker() {
        let proc_block = TextSequenceEncoder::try_from(args(&[
            ("num_words", "5"),
            ("oov_token", "<OOV>"),
            ("maxlen", "7"),
        ]))
        .unwrap();

        let outputs = proc_block
            .run(inputs(&CORPUS, &["This is the first sentence"]))
            .unwrap();

        let sequences = Tensor::get_named(&outputs, "sequences")
            .unwrap()
            .view_2d::<i32>()
            .unwrap();
        assert_eq!(sequences, ndarray::arr2(&[[2, 3, 4, 1, 5, 0, 0]]));
        let vocabulary_size = Tensor::get_named(&outputs, "vocabulary_size")
            .unwrap()
            .view_1d::<u32>()
            .unwrap();
        assert_eq!(vocabulary_size, ndarray::arr1(&[6_u32]));
    }

    #[test]
    fn pre_padding_and_truncating() {
        let proc_block = TextSequenceEncoder::try_from(args(&[
            ("maxlen", "3"),
            ("padding", "pre"),
            ("truncating", "pre"),
        ]))
        .unwrap();

        let outputs = proc_block
            .run(inputs(&CORPUS, &["sentence", "this is the first sentence"]))
            .unwrap();

        let sequences = Tensor::get_named(&outputs, "sequences")
            .unwrap()
            .view_2d::<i32>()
            .unwrap();
        assert_eq!(sequences, ndarray::arr2(&[[0, 0, 4], [3, 5, 4]]));
    }

    #[test]
    fn defaults_are_used_for_optional_arguments() {
        let proc_block =
            TextSequenceEncoder::try_from(args(&[("maxlen", "10")])).unwrap();

        let vocabulary = VocabularyConfig::default();
        assert_eq!(
            proc_block,
            TextSequenceEncoder {
                vocabulary,
                padding: PaddingConfig::new(10),
            }
        );
    }

    #[test]
    fn maxlen_is_required() {
        let err = TextSequenceEncoder::try_from(args(&[("num_words", "5")]))
            .unwrap_err();

        match err {
            CreateError::Argument(e) => {
                assert_eq!(e.name, "maxlen");
                assert_eq!(e.reason, ArgumentErrorReason::NotFound);
            },
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let cases = [
            vec![("maxlen", "0")],
            vec![("maxlen", "-1")],
            vec![("maxlen", "5"), ("num_words", "0")],
            vec![("maxlen", "5"), ("padding", "middle")],
            vec![("maxlen", "5"), ("lowercase", "maybe")],
        ];

        for case in cases {
            let err = TextSequenceEncoder::try_from(args(&case)).unwrap_err();
            assert!(
                matches!(err, CreateError::Argument(_)),
                "{case:?} gave {err:?}"
            );
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn maxlen_must_fit_in_the_output_shape() {
        let too_long = (u32::MAX as usize + 1).to_string();

        let err =
            TextSequenceEncoder::try_from(args(&[("maxlen", too_long.as_str())]))
                .unwrap_err();

        match err {
            CreateError::Argument(e) => {
                assert_eq!(e.name, "maxlen");
                assert!(matches!(e.reason, ArgumentErrorReason::InvalidValue(_)));
            },
            other => panic!("Unexpected error: {other:?}"),
        }

        let largest = PaddingConfig::new(u32::MAX as usize);
        let encoder =
            TextSequenceEncoder::new(VocabularyConfig::default(), largest)
                .unwrap();
        assert_eq!(
            encoder.tensor_constraints().outputs[0].dimensions,
            Dimensions::from([0, u32::MAX])
        );
    }

    #[test]
    fn empty_corpus_is_an_invalid_input() {
        let proc_block =
            TextSequenceEncoder::try_from(args(&[("maxlen", "4")])).unwrap();

        let err = proc_block.run(inputs(&["", "..."], &["hello"])).unwrap_err();

        match err {
            RunError::InvalidInput(InvalidInput { name, reason }) => {
                assert_eq!(name, "corpus");
                assert!(matches!(reason, InvalidInputReason::InvalidValue(_)));
            },
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_text_input() {
        let proc_block =
            TextSequenceEncoder::try_from(args(&[("maxlen", "4")])).unwrap();
        let corpus = vec![Tensor::from_strings_1d("corpus", &CORPUS)];

        let err = proc_block.run(corpus).unwrap_err();

        match err {
            RunError::InvalidInput(InvalidInput { name, reason }) => {
                assert_eq!(name, "text");
                assert_eq!(reason, InvalidInputReason::NotFound);
            },
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn numeric_text_is_rejected() {
        let proc_block =
            TextSequenceEncoder::try_from(args(&[("maxlen", "4")])).unwrap();
        let inputs = vec![
            Tensor::from_strings_1d("corpus", &CORPUS),
            Tensor::new_1d("text", &[1_i32, 2, 3]),
        ];

        let err = proc_block.run(inputs).unwrap_err();

        match err {
            RunError::InvalidInput(InvalidInput { name, reason }) => {
                assert_eq!(name, "text");
                assert_eq!(reason, InvalidInputReason::IncompatibleElementType);
            },
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn output_constraints_use_maxlen() {
        let proc_block =
            TextSequenceEncoder::try_from(args(&[("maxlen", "12")])).unwrap();

        let constraints = proc_block.tensor_constraints();

        assert_eq!(constraints.outputs[0].name, "sequences");
        assert_eq!(
            constraints.outputs[0].dimensions,
            Dimensions::from([0, 12])
        );
    }

    #[test]
    fn metadata_documents_every_argument() {
        let meta = metadata();

        for name in [
            "num_words",
            "oov_token",
            "maxlen",
            "padding",
            "truncating",
            "lowercase",
            "filters",
        ] {
            assert!(meta.argument(name).is_some(), "{name}");
        }
        assert_eq!(
            meta.argument("padding").unwrap().default_value.as_deref(),
            Some("post")
        );
    }
}
