//! Frequency-ranked vocabularies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{errors::EncoderError, tokenizer::Tokenizer};

/// The integer used to represent a single token.
pub type TokenId = i32;

/// The id used for padding. It is never assigned to a real token.
pub const PADDING_ID: TokenId = 0;

/// The id reserved for the out-of-vocabulary marker, when one is configured.
pub const OOV_ID: TokenId = 1;

/// Settings used when building a [`Vocabulary`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Only the `num_words - 1` most frequent tokens get an id.
    pub num_words: Option<usize>,
    /// A marker which reserves [`OOV_ID`] for every token that doesn't have
    /// an id of its own. Without one, those tokens are dropped while
    /// encoding.
    pub oov_token: Option<String>,
    pub tokenizer: Tokenizer,
}

impl VocabularyConfig {
    pub fn validate(&self) -> Result<(), EncoderError> {
        if self.num_words == Some(0) {
            return Err(EncoderError::invalid_config(
                "num_words",
                "must be at least 1",
            ));
        }

        if let Some(oov) = &self.oov_token {
            if oov.is_empty() {
                return Err(EncoderError::invalid_config(
                    "oov_token",
                    "the out-of-vocabulary marker can't be empty",
                ));
            }
        }

        Ok(())
    }
}

/// What [`Vocabulary::encode()`] does with a token that has no id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnknownTokens {
    /// Replace the token with [`OOV_ID`].
    MapToOov,
    /// Leave the token out of the encoded sequence.
    Drop,
}

/// How often a token occurred in the corpus a [`Vocabulary`] was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStats {
    pub token: String,
    /// The total number of occurrences.
    pub count: usize,
    /// The number of documents containing the token at least once.
    pub documents: usize,
}

/// An immutable mapping between tokens and integer ids.
///
/// Ids are handed out by descending frequency, with ties going to the token
/// that was seen first. Id `0` is reserved for padding, and id `1` is
/// reserved for the out-of-vocabulary marker if one was configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VocabularyRecord", into = "VocabularyRecord")]
pub struct Vocabulary {
    config: VocabularyConfig,
    /// Every distinct token in the corpus, most frequent first.
    ranked: Vec<TokenStats>,
    /// The number of entries in `ranked` which were given an id.
    retained: usize,
    /// The index of each token in `ranked`.
    ranks: HashMap<String, usize>,
    document_count: usize,
}

impl Vocabulary {
    /// Build a vocabulary from a corpus of documents.
    ///
    /// A corpus without any tokens produces an empty vocabulary rather than
    /// an error. Use [`Vocabulary::ensure_not_empty()`] if that should be
    /// fatal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use text_sequence_encoder::{Vocabulary, VocabularyConfig};
    /// let corpus = ["The fire spread", "Fire fighters on scene"];
    ///
    /// let vocab = Vocabulary::build(&corpus, VocabularyConfig::default())?;
    ///
    /// assert_eq!(vocab.token_to_id("fire"), Some(1));
    /// assert_eq!(vocab.token_to_id("the"), Some(2));
    /// // "is" and "out" weren't in the corpus
    /// assert_eq!(vocab.encode("Is the fire out?"), vec![2, 1]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn build<I>(
        corpus: I,
        config: VocabularyConfig,
    ) -> Result<Self, EncoderError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        config.validate()?;

        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut ranked: Vec<TokenStats> = Vec::new();
        let mut last_seen_in: Vec<usize> = Vec::new();
        let mut document_count = 0;

        for document in corpus {
            document_count += 1;

            for token in config.tokenizer.tokenize(document.as_ref()) {
                if config.oov_token.as_deref() == Some(token.as_str()) {
                    continue;
                }

                match positions.get(&token) {
                    Some(&ix) => {
                        let stats = &mut ranked[ix];
                        stats.count += 1;

                        if last_seen_in[ix] != document_count {
                            stats.documents += 1;
                            last_seen_in[ix] = document_count;
                        }
                    },
                    None => {
                        positions.insert(token.clone(), ranked.len());
                        last_seen_in.push(document_count);
                        ranked.push(TokenStats {
                            token,
                            count: 1,
                            documents: 1,
                        });
                    },
                }
            }
        }

        // A stable sort keeps first-seen order for tokens with equal counts
        ranked.sort_by(|a, b| b.count.cmp(&a.count));

        let vocab =
            Vocabulary::from_ranked_tokens(config, ranked, document_count)?;

        if vocab.ranked.is_empty() {
            tracing::warn!(
                documents = document_count,
                "Built a vocabulary from a corpus without any tokens"
            );
        } else {
            tracing::debug!(
                documents = vocab.document_count,
                distinct_tokens = vocab.ranked.len(),
                retained = vocab.retained,
                vocabulary_size = vocab.vocabulary_size(),
                "Built a vocabulary"
            );
        }

        Ok(vocab)
    }

    fn from_ranked_tokens(
        config: VocabularyConfig,
        ranked: Vec<TokenStats>,
        document_count: usize,
    ) -> Result<Self, EncoderError> {
        let first_id = first_id(&config);
        let retained = match config.num_words {
            Some(num_words) => ranked.len().min(num_words - 1),
            None => ranked.len(),
        };

        if TokenId::try_from(first_id as usize + retained).is_err() {
            return Err(EncoderError::TooManyTokens);
        }

        let mut ranks = HashMap::with_capacity(ranked.len());
        for (rank, stats) in ranked.iter().enumerate() {
            if ranks.insert(stats.token.clone(), rank).is_some() {
                return Err(EncoderError::InvalidVocabulary(format!(
                    "\"{}\" appears more than once",
                    stats.token
                )));
            }
        }

        Ok(Vocabulary {
            config,
            ranked,
            retained,
            ranks,
            document_count,
        })
    }

    /// The number of real tokens which were given an id.
    pub fn len(&self) -> usize { self.retained }

    pub fn is_empty(&self) -> bool { self.retained == 0 }

    /// One more than the largest id this vocabulary can produce.
    ///
    /// This is the input dimension for an embedding layer consuming the
    /// encoded sequences.
    pub fn vocabulary_size(&self) -> usize {
        first_id(&self.config) as usize + self.retained
    }

    /// Fail with [`EncoderError::EmptyCorpus`] if the corpus this vocabulary
    /// was built from didn't contain any tokens.
    pub fn ensure_not_empty(&self) -> Result<(), EncoderError> {
        if self.ranked.is_empty() {
            Err(EncoderError::EmptyCorpus)
        } else {
            Ok(())
        }
    }

    pub fn config(&self) -> &VocabularyConfig { &self.config }

    pub fn tokenizer(&self) -> &Tokenizer { &self.config.tokenizer }

    pub fn oov_token(&self) -> Option<&str> { self.config.oov_token.as_deref() }

    pub fn unknown_tokens(&self) -> UnknownTokens {
        if self.config.oov_token.is_some() {
            UnknownTokens::MapToOov
        } else {
            UnknownTokens::Drop
        }
    }

    /// The number of documents in the corpus.
    pub fn document_count(&self) -> usize { self.document_count }

    /// Look up the id for a token, without applying any out-of-vocabulary
    /// handling.
    pub fn token_to_id(&self, token: &str) -> Option<TokenId> {
        if self.oov_token() == Some(token) {
            return Some(OOV_ID);
        }

        self.retained_id(token)
    }

    fn retained_id(&self, token: &str) -> Option<TokenId> {
        let rank = *self.ranks.get(token)?;

        if rank < self.retained {
            Some(first_id(&self.config) + rank as TokenId)
        } else {
            None
        }
    }

    pub fn id_to_token(&self, id: TokenId) -> Option<&str> {
        if id == OOV_ID {
            if let Some(oov) = self.oov_token() {
                return Some(oov);
            }
        }

        let offset = id.checked_sub(first_id(&self.config))?;
        let rank = usize::try_from(offset).ok()?;
        if rank >= self.retained {
            return None;
        }

        Some(self.ranked[rank].token.as_str())
    }

    /// Corpus statistics for a token, whether or not it was given an id.
    pub fn stats(&self, token: &str) -> Option<&TokenStats> {
        self.ranks.get(token).map(|&rank| &self.ranked[rank])
    }

    /// Every token seen in the corpus, most frequent first, alongside the id
    /// it was given.
    pub fn ranked(
        &self,
    ) -> impl Iterator<Item = (Option<TokenId>, &TokenStats)> + '_ {
        let first_id = first_id(&self.config);

        self.ranked.iter().enumerate().map(move |(rank, stats)| {
            let id = if rank < self.retained {
                Some(first_id + rank as TokenId)
            } else {
                None
            };
            (id, stats)
        })
    }

    /// Convert text into a sequence of token ids.
    ///
    /// Tokens without an id are handled according to
    /// [`Vocabulary::unknown_tokens()`].
    pub fn encode(&self, text: &str) -> Vec<TokenId> {
        let unknown = self.unknown_tokens();
        let mut ids = Vec::new();
        let mut dropped = 0;

        for token in self.tokenizer().tokenize(text) {
            match (self.retained_id(&token), unknown) {
                (Some(id), _) => ids.push(id),
                (None, UnknownTokens::MapToOov) => ids.push(OOV_ID),
                (None, UnknownTokens::Drop) => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::trace!(dropped, "Dropped out-of-vocabulary tokens");
        }

        ids
    }

    pub fn encode_batch<I>(&self, texts: I) -> Vec<Vec<TokenId>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        texts
            .into_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect()
    }

    /// Convert a sequence of ids back into tokens.
    ///
    /// Padding is skipped. Ids which don't belong to this vocabulary are
    /// rendered as the out-of-vocabulary marker, or skipped if there isn't
    /// one.
    pub fn decode(&self, ids: &[TokenId]) -> Vec<&str> {
        ids.iter()
            .filter(|&&id| id != PADDING_ID)
            .filter_map(|&id| self.id_to_token(id).or_else(|| self.oov_token()))
            .collect()
    }

    /// Decode a sequence and join its tokens with spaces.
    pub fn decode_to_string(&self, ids: &[TokenId]) -> String {
        self.decode(ids).join(" ")
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a vocabulary previously saved with [`Vocabulary::to_json()`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn first_id(config: &VocabularyConfig) -> TokenId {
    match config.oov_token {
        Some(_) => OOV_ID + 1,
        None => PADDING_ID + 1,
    }
}

/// The serialized form of a [`Vocabulary`].
#[derive(Serialize, Deserialize)]
struct VocabularyRecord {
    #[serde(default)]
    tokenizer: Tokenizer,
    num_words: Option<usize>,
    oov_token: Option<String>,
    document_count: usize,
    tokens: Vec<TokenRecord>,
}

#[derive(Serialize, Deserialize)]
struct TokenRecord {
    token: String,
    id: Option<TokenId>,
    count: usize,
    documents: usize,
}

impl From<Vocabulary> for VocabularyRecord {
    fn from(vocab: Vocabulary) -> Self {
        let tokens = vocab
            .ranked()
            .map(|(id, stats)| TokenRecord {
                token: stats.token.clone(),
                id,
                count: stats.count,
                documents: stats.documents,
            })
            .collect();

        let VocabularyConfig {
            num_words,
            oov_token,
            tokenizer,
        } = vocab.config;

        VocabularyRecord {
            tokenizer,
            num_words,
            oov_token,
            document_count: vocab.document_count,
            tokens,
        }
    }
}

impl TryFrom<VocabularyRecord> for Vocabulary {
    type Error = EncoderError;

    fn try_from(record: VocabularyRecord) -> Result<Self, Self::Error> {
        let VocabularyRecord {
            tokenizer,
            num_words,
            oov_token,
            document_count,
            tokens,
        } = record;

        let config = VocabularyConfig {
            num_words,
            oov_token,
            tokenizer,
        };
        config.validate()?;

        let mut ids = Vec::with_capacity(tokens.len());
        let mut ranked: Vec<TokenStats> = Vec::with_capacity(tokens.len());

        for TokenRecord {
            token,
            id,
            count,
            documents,
        } in tokens
        {
            check_token(
                &config,
                ranked.last(),
                &token,
                count,
                documents,
                document_count,
            )?;

            ids.push(id);
            ranked.push(TokenStats {
                token,
                count,
                documents,
            });
        }

        let vocab =
            Vocabulary::from_ranked_tokens(config, ranked, document_count)?;

        for ((expected, stats), found) in vocab.ranked().zip(ids) {
            if expected != found {
                return Err(EncoderError::InvalidVocabulary(format!(
                    "\"{}\" should have id {:?} but was saved with {:?}",
                    stats.token, expected, found
                )));
            }
        }

        Ok(vocab)
    }
}

fn check_token(
    config: &VocabularyConfig,
    previous: Option<&TokenStats>,
    token: &str,
    count: usize,
    documents: usize,
    document_count: usize,
) -> Result<(), EncoderError> {
    let invalid = |reason: String| Err(EncoderError::InvalidVocabulary(reason));

    if token.is_empty() {
        return invalid("tokens can't be empty".to_string());
    }
    if config.oov_token.as_deref() == Some(token) {
        return invalid(format!(
            "\"{token}\" is the out-of-vocabulary marker and can't have its own id"
        ));
    }
    if documents == 0 || documents > count || documents > document_count {
        return invalid(format!(
            "\"{token}\" occurs {count} times in {documents} of {document_count} documents"
        ));
    }
    if let Some(last) = previous {
        if last.count < count {
            return invalid(format!(
                "\"{token}\" is more frequent than \"{}\" but ranked after it",
                last.token
            ));
        }
    }

    Ok(())
}
