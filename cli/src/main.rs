use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use serde::Serialize;
use structopt::StructOpt;
use text_sequence_encoder::{
    pad_sequences, PaddingConfig, Side, TokenId, Tokenizer, Vocabulary,
    VocabularyConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cmd = Command::from_args();

    tracing::debug!(?cmd, "Starting");

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    match cmd {
        Command::Fit(fit) => fit.execute(),
        Command::Encode(encode) => encode.execute(&mut stdout),
        Command::Inspect(inspect) => inspect.execute(&mut stdout),
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "text-sequence")]
pub enum Command {
    /// Build a vocabulary from a corpus with one document per line.
    Fit(Fit),
    /// Encode text as padded sequences of token ids.
    Encode(Encode),
    /// Show the most frequent tokens in a vocabulary.
    Inspect(Inspect),
}

#[derive(Debug, StructOpt)]
pub struct Fit {
    /// A text file containing one document per line.
    #[structopt(long, parse(from_os_str))]
    corpus: PathBuf,
    /// Only give ids to the (num_words - 1) most frequent words.
    #[structopt(long)]
    num_words: Option<usize>,
    /// A marker used in place of unknown words.
    #[structopt(long)]
    oov_token: Option<String>,
    /// Keep the original case when tokenizing.
    #[structopt(long)]
    no_lowercase: bool,
    /// Remove accents from characters when tokenizing.
    #[structopt(long)]
    strip_accents: bool,
    /// Where to write the vocabulary.
    #[structopt(short, long, parse(from_os_str))]
    output: PathBuf,
}

impl Fit {
    fn execute(self) -> Result<(), Error> {
        let corpus = read_to_string(&self.corpus)?;

        let config = VocabularyConfig {
            num_words: self.num_words,
            oov_token: self.oov_token,
            tokenizer: Tokenizer {
                lowercase: !self.no_lowercase,
                strip_accents: self.strip_accents,
                ..Default::default()
            },
        };

        let vocab = Vocabulary::build(corpus.lines(), config)
            .context("Unable to build the vocabulary")?;
        vocab.ensure_not_empty().with_context(|| {
            format!("Nothing to learn from \"{}\"", self.corpus.display())
        })?;

        tracing::info!(
            documents = vocab.document_count(),
            tokens = vocab.len(),
            vocabulary_size = vocab.vocabulary_size(),
            "Built the vocabulary"
        );

        let json = vocab.to_json()?;
        std::fs::write(&self.output, json).with_context(|| {
            format!("Unable to write to \"{}\"", self.output.display())
        })?;

        Ok(())
    }
}

#[derive(Debug, StructOpt)]
pub struct Encode {
    /// A vocabulary created by the "fit" command.
    #[structopt(long, parse(from_os_str))]
    vocabulary: PathBuf,
    /// A text file containing one string to encode per line.
    #[structopt(long, parse(from_os_str))]
    input: PathBuf,
    /// The length of each sequence. Defaults to the longest one.
    #[structopt(long)]
    maxlen: Option<usize>,
    /// Where padding is added ("pre" or "post").
    #[structopt(long, default_value = "post")]
    padding: Side,
    /// Where long sequences are cut ("pre" or "post").
    #[structopt(long, default_value = "post")]
    truncating: Side,
}

#[derive(Debug, PartialEq, Serialize)]
struct EncodedBatch {
    shape: [usize; 2],
    sequences: Vec<Vec<TokenId>>,
}

impl Encode {
    fn execute(self, out: impl Write) -> Result<(), Error> {
        let vocab = load_vocabulary(&self.vocabulary)?;
        let text = read_to_string(&self.input)?;

        let sequences = vocab.encode_batch(text.lines());
        let config = PaddingConfig {
            maxlen: self.maxlen,
            padding: self.padding,
            truncating: self.truncating,
        };
        let batch = pad_sequences(&sequences, &config)?;

        let (rows, columns) = batch.dim();
        let encoded = EncodedBatch {
            shape: [rows, columns],
            sequences: batch.rows().into_iter().map(|row| row.to_vec()).collect(),
        };

        serde_json::to_writer(out, &encoded)
            .context("Unable to write the encoded sequences")?;

        Ok(())
    }
}

#[derive(Debug, StructOpt)]
pub struct Inspect {
    /// A vocabulary created by the "fit" command.
    #[structopt(long, parse(from_os_str))]
    vocabulary: PathBuf,
    /// How many tokens to show.
    #[structopt(long, default_value = "20")]
    top: usize,
}

impl Inspect {
    fn execute(self, mut out: impl Write) -> Result<(), Error> {
        let vocab = load_vocabulary(&self.vocabulary)?;

        writeln!(
            out,
            "{} documents, {} tokens, vocabulary size {}",
            vocab.document_count(),
            vocab.len(),
            vocab.vocabulary_size()
        )?;

        if let Some(oov) = vocab.oov_token() {
            writeln!(out, "{}\t{}", text_sequence_encoder::OOV_ID, oov)?;
        }

        for (id, stats) in vocab.ranked().take(self.top) {
            let id = match id {
                Some(id) => id.to_string(),
                None => String::from("-"),
            };
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                id, stats.token, stats.count, stats.documents
            )?;
        }

        Ok(())
    }
}

fn read_to_string(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read \"{}\"", path.display()))
}

fn load_vocabulary(path: &Path) -> Result<Vocabulary, Error> {
    let json = read_to_string(path)?;

    Vocabulary::from_json(&json).with_context(|| {
        format!("\"{}\" isn't a valid vocabulary", path.display())
    })
}
