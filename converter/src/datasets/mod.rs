mod msmarco;

use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use common::{error::ConversionError, tokenization::convert_to_unicode};

pub use msmarco::{CandidateRow, RelevanceSet, TrainingTriple};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Split {
    Train,
    Dev,
    Eval,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Dev, Split::Eval];

    pub fn label(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Dev => "dev",
            Split::Eval => "eval",
        }
    }

    pub fn records_file_name(self) -> String {
        format!("dataset_{}.tf", self.label())
    }

    /// The training split has no id mapping file.
    pub fn ids_file_name(self) -> Option<String> {
        match self {
            Split::Train => None,
            Split::Dev | Split::Eval => Some(format!("query_doc_ids_{}.txt", self.label())),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One decoded input line with its 1-based line number. The newline is removed,
/// any other surrounding whitespace is left for the row parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvLine {
    pub number: usize,
    pub text: String,
}

pub struct TsvLines {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    number: usize,
}

impl TsvLines {
    pub fn open(path: &Path) -> Result<Self, ConversionError> {
        let file = File::open(path).map_err(|err| ConversionError::resource(path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            buf: Vec::new(),
            number: 0,
        })
    }

    fn read_line(&mut self) -> Result<Option<TsvLine>, ConversionError> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.number += 1;
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }

        let text = convert_to_unicode(&self.buf).map_err(|source| ConversionError::Decode {
            path: self.path.clone(),
            line: self.number,
            source,
        })?;

        Ok(Some(TsvLine {
            number: self.number,
            text,
        }))
    }
}

impl Iterator for TsvLines {
    type Item = Result<TsvLine, ConversionError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}

/// Counts lines the way a line iterator would, including a final line
/// without a trailing newline.
pub fn count_lines(path: &Path) -> Result<usize, ConversionError> {
    let file = File::open(path).map_err(|err| ConversionError::resource(path, err))?;
    let mut count = 0usize;
    for segment in BufReader::new(file).split(b'\n') {
        segment?;
        count += 1;
    }
    Ok(count)
}

pub fn split_fields<'a, const N: usize>(
    text: &'a str,
    path: &Path,
    line: usize,
) -> Result<[&'a str; N], ConversionError> {
    let fields: Vec<&str> = text.split('\t').collect();
    <[&str; N]>::try_from(fields).map_err(|fields| ConversionError::InputFormat {
        path: path.to_path_buf(),
        line,
        expected: N,
        found: fields.len(),
    })
}
