//! JSON Lines 形式の骨格フレーム入力。
//!
//! 1行に1レコード。`{"joints": {...}}` はフレーム、`{"control": "l"}` は操作入力
//! （stdin をフレーム入力に使うときの操作経路）。空行と `#` で始まる行は読み飛ばす。

use anyhow::Context;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::control::ControlInput;
use crate::skeleton::SkeletonFrame;

/// 入力1行分
#[derive(Debug, Clone, PartialEq)]
pub enum FeedRecord {
    Frame(SkeletonFrame),
    Control(ControlInput),
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to read frame input: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid frame at line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Unknown control {input} at line {line}")]
    UnknownControl { line: usize, input: String },
}

impl FeedError {
    /// 入力自体が読めなくなった場合だけ致命的。壊れた1行は読み飛ばせる
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeedError::Io(_))
    }
}

pub struct FrameReader<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl FrameReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open frame file {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl FrameReader<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

fn parse_record(line: &str, line_no: usize) -> Result<FeedRecord, FeedError> {
    let parse_err = |source| FeedError::Parse { line: line_no, source };
    let value: serde_json::Value = serde_json::from_str(line).map_err(parse_err)?;

    if let Some(control) = value.get("control") {
        return control
            .as_str()
            .and_then(ControlInput::parse)
            .map(FeedRecord::Control)
            .ok_or_else(|| FeedError::UnknownControl {
                line: line_no,
                input: control.to_string(),
            });
    }
    serde_json::from_value(value).map(FeedRecord::Frame).map_err(parse_err)
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<FeedRecord, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Some(parse_record(line, self.line_no));
        }
    }
}
