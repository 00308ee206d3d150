//! Recursive character text splitting.
//!
//! Text is split on the coarsest separator present (paragraphs, then lines,
//! then sentences, then words) and the pieces are greedily merged back into
//! chunks of at most `chunk_size` characters. Only pieces that are still too
//! large fall through to the next separator, ending in a hard character cut.
//! Consecutive chunks carry up to `chunk_overlap` characters of trailing
//! context from the previous chunk.

use crate::corpus::Document;
use crate::error::MemoryError;
use crate::{DocumentChunk, Result};
use std::collections::VecDeque;

/// Separators tried in order. The empty separator means a character cut.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

/// Splits documents into overlapping, size-bounded chunks.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    /// Create a splitter. `chunk_overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(MemoryError::Config("chunk_size must be greater than 0".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(MemoryError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replace the separator list. A trailing character cut is always kept
    /// so no chunk can exceed `chunk_size`.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        if self.separators.last().map_or(true, |s| !s.is_empty()) {
            self.separators.push(String::new());
        }
        self
    }

    /// Maximum chunk size in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap between consecutive chunks in characters.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split a single text into chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        self.split_recursive(text, &separators)
    }

    /// Split documents, keeping source attribution and per-document position.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<DocumentChunk> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.text)
                    .into_iter()
                    .enumerate()
                    .map(|(position, text)| DocumentChunk::new(text, doc.source_id.clone(), position))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let (separator, remaining) = pick_separator(text, separators);

        let mut fitting: Vec<&str> = Vec::new();
        for piece in split_keeping(text, separator) {
            if char_len(piece) <= self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }

            if remaining.is_empty() {
                push_trimmed(&mut chunks, piece);
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }

        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_window(&mut chunks, &window);

                // Keep a tail of at most `chunk_overlap` characters that still
                // leaves room for the incoming piece.
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some((_, popped)) => total -= popped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        push_window(&mut chunks, &window);
        chunks
    }
}

fn pick_separator<'a, 'b>(text: &str, separators: &'a [&'b str]) -> (&'b str, &'a [&'b str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

/// Split so that each piece keeps its trailing separator; concatenating the
/// pieces gives back the input.
fn split_keeping<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split_inclusive(separator).collect()
    }
}

fn push_window(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    push_trimmed(chunks, &joined);
}

fn push_trimmed(chunks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
