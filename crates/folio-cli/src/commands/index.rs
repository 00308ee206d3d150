//! Corpus inspection command.

use anyhow::Context;
use clap::Args;
use folio_core::config::Config;
use folio_memory::{embeddings, CorpusLoader, Document, DocumentChunk, TextSplitter, VectorIndex};
use std::collections::BTreeMap;

/// Index command arguments.
#[derive(Args)]
pub struct IndexArgs {
    /// Embed the corpus and show the best matches for this text
    #[arg(short, long)]
    pub query: Option<String>,

    /// Number of matches to show
    #[arg(short, default_value_t = 4)]
    pub k: usize,
}

/// Per-source chunk statistics.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub documents: usize,
    pub chunks: usize,
    pub characters: usize,
    pub chunks_per_source: BTreeMap<String, usize>,
}

impl CorpusStats {
    /// Tally documents and the chunks split from them.
    pub fn collect(documents: &[Document], chunks: &[DocumentChunk]) -> Self {
        let mut chunks_per_source = BTreeMap::new();
        for doc in documents {
            chunks_per_source.insert(doc.source_id.clone(), 0);
        }
        for chunk in chunks {
            *chunks_per_source.entry(chunk.source_id.clone()).or_insert(0) += 1;
        }

        Self {
            documents: documents.len(),
            chunks: chunks.len(),
            characters: documents.iter().map(|d| d.text.chars().count()).sum(),
            chunks_per_source,
        }
    }
}

/// Run the index command.
pub async fn run(args: IndexArgs, config: Config) -> anyhow::Result<()> {
    let corpus = &config.corpus;
    let documents = CorpusLoader::new(&corpus.dir)
        .with_extensions(&corpus.extensions)
        .load()
        .await;
    let splitter = TextSplitter::new(corpus.chunk_size, corpus.chunk_overlap)?;
    let chunks = splitter.split_documents(&documents);

    let stats = CorpusStats::collect(&documents, &chunks);
    println!("{}", console::style(corpus.dir.display()).bold());
    println!(
        "  {} documents, {} characters, {} chunks (size {}, overlap {})",
        stats.documents, stats.characters, stats.chunks, corpus.chunk_size, corpus.chunk_overlap
    );
    for (source, count) in &stats.chunks_per_source {
        println!("  {:>5}  {}", count, source);
    }

    let Some(query) = args.query else {
        return Ok(());
    };

    let embedder = embeddings::from_config(&config.embeddings);
    let index = VectorIndex::build_batched(chunks, embedder.as_ref(), config.embeddings.batch_size)
        .await
        .context("Failed to embed corpus")?;
    let matches = index
        .query_scored(&query, args.k, embedder.as_ref())
        .await
        .context("Failed to embed query")?;

    println!("\n{} {}", console::style("Query:").bold(), query);
    if matches.is_empty() {
        println!("  No matches.");
    }
    for (rank, (chunk, score)) in matches.iter().enumerate() {
        println!(
            "\n{} {} {}",
            console::style(format!("#{}", rank + 1)).cyan(),
            console::style(format!("{:.3}", score)).green(),
            console::style(format!("{} [{}]", chunk.source_id, chunk.position)).dim()
        );
        println!("{}", chunk.text);
    }

    Ok(())
}
