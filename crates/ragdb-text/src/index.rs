use std::time::Instant;

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, TantivyDocument, TantivyError, Term};
use tracing::{debug, info};

use ragdb_core::error::{Error, Result};

use crate::tantivy_utils::{build_schema, register_tokenizer, GLOBAL_INDEX_FIELD, TEXT_FIELD};

const WRITER_MEMORY_BYTES: usize = 50_000_000;

fn lexical_err(e: TantivyError) -> Error {
	Error::Lexical(e.to_string())
}

/// BM25 (k1 = 1.2, b = 0.75) over an ordered corpus of chunk texts.
///
/// Scores are position-aligned with the corpus the index was built from.
/// Term statistics are global, so the index is only ever built from the full
/// corpus: `rebuild` costs O(corpus size). An incremental term-statistics
/// update would replace `rebuild` without changing `score_all`.
pub struct LexicalIndex {
	reader: IndexReader,
	global_index_field: Field,
	text_field: Field,
	num_docs: usize,
}

impl LexicalIndex {
	pub fn build(corpus: &[String]) -> Result<Self> {
		let started = Instant::now();
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let global_index_field = schema.get_field(GLOBAL_INDEX_FIELD).map_err(lexical_err)?;
		let text_field = schema.get_field(TEXT_FIELD).map_err(lexical_err)?;

		if !corpus.is_empty() {
			// Single indexing thread keeps the whole corpus in one segment.
			let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES).map_err(lexical_err)?;
			for (position, text) in corpus.iter().enumerate() {
				let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
				writer
					.add_document(doc!(
						global_index_field => position as u64,
						text_field => normalized
					))
					.map_err(lexical_err)?;
			}
			writer.commit().map_err(lexical_err)?;
		}

		let reader = index.reader().map_err(lexical_err)?;
		info!(chunks = corpus.len(), elapsed_ms = started.elapsed().as_millis() as u64, "lexical index rebuilt");
		Ok(Self { reader, global_index_field, text_field, num_docs: corpus.len() })
	}

	/// Replace the statistics with ones computed over `corpus`.
	pub fn rebuild(&mut self, corpus: &[String]) -> Result<()> {
		*self = Self::build(corpus)?;
		Ok(())
	}

	pub fn len(&self) -> usize { self.num_docs }

	pub fn is_empty(&self) -> bool { self.num_docs == 0 }

	/// BM25 score of `query` against every chunk, in corpus order.
	///
	/// Query tokens are whitespace-separated and matched verbatim (case
	/// sensitive). Chunks sharing no token with the query score 0, and a query
	/// with no tokens yields all zeros.
	pub fn score_all(&self, query: &str) -> Result<Vec<f32>> {
		let mut scores = vec![0.0f32; self.num_docs];
		let tokens: Vec<&str> = query.split_whitespace().collect();
		if self.num_docs == 0 || tokens.is_empty() {
			return Ok(scores);
		}

		let clauses: Vec<(Occur, Box<dyn Query>)> = tokens
			.iter()
			.map(|token| {
				let term = Term::from_field_text(self.text_field, token);
				let query: Box<dyn Query> = Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
				(Occur::Should, query)
			})
			.collect();
		let query = BooleanQuery::new(clauses);

		let searcher = self.reader.searcher();
		let top_docs = searcher.search(&query, &TopDocs::with_limit(self.num_docs)).map_err(lexical_err)?;
		debug!(tokens = tokens.len(), matched = top_docs.len(), "lexical scoring");
		for (score, address) in top_docs {
			let doc: TantivyDocument = searcher.doc(address).map_err(lexical_err)?;
			let position = doc.get_first(self.global_index_field).and_then(|v| v.as_u64());
			if let Some(slot) = position.and_then(|p| scores.get_mut(p as usize)) {
				*slot = score;
			}
		}
		Ok(scores)
	}

	/// Number of documents currently visible to searchers.
	pub fn indexed_docs(&self) -> u64 {
		self.reader.searcher().num_docs()
	}
}
