use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED};
use tantivy::tokenizer::{TextAnalyzer, WhitespaceTokenizer};
use tantivy::Index;

pub const GLOBAL_INDEX_FIELD: &str = "global_index";
pub const TEXT_FIELD: &str = "text";
pub const RAW_WHITESPACE_TOKENIZER: &str = "raw_whitespace";

/// One document per chunk: its position in the corpus plus the indexed text.
/// The text is not stored; the corpus itself is the source of truth.
pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _global_index_field = schema_builder.add_u64_field(GLOBAL_INDEX_FIELD, STORED);
	let text_field_indexing = TextFieldIndexing::default()
		.set_tokenizer(RAW_WHITESPACE_TOKENIZER)
		.set_index_option(IndexRecordOption::WithFreqs);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	let _text_field = schema_builder.add_text_field(TEXT_FIELD, text_options);
	schema_builder.build()
}

/// Whitespace splitting only: no lowercasing, stemming or stop words, so
/// tokens match `str::split_whitespace` output on normalised text.
pub fn register_tokenizer(index: &Index) {
	let tokenizer = TextAnalyzer::builder(WhitespaceTokenizer::default()).build();
	index.tokenizers().register(RAW_WHITESPACE_TOKENIZER, tokenizer);
}
