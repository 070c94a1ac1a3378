use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, STORED};
use tantivy::tokenizer::{LowerCaser, TextAnalyzer, WhitespaceTokenizer};
use tantivy::Index;

pub const TOKENIZER_NAME: &str = "whitespace_lower";
pub const TEXT_FIELD: &str = "text";
pub const CHUNK_INDEX_FIELD: &str = "chunk_index";

/// Lexical tokenization rule shared by indexing and querying: lowercase, split
/// on whitespace, no stemming and no stopword removal.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    let text_field_indexing = TextFieldIndexing::default()
        .set_tokenizer(TOKENIZER_NAME)
        .set_index_option(IndexRecordOption::WithFreqs);
    let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
    schema_builder.add_text_field(TEXT_FIELD, text_options);
    schema_builder.add_u64_field(CHUNK_INDEX_FIELD, STORED | FAST);
    schema_builder.build()
}

/// Documents are fed pre-tokenized (tokens joined by single spaces), so this
/// analyzer only has to split them back apart; lowercasing is idempotent.
pub fn register_tokenizer(index: &Index) {
    let tokenizer = TextAnalyzer::builder(WhitespaceTokenizer::default())
        .filter(LowerCaser)
        .build();
    index.tokenizers().register(TOKENIZER_NAME, tokenizer);
}
