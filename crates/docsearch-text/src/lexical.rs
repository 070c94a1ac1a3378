use anyhow::{anyhow, Result};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use docsearch_core::types::{ChunkIndex, SearchHit, SourceKind};

use crate::tantivy_utils::{build_schema, register_tokenizer, tokenize, CHUNK_INDEX_FIELD, TEXT_FIELD};

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// BM25 index over the chunk corpus, held in RAM.
///
/// Cheap to build, so it is never persisted: callers rebuild it from chunk
/// text. Document `i` of the build input is chunk index `i`.
pub struct LexicalIndex {
    reader: IndexReader,
    text_field: Field,
    chunk_index_field: Field,
    len: usize,
}

impl LexicalIndex {
    /// Builds from raw chunk texts, tokenized with [`tokenize`].
    pub fn build<S: AsRef<str>>(texts: &[S]) -> Result<Self> {
        let corpus: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t.as_ref())).collect();
        Self::build_tokenized(&corpus)
    }

    pub fn build_tokenized(corpus: &[Vec<String>]) -> Result<Self> {
        let schema = build_schema();
        let index = Index::create_in_ram(schema.clone());
        register_tokenizer(&index);
        let text_field = schema.get_field(TEXT_FIELD)?;
        let chunk_index_field = schema.get_field(CHUNK_INDEX_FIELD)?;

        // One indexing thread keeps a single segment and a reproducible layout.
        let mut index_writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        for (i, tokens) in corpus.iter().enumerate() {
            index_writer.add_document(doc!(
                text_field => tokens.join(" "),
                chunk_index_field => i as u64,
            ))?;
        }
        index_writer.commit()?;

        let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
        tracing::debug!(documents = corpus.len(), "lexical index built");
        Ok(Self { reader, text_field, chunk_index_field, len: corpus.len() })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One BM25 score per corpus document, in build order. Documents sharing
    /// no token with the query score 0.
    pub fn score_all(&self, query_tokens: &[String]) -> Result<Vec<f32>> {
        let mut scores = vec![0f32; self.len];
        if self.len == 0 || query_tokens.is_empty() {
            return Ok(scores);
        }
        let clauses: Vec<(Occur, Box<dyn Query>)> = query_tokens
            .iter()
            .map(|token| {
                let term = Term::from_field_text(self.text_field, token);
                let q: Box<dyn Query> = Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                (Occur::Should, q)
            })
            .collect();
        let query = BooleanQuery::new(clauses);
        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(self.len))?;
        for (score, addr) in top_docs {
            let doc: TantivyDocument = searcher.doc(addr)?;
            let idx = doc
                .get_first(self.chunk_index_field)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| anyhow!("lexical document without chunk index"))?;
            let slot = scores
                .get_mut(idx as usize)
                .ok_or_else(|| anyhow!("chunk index {idx} out of range"))?;
            *slot = score;
        }
        Ok(scores)
    }

    /// The `k` highest-scoring documents, descending; ties go to the lower
    /// chunk index. Zero-score documents are included when fewer than `k`
    /// documents match.
    pub fn top_k(&self, query_tokens: &[String], k: usize) -> Result<Vec<SearchHit>> {
        let scores = self.score_all(query_tokens)?;
        Ok(rank_scores(&scores, k))
    }
}

pub(crate) fn rank_scores(scores: &[f32], k: usize) -> Vec<SearchHit> {
    let mut order: Vec<ChunkIndex> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order
        .into_iter()
        .take(k)
        .map(|chunk_index| SearchHit { chunk_index, score: scores[chunk_index], source: SourceKind::Text })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::rank_scores;

    #[test]
    fn ranking_is_stable_on_ties() {
        let hits = rank_scores(&[0.5, 2.0, 0.5, 2.0, 0.0], 4);
        let order: Vec<usize> = hits.iter().map(|h| h.chunk_index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn ranking_truncates_to_corpus_size() {
        assert_eq!(rank_scores(&[1.0, 3.0], 8).len(), 2);
        assert!(rank_scores(&[], 8).is_empty());
    }
}
