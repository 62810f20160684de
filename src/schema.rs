use tantivy::schema::{
    Field, IndexRecordOption, Schema, SchemaBuilder, TextFieldIndexing, TextOptions, FAST,
    INDEXED, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, TextAnalyzer, WhitespaceTokenizer};
use tantivy::Index;

/// Name of the content analyzer: whitespace split + lowercase, so
/// relevance queries match the whitespace-tokenized content exactly.
pub const CODE_TOKENIZER: &str = "code";

/// Registers the "code" tokenizer on an index. Must run after every
/// create/open, before any write or query against a content field.
pub fn register_code_tokenizer(index: &Index) {
    let tokenizer = TextAnalyzer::builder(WhitespaceTokenizer::default())
        .filter(LowerCaser)
        .build();
    index.tokenizers().register(CODE_TOKENIZER, tokenizer);
}

fn content_options(tokenizer: &str, stored: bool) -> TextOptions {
    let options = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(tokenizer)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );
    if stored {
        options.set_stored()
    } else {
        options
    }
}

/// Adds the document core shared by the live and time schemas.
///
/// `location`: the primary key, used for delete-then-add overwrites
/// and deletion pruning.
fn add_document_core(builder: &mut SchemaBuilder, content: TextOptions) {
    builder.add_text_field("location", STRING | STORED);
    builder.add_text_field("repo", STRING | STORED);
    builder.add_text_field("file_name", STRING | STORED);
    builder.add_text_field("display_path", STORED);
    builder.add_text_field("content", content);
    builder.add_text_field("hash", STRING | STORED);
    builder.add_text_field("lang", STRING | STORED);
    builder.add_text_field("owner", STRING | STORED);
    builder.add_u64_field("lines", STORED);
    builder.add_text_field("url", STORED);
    builder.add_text_field("source", STRING | STORED);
}

/// Schema of the live-file index. Content uses the engine's default
/// analyzer (alphanumeric split + lowercase) and is not stored.
pub fn build_live_schema() -> Schema {
    let mut builder = Schema::builder();
    add_document_core(&mut builder, content_options("default", false));
    builder.build()
}

/// Schema of the time-scoped index: the document core plus the
/// revision id and the year-month-day partition as a u64 fast field
/// for date-bounded queries. Content is whitespace-tokenized (the
/// "code" analyzer) and stored, so excerpts come from the index rather
/// than the (long gone) file.
pub fn build_time_schema() -> Schema {
    let mut builder = Schema::builder();
    add_document_core(&mut builder, content_options(CODE_TOKENIZER, true));
    builder.add_text_field("revision", STRING | STORED);
    builder.add_u64_field("date", INDEXED | STORED | FAST);
    builder.build()
}

/// Handles for the shared document fields.
#[derive(Debug, Clone, Copy)]
pub struct DocFields {
    pub location: Field,
    pub repo: Field,
    pub file_name: Field,
    pub display_path: Field,
    pub content: Field,
    pub hash: Field,
    pub lang: Field,
    pub owner: Field,
    pub lines: Field,
    pub url: Field,
    pub source: Field,
}

impl DocFields {
    pub fn bind(schema: &Schema) -> Self {
        let field = |name: &str| {
            schema
                .get_field(name)
                .unwrap_or_else(|_| panic!("schema missing '{}' field", name))
        };
        Self {
            location: field("location"),
            repo: field("repo"),
            file_name: field("file_name"),
            display_path: field("display_path"),
            content: field("content"),
            hash: field("hash"),
            lang: field("lang"),
            owner: field("owner"),
            lines: field("lines"),
            url: field("url"),
            source: field("source"),
        }
    }
}

/// Handles for the time-scoped schema.
#[derive(Debug, Clone, Copy)]
pub struct TimeFields {
    pub doc: DocFields,
    pub revision: Field,
    pub date: Field,
}

impl TimeFields {
    pub fn bind(schema: &Schema) -> Self {
        let field = |name: &str| {
            schema
                .get_field(name)
                .unwrap_or_else(|_| panic!("schema missing '{}' field", name))
        };
        Self {
            doc: DocFields::bind(schema),
            revision: field("revision"),
            date: field("date"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_schema_binds() {
        let schema = build_live_schema();
        let fields: Vec<_> = schema.fields().collect();
        assert_eq!(fields.len(), 11);
        let _ = DocFields::bind(&schema);
    }

    #[test]
    fn time_schema_binds() {
        let schema = build_time_schema();
        let fields: Vec<_> = schema.fields().collect();
        assert_eq!(fields.len(), 13);
        let bound = TimeFields::bind(&schema);
        assert_ne!(bound.revision, bound.date);
    }

    #[test]
    fn schemas_differ_on_content_storage() {
        // The live schema never stores content; the time schema must,
        // for excerpt extraction.
        assert_ne!(build_live_schema(), build_time_schema());
    }
}
