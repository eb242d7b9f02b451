//! Shared fixtures: deterministic providers and a PDF builder
#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use parking_lot::Mutex;
use rag_assistant::providers::{EmbeddingProvider, LlmProvider, LlmRequest, LlmResponse};
use rag_assistant::{Error, Result};

pub const HASH_DIMS: usize = 256;

/// Bag-of-words embedder: each lowercase token bumps one hashed dimension
pub struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; HASH_DIMS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            v[(hasher.finish() % HASH_DIMS as u64) as usize] += 1.0;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        HASH_DIMS
    }

    fn model(&self) -> &str {
        "hash-bow"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Records every request and replies with a fixed prefix plus the question
#[derive(Default)]
pub struct ScriptedLlm {
    pub requests: Mutex<Vec<LlmRequest>>,
}

pub const SCRIPTED_PREFIX: &str = "Scripted answer to: ";

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().push(request.clone());
        Ok(LlmResponse {
            text: format!("{}{}", SCRIPTED_PREFIX, request.user),
            model: "scripted".into(),
            usage: None,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Always fails, like a chat provider without credentials
pub struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse> {
        Err(Error::llm("GROQ_API_KEY is not set"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "failing"
    }
}

/// Page text made of numbered, never-repeating words
pub fn page_text(prefix: &str, words: usize) -> String {
    (0..words)
        .map(|i| format!("{}{}", prefix, i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Minimal PDF with one text run per page
pub fn build_pdf(pages: &[String]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![40.into(), 800.into()]),
                Operation::new("Tj", vec![Object::string_literal(text.as_str())]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("serialize pdf");
    buf
}

/// A three-page document whose words all start with `prefix`
pub fn sample_pdf(prefix: &str) -> Vec<u8> {
    build_pdf(&[
        page_text(&format!("{}a", prefix), 300),
        page_text(&format!("{}b", prefix), 120),
        page_text(&format!("{}c", prefix), 40),
    ])
}
