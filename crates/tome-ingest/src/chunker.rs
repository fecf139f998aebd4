//! LLM-assisted semantic chunking.
//!
//! The segmentation service receives the full document text and answers with
//! character offset ranges, not text: chunk content is always sliced back out
//! of the original text, so the service can only choose boundaries, never
//! alter content. Each attempt is verified for coverage before it is
//! accepted; a bounded number of attempts guards against degenerate answers.

use crate::error::{IngestError, IngestResult};
use serde::Deserialize;
use tome_config::ChunkingConfig;
use tome_core::SourcePages;
use tome_extract::ExtractedPage;
use tome_llm::TextGenerator;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "\
- You are a perfect document splitter.
- When you split the document, you must not alter the original content.
- Chunk boundaries are character offsets into the given text.
- Ensure the response strictly follows the JSON format.";

/// Character offsets (inclusive start, exclusive end) of one page within the
/// concatenated document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    /// 1-based page number.
    pub page: u32,
    pub start: usize,
    pub end: usize,
}

/// The full document text with its per-page offset table.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub text: String,
    pub spans: Vec<PageSpan>,
}

/// Concatenate pages in page order with a single delimiter, recording each
/// page's character offset range.
pub fn assemble_pages(pages: &[ExtractedPage]) -> DocumentText {
    let mut text = String::new();
    let mut spans = Vec::with_capacity(pages.len());
    let mut cursor = 0usize;

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            text.push('\n');
            cursor += 1;
        }
        let len = page.text.chars().count();
        spans.push(PageSpan {
            page: page.page,
            start: cursor,
            end: cursor + len,
        });
        text.push_str(&page.text);
        cursor += len;
    }

    DocumentText { text, spans }
}

/// One chunk produced by a successful segmentation pass.
#[derive(Debug, Clone)]
pub struct SegmentedChunk {
    pub content: String,
    pub source_pages: SourcePages,
    pub reasoning: Option<String>,
}

/// A verified segmentation: one summary plus the ordered content chunks.
#[derive(Debug, Clone)]
pub struct SegmentedDocument {
    pub summary: SegmentedChunk,
    pub chunks: Vec<SegmentedChunk>,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    summary: RawSummary,
    chunks: Vec<RawChunk>,
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RawChunk {
    id: u32,
    content_range: [usize; 2],
    #[serde(default)]
    reasoning: Option<String>,
}

/// Splits a document into semantically coherent chunks via the
/// text-generation service.
pub struct SemanticChunker<'a> {
    generator: &'a dyn TextGenerator,
    config: ChunkingConfig,
}

impl<'a> SemanticChunker<'a> {
    pub fn new(generator: &'a dyn TextGenerator, config: ChunkingConfig) -> Self {
        Self { generator, config }
    }

    /// Segment the assembled document text.
    ///
    /// Fatal for the document when every attempt is rejected: either the
    /// response never parsed as JSON, or its chunk ranges never covered the
    /// source text within the configured tolerance.
    pub fn segment(&self, doc: &DocumentText) -> IngestResult<SegmentedDocument> {
        let chars: Vec<char> = doc.text.chars().collect();
        let total_len = chars.len();
        let prompt = self.build_prompt(&doc.text, total_len);

        let mut last_reason = String::new();
        for attempt in 1..=self.config.max_attempts {
            debug!(
                "Segmentation attempt {}/{}",
                attempt, self.config.max_attempts
            );

            match self.attempt(&prompt, &chars, total_len, doc) {
                Ok(segmented) => return Ok(segmented),
                Err(reason) => {
                    warn!("Segmentation attempt {} rejected: {}", attempt, reason);
                    last_reason = reason;
                }
            }
        }

        Err(IngestError::SegmentationFailed {
            attempts: self.config.max_attempts,
            reason: last_reason,
        })
    }

    fn attempt(
        &self,
        prompt: &str,
        chars: &[char],
        total_len: usize,
        doc: &DocumentText,
    ) -> Result<SegmentedDocument, String> {
        let response = self
            .generator
            .generate(prompt, SYSTEM_PROMPT)
            .map_err(|e| format!("generation failed: {}", e))?;

        let body = strip_code_fence(&response);
        let plan: RawPlan =
            serde_json::from_str(body).map_err(|e| format!("response is not valid JSON: {}", e))?;

        if plan.chunks.is_empty() {
            return Err("response contains no chunks".to_string());
        }

        let mut raw_chunks = plan.chunks;
        raw_chunks.sort_by_key(|chunk| chunk.id);

        // The response carries only offsets; content is sliced back out of
        // the source text.
        let mut chunks = Vec::with_capacity(raw_chunks.len());
        let mut last_end = 0usize;
        for raw in &raw_chunks {
            let start = raw.content_range[0].min(total_len);
            let end = raw.content_range[1].min(total_len);
            if start > end {
                return Err(format!(
                    "chunk {} has inverted range {}..{}",
                    raw.id, raw.content_range[0], raw.content_range[1]
                ));
            }

            let content: String = chars[start..end].iter().collect();
            chunks.push(SegmentedChunk {
                content,
                source_pages: map_pages(&doc.spans, start, end),
                reasoning: raw.reasoning.clone(),
            });
            last_end = end;
        }

        // Coverage verification: the last chunk must reach the end of the
        // source text, within tolerance.
        let gap = total_len.abs_diff(last_end);
        let allowed = (total_len as f64 * self.config.coverage_tolerance).ceil() as usize;
        if gap > allowed {
            return Err(format!(
                "coverage gap of {} chars exceeds allowed {} (total {})",
                gap, allowed, total_len
            ));
        }

        let full_range = SourcePages::from_bounds(
            doc.spans.first().map(|s| s.page).unwrap_or(1),
            doc.spans.last().map(|s| s.page).unwrap_or(1),
        );

        Ok(SegmentedDocument {
            summary: SegmentedChunk {
                content: plan.summary.content,
                source_pages: full_range,
                reasoning: None,
            },
            chunks,
        })
    }

    fn build_prompt(&self, text: &str, total_len: usize) -> String {
        let minimum_chunk_count = (total_len / self.config.target_chunk_chars).max(1);

        format!(
            r#"# Important Note

- The size of each chunk should be between 300 and {target} characters.
- The end value of the last range must equal the length of the total text.
- The minimum number of chunks should be {minimum}.
- Respond with JSON only, following the response template exactly.

# Original Data (Text Length: {total})

- Data: {text}

# Response Template (Example)

{{
    "summary": {{
        "content": "This is a summary of the entire document."
    }},
    "chunks": [
        {{
            "id": 1,
            "content_range": [0, 457],
            "reasoning": "This chunk covers the introduction section."
        }},
        {{
            "id": 2,
            "content_range": [457, 903],
            "reasoning": "This chunk covers the first part of the main content."
        }}
    ]
}}
"#,
            target = self.config.target_chunk_chars,
            minimum = minimum_chunk_count,
            total = total_len,
            text = text,
        )
    }
}

/// Strip Markdown code-fence wrapping from a response, if present.
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Resolve the tightest page interval containing a chunk range: the latest
/// page start at or before the chunk start, and the earliest page end at or
/// after the chunk end.
fn map_pages(spans: &[PageSpan], start: usize, end: usize) -> SourcePages {
    let mut first = spans.first().map(|s| s.page).unwrap_or(1);
    for span in spans {
        if span.start <= start {
            first = span.page;
        } else {
            break;
        }
    }

    let mut last = spans.last().map(|s| s.page).unwrap_or(1);
    for span in spans {
        if span.end >= end {
            last = span.page;
            break;
        }
    }

    SourcePages::from_bounds(first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tome_llm::LlmResult;

    /// Scripted generator that replays canned responses.
    struct ScriptedGenerator {
        responses: Mutex<Vec<String>>,
        calls: Mutex<u32>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<String>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, _prompt: &str, _system: &str) -> LlmResult<String> {
            *self.calls.lock().unwrap() += 1;
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok("{}".to_string())
            } else {
                Ok(responses.remove(0))
            }
        }
    }

    fn pages(texts: &[&str]) -> Vec<ExtractedPage> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| ExtractedPage {
                page: (i + 1) as u32,
                text: text.to_string(),
            })
            .collect()
    }

    fn plan_response(summary: &str, ranges: &[(usize, usize)]) -> String {
        let chunks: Vec<serde_json::Value> = ranges
            .iter()
            .enumerate()
            .map(|(i, (start, end))| {
                serde_json::json!({
                    "id": i + 1,
                    "content_range": [start, end],
                    "reasoning": "section boundary",
                })
            })
            .collect();

        serde_json::json!({
            "summary": { "content": summary },
            "chunks": chunks,
        })
        .to_string()
    }

    #[test]
    fn test_assemble_pages_offsets() {
        let doc = assemble_pages(&pages(&["abcde", "fghij", "klm"]));

        assert_eq!(doc.text, "abcde\nfghij\nklm");
        assert_eq!(
            doc.spans,
            vec![
                PageSpan { page: 1, start: 0, end: 5 },
                PageSpan { page: 2, start: 6, end: 11 },
                PageSpan { page: 3, start: 12, end: 15 },
            ]
        );
    }

    #[test]
    fn test_segment_slices_verbatim_content() {
        let doc = assemble_pages(&pages(&["The first page body.", "The second page body."]));
        let total = doc.text.chars().count();

        let generator = ScriptedGenerator::new(vec![plan_response(
            "Two pages about bodies.",
            &[(0, 20), (20, total)],
        )]);
        let chunker = SemanticChunker::new(&generator, ChunkingConfig::default());

        let segmented = chunker.segment(&doc).unwrap();
        assert_eq!(segmented.chunks.len(), 2);
        assert_eq!(segmented.chunks[0].content, "The first page body.");
        // Every chunk is a verbatim substring of the source text.
        for chunk in &segmented.chunks {
            assert!(doc.text.contains(&chunk.content));
        }
        assert_eq!(segmented.summary.content, "Two pages about bodies.");
        assert_eq!(segmented.summary.source_pages, SourcePages::Range(1, 2));
    }

    #[test]
    fn test_chunk_within_one_page_maps_to_single_page() {
        let doc = assemble_pages(&pages(&["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc"]));
        let total = doc.text.chars().count();

        let generator = ScriptedGenerator::new(vec![plan_response(
            "s",
            &[(0, 10), (11, 21), (22, total)],
        )]);
        let chunker = SemanticChunker::new(&generator, ChunkingConfig::default());

        let segmented = chunker.segment(&doc).unwrap();
        assert_eq!(segmented.chunks[0].source_pages, SourcePages::Single(1));
        assert_eq!(segmented.chunks[1].source_pages, SourcePages::Single(2));
        assert_eq!(segmented.chunks[2].source_pages, SourcePages::Single(3));
    }

    #[test]
    fn test_chunk_spanning_pages_maps_to_range() {
        let doc = assemble_pages(&pages(&["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc"]));
        let total = doc.text.chars().count();

        let generator =
            ScriptedGenerator::new(vec![plan_response("s", &[(5, 15), (15, total)])]);
        let chunker = SemanticChunker::new(&generator, ChunkingConfig::default());

        let segmented = chunker.segment(&doc).unwrap();
        assert_eq!(segmented.chunks[0].source_pages, SourcePages::Range(1, 2));
        assert_eq!(segmented.chunks[1].source_pages, SourcePages::Range(2, 3));
    }

    #[test]
    fn test_fenced_response_with_gap_retried_then_accepted() {
        let doc = assemble_pages(&pages(&[&"x".repeat(100)]));

        // First attempt: fenced, covers only 95% -> rejected. Second attempt
        // covers the text fully -> accepted.
        let bad = format!("```json\n{}\n```", plan_response("s", &[(0, 50), (50, 95)]));
        let good = format!("```json\n{}\n```", plan_response("s", &[(0, 50), (50, 100)]));

        let generator = ScriptedGenerator::new(vec![bad, good]);
        let chunker = SemanticChunker::new(&generator, ChunkingConfig::default());

        let segmented = chunker.segment(&doc).unwrap();
        assert_eq!(generator.calls(), 2);
        assert_eq!(segmented.chunks.len(), 2);
    }

    #[test]
    fn test_coverage_within_tolerance_is_accepted() {
        let doc = assemble_pages(&pages(&[&"x".repeat(1000)]));

        // 1% gap is inside the default 2% tolerance.
        let generator = ScriptedGenerator::new(vec![plan_response("s", &[(0, 990)])]);
        let chunker = SemanticChunker::new(&generator, ChunkingConfig::default());

        assert!(chunker.segment(&doc).is_ok());
    }

    #[test]
    fn test_retry_exhaustion_is_fatal() {
        let doc = assemble_pages(&pages(&[&"x".repeat(100)]));

        let bad = plan_response("s", &[(0, 40)]);
        let generator = ScriptedGenerator::new(vec![bad.clone(), bad]);
        let chunker = SemanticChunker::new(&generator, ChunkingConfig::default());

        let err = chunker.segment(&doc).unwrap_err();
        assert!(matches!(
            err,
            IngestError::SegmentationFailed { attempts: 2, .. }
        ));
        assert_eq!(generator.calls(), 2);
    }

    #[test]
    fn test_non_json_response_is_rejected() {
        let doc = assemble_pages(&pages(&["some document text here"]));

        let generator = ScriptedGenerator::new(vec![
            "The document is about text.".to_string(),
            "Still not JSON.".to_string(),
        ]);
        let chunker = SemanticChunker::new(&generator, ChunkingConfig::default());

        let err = chunker.segment(&doc).unwrap_err();
        assert!(matches!(err, IngestError::SegmentationFailed { .. }));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        // Idempotent on already-stripped text
        assert_eq!(
            strip_code_fence(strip_code_fence("```json\n{}\n```")),
            "{}"
        );
    }

    #[test]
    fn test_unicode_offsets_are_character_based() {
        let doc = assemble_pages(&pages(&["한국어 문서 본문입니다"]));
        let total = doc.text.chars().count();

        let generator = ScriptedGenerator::new(vec![plan_response("요약", &[(0, total)])]);
        let chunker = SemanticChunker::new(&generator, ChunkingConfig::default());

        let segmented = chunker.segment(&doc).unwrap();
        assert_eq!(segmented.chunks[0].content, doc.text);
    }
}
