//! Citation resolution and marker insertion for research output.
//!
//! Search-grounded responses arrive with grounding metadata linking byte
//! spans of the generated text to retrieved web sources. This module
//! resolves each source URL to a short deterministic token (scoped by
//! the research unit's index so parallel branches never collide),
//! rewrites the text with inline citation markers, and flattens the
//! per-span attributions into [`SourceRecord`]s for the finalizer.

use std::collections::HashMap;

use super::message::{GroundingChunk, GroundingMetadata};
use super::state::{SourceRecord, Span};

/// Prefix for synthetic short-URL tokens.
pub const SHORT_URL_PREFIX: &str = "https://vertexaisearch.cloud.google.com/id";

/// One source reference attached to a cited span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    /// Display label derived from the source title.
    pub label: String,
    /// Short-URL token for this source.
    pub short_url: String,
    /// The original resolvable URL.
    pub value: String,
}

/// A cited span of research text with its attributed sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// Start of the cited span (byte offset, inclusive).
    pub start_index: usize,
    /// End of the cited span (byte offset, exclusive), into the
    /// *original* pre-insertion text.
    pub end_index: usize,
    /// Sources backing this span.
    pub segments: Vec<SourceRef>,
}

/// Maps each source URL to a short deterministic token.
///
/// Tokens are `{prefix}/{unit_id}-{chunk_idx}` where `chunk_idx` is the
/// position of the URL's first occurrence in the chunk list. Scoping by
/// `unit_id` keeps tokens from parallel research branches disjoint even
/// though every branch counts chunks from zero.
#[must_use]
pub fn resolve_urls(chunks: &[GroundingChunk], unit_id: usize) -> HashMap<String, String> {
    let mut resolved = HashMap::new();
    for (idx, chunk) in chunks.iter().enumerate() {
        // Placeholder chunks (no resolvable source) keep their index in
        // the chunk list but never receive a token.
        if chunk.uri.is_empty() {
            continue;
        }
        resolved
            .entry(chunk.uri.clone())
            .or_insert_with(|| format!("{SHORT_URL_PREFIX}/{unit_id}-{idx}"));
    }
    resolved
}

/// Derives a display label from a source title.
///
/// Drops the final dot-segment ("luatvietnam.vn" → "luatvietnam");
/// titles without a dot are kept as-is.
fn source_label(title: &str) -> String {
    title
        .rsplit_once('.')
        .map_or_else(|| title.to_string(), |(base, _)| base.to_string())
}

/// Builds citation records from grounding metadata.
///
/// Supports referencing chunk indices outside the chunk list are
/// silently skipped (malformed metadata degrades to fewer citations,
/// never to a failed branch).
#[must_use]
pub fn get_citations(
    grounding: &GroundingMetadata,
    resolved_urls: &HashMap<String, String>,
) -> Vec<Citation> {
    let mut citations = Vec::with_capacity(grounding.supports.len());

    for support in &grounding.supports {
        let mut segments = Vec::with_capacity(support.chunk_indices.len());
        for &idx in &support.chunk_indices {
            let Some(chunk) = grounding.chunks.get(idx) else {
                continue;
            };
            let Some(short_url) = resolved_urls.get(&chunk.uri) else {
                continue;
            };
            segments.push(SourceRef {
                label: source_label(&chunk.title),
                short_url: short_url.clone(),
                value: chunk.uri.clone(),
            });
        }
        citations.push(Citation {
            start_index: support.start_index,
            end_index: support.end_index,
            segments,
        });
    }

    citations
}

/// Inserts inline citation markers into research text.
///
/// Each citation contributes ` [label](short_url)` per segment at its
/// `end_index`. Offsets address the original text, so insertion runs
/// from the highest offset backward; earlier offsets stay valid.
///
/// Offset policy: spans whose `end_index` exceeds the text length or
/// does not fall on a UTF-8 character boundary are skipped, never
/// clamped. Duplicate `(start, end)` spans are inserted once.
#[must_use]
pub fn insert_citation_markers(text: &str, citations: &[Citation]) -> String {
    let mut sorted: Vec<&Citation> = citations.iter().collect();
    sorted.sort_by(|a, b| {
        b.end_index
            .cmp(&a.end_index)
            .then_with(|| b.start_index.cmp(&a.start_index))
    });
    sorted.dedup_by_key(|c| (c.end_index, c.start_index));

    let mut modified = text.to_string();
    for citation in sorted {
        // Offsets address the original text; is_char_boundary also
        // rejects anything past its end.
        let end = citation.end_index;
        if !text.is_char_boundary(end) {
            continue;
        }

        let mut marker = String::new();
        for segment in &citation.segments {
            marker.push_str(&format!(" [{}]({})", segment.label, segment.short_url));
        }
        modified.insert_str(end, &marker);
    }

    modified
}

/// Flattens citations into per-source records.
///
/// Records are grouped by short-URL token in first-seen order; each
/// record accumulates the spans where its source is cited.
#[must_use]
pub fn collect_sources(citations: &[Citation]) -> Vec<SourceRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut by_token: HashMap<String, SourceRecord> = HashMap::new();

    for citation in citations {
        let span = Span {
            start: citation.start_index,
            end: citation.end_index,
        };
        for segment in &citation.segments {
            if let Some(record) = by_token.get_mut(&segment.short_url) {
                if !record.segments.contains(&span) {
                    record.segments.push(span);
                }
            } else {
                order.push(segment.short_url.clone());
                by_token.insert(
                    segment.short_url.clone(),
                    SourceRecord {
                        label: segment.label.clone(),
                        short_url: segment.short_url.clone(),
                        value: segment.value.clone(),
                        segments: vec![span],
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|token| by_token.remove(&token))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::agent::message::GroundingSupport;

    fn chunk(uri: &str, title: &str) -> GroundingChunk {
        GroundingChunk {
            uri: uri.to_string(),
            title: title.to_string(),
        }
    }

    fn citation(start: usize, end: usize, segments: Vec<SourceRef>) -> Citation {
        Citation {
            start_index: start,
            end_index: end,
            segments,
        }
    }

    fn source_ref(label: &str, short: &str) -> SourceRef {
        SourceRef {
            label: label.to_string(),
            short_url: short.to_string(),
            value: format!("https://example.vn/{label}"),
        }
    }

    #[test]
    fn test_resolve_urls_dedup_first_wins() {
        let chunks = vec![
            chunk("https://luatvietnam.vn/a", "luatvietnam.vn"),
            chunk("https://chinhphu.vn/b", "chinhphu.vn"),
            chunk("https://luatvietnam.vn/a", "luatvietnam.vn"),
        ];
        let resolved = resolve_urls(&chunks, 0);
        assert_eq!(resolved.len(), 2);
        assert_eq!(
            resolved["https://luatvietnam.vn/a"],
            format!("{SHORT_URL_PREFIX}/0-0")
        );
        assert_eq!(
            resolved["https://chinhphu.vn/b"],
            format!("{SHORT_URL_PREFIX}/0-1")
        );
    }

    #[test]
    fn test_resolve_urls_scoped_by_unit_id() {
        let chunks = vec![chunk("https://luatvietnam.vn/a", "luatvietnam.vn")];
        let unit0 = resolve_urls(&chunks, 0);
        let unit1 = resolve_urls(&chunks, 1);
        assert_ne!(
            unit0["https://luatvietnam.vn/a"],
            unit1["https://luatvietnam.vn/a"]
        );
    }

    #[test]
    fn test_get_citations_basic() {
        let grounding = GroundingMetadata {
            chunks: vec![chunk("https://luatvietnam.vn/a", "luatvietnam.vn")],
            supports: vec![GroundingSupport {
                start_index: 0,
                end_index: 10,
                chunk_indices: vec![0],
            }],
        };
        let resolved = resolve_urls(&grounding.chunks, 3);
        let citations = get_citations(&grounding, &resolved);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].segments.len(), 1);
        assert_eq!(citations[0].segments[0].label, "luatvietnam");
        assert_eq!(
            citations[0].segments[0].short_url,
            format!("{SHORT_URL_PREFIX}/3-0")
        );
    }

    #[test]
    fn test_get_citations_skips_out_of_bounds_chunk_index() {
        let grounding = GroundingMetadata {
            chunks: vec![chunk("https://chinhphu.vn/b", "chinhphu.vn")],
            supports: vec![GroundingSupport {
                start_index: 0,
                end_index: 5,
                chunk_indices: vec![0, 7],
            }],
        };
        let resolved = resolve_urls(&grounding.chunks, 0);
        let citations = get_citations(&grounding, &resolved);
        assert_eq!(citations[0].segments.len(), 1);
    }

    #[test]
    fn test_insert_markers_empty_is_identity() {
        let text = "Theo Luật Đất đai 2024, hồ sơ gồm sổ đỏ.";
        assert_eq!(insert_citation_markers(text, &[]), text);
    }

    #[test]
    fn test_insert_markers_empty_segments_is_identity() {
        let text = "Không có nguồn.";
        let citations = vec![citation(0, text.len(), Vec::new())];
        assert_eq!(insert_citation_markers(text, &citations), text);
    }

    #[test]
    fn test_insert_markers_single() {
        let text = "Hello world. More text.";
        let citations = vec![citation(0, 12, vec![source_ref("luatvietnam", "S0")])];
        let result = insert_citation_markers(text, &citations);
        assert_eq!(result, "Hello world. [luatvietnam](S0) More text.");
    }

    #[test]
    fn test_insert_markers_highest_offset_first() {
        let text = "AAAA BBBB";
        let citations = vec![
            citation(0, 4, vec![source_ref("a", "S0")]),
            citation(5, 9, vec![source_ref("b", "S1")]),
        ];
        let result = insert_citation_markers(text, &citations);
        // The earlier span's offset must survive the later insertion.
        assert_eq!(result, "AAAA [a](S0) BBBB [b](S1)");
    }

    #[test]
    fn test_insert_markers_multiple_segments_one_span() {
        let text = "fact.";
        let citations = vec![citation(
            0,
            5,
            vec![source_ref("a", "S0"), source_ref("b", "S1")],
        )];
        let result = insert_citation_markers(text, &citations);
        assert_eq!(result, "fact. [a](S0) [b](S1)");
    }

    #[test]
    fn test_insert_markers_skips_out_of_range() {
        let text = "short";
        let citations = vec![citation(0, 100, vec![source_ref("a", "S0")])];
        assert_eq!(insert_citation_markers(text, &citations), text);
    }

    #[test]
    fn test_insert_markers_skips_non_char_boundary() {
        // "đất" is multi-byte; offset 1 falls inside 'đ'.
        let text = "đất đai";
        let citations = vec![citation(0, 1, vec![source_ref("a", "S0")])];
        assert_eq!(insert_citation_markers(text, &citations), text);
    }

    #[test]
    fn test_insert_markers_dedups_identical_spans() {
        let text = "fact.";
        let citations = vec![
            citation(0, 5, vec![source_ref("a", "S0")]),
            citation(0, 5, vec![source_ref("a", "S0")]),
        ];
        let result = insert_citation_markers(text, &citations);
        assert_eq!(result, "fact. [a](S0)");
    }

    #[test]
    fn test_collect_sources_groups_by_token() {
        let citations = vec![
            citation(0, 5, vec![source_ref("a", "S0")]),
            citation(6, 12, vec![source_ref("a", "S0"), source_ref("b", "S1")]),
        ];
        let sources = collect_sources(&citations);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].short_url, "S0");
        assert_eq!(
            sources[0].segments,
            vec![Span { start: 0, end: 5 }, Span { start: 6, end: 12 }]
        );
        assert_eq!(sources[1].short_url, "S1");
        assert_eq!(sources[1].segments, vec![Span { start: 6, end: 12 }]);
    }

    #[test]
    fn test_source_label_variants() {
        assert_eq!(source_label("luatvietnam.vn"), "luatvietnam");
        assert_eq!(source_label("thuvienphapluat.vn"), "thuvienphapluat");
        assert_eq!(source_label("chinhphu"), "chinhphu");
    }

    proptest! {
        /// Insertion grows the text by exactly the marker bytes for every
        /// valid span and never corrupts UTF-8 (guaranteed by String, but
        /// the length arithmetic catches misplaced insertions).
        #[test]
        fn prop_insert_markers_length(text in "[a-zA-Z .]{0,80}", ends in proptest::collection::vec(0usize..100, 0..8)) {
            let citations: Vec<Citation> = ends
                .iter()
                .enumerate()
                .map(|(i, &end)| citation(0, end, vec![source_ref("s", &format!("S{i}"))]))
                .collect();
            let result = insert_citation_markers(&text, &citations);

            // ASCII text: every in-range offset is a char boundary. The
            // set collapses identical (end, start) spans, matching the
            // insertion policy.
            let kept: usize = citations
                .iter()
                .filter(|c| c.end_index <= text.len())
                .map(|c| (c.end_index, c.start_index))
                .collect::<std::collections::BTreeSet<_>>()
                .len();
            let marker_len = " [s](S0)".len();
            prop_assert_eq!(result.len(), text.len() + kept * marker_len);
        }

        /// With no valid spans the text passes through unmodified.
        #[test]
        fn prop_out_of_range_is_identity(text in "[a-z]{0,20}", extra in 1usize..50) {
            let citations = vec![citation(0, text.len() + extra, vec![source_ref("s", "S0")])];
            prop_assert_eq!(insert_citation_markers(&text, &citations), text);
        }
    }
}
