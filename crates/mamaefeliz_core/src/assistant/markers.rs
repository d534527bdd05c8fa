//! Inline video markers embedded in assistant replies.
//!
//! # Grammar
//! - A marker is `[[VIDEO:<id>]]`; `<id>` is the shortest run of characters
//!   up to the first `]]`.
//! - Everything outside markers is plain text.
//!
//! # Invariants
//! - Tokenizing never fails; malformed markers stay plain text.
//! - Unresolvable ids render nothing.

use crate::assistant::video::{VideoCatalog, VideoResource};
use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[VIDEO:(.*?)\]\]").expect("valid video marker regex"));

/// Lexical unit of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyToken {
    Text(String),
    Video(String),
}

/// Reply unit after catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySegment<'a> {
    Text(String),
    Video(&'a VideoResource),
}

/// Splits reply text into plain-text and video-reference tokens.
///
/// Empty text runs between adjacent markers are omitted.
pub fn tokenize_reply(text: &str) -> Vec<ReplyToken> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for caps in VIDEO_MARKER_RE.captures_iter(text) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_text(&mut tokens, &text[cursor..whole.start()]);
        tokens.push(ReplyToken::Video(id.as_str().to_string()));
        cursor = whole.end();
    }
    push_text(&mut tokens, &text[cursor..]);

    tokens
}

/// Resolves video tokens against a catalog, dropping unknown ids.
pub fn resolve_reply<'a>(
    tokens: &[ReplyToken],
    catalog: &'a VideoCatalog,
) -> Vec<ReplySegment<'a>> {
    tokens
        .iter()
        .filter_map(|token| match token {
            ReplyToken::Text(text) => Some(ReplySegment::Text(text.clone())),
            ReplyToken::Video(id) => catalog.get(id).map(ReplySegment::Video),
        })
        .collect()
}

fn push_text(tokens: &mut Vec<ReplyToken>, text: &str) {
    if !text.is_empty() {
        tokens.push(ReplyToken::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_reply, tokenize_reply, ReplySegment, ReplyToken};
    use crate::assistant::video::VideoCatalog;

    #[test]
    fn splits_text_around_markers() {
        let tokens = tokenize_reply("Veja este vídeo: [[VIDEO:v1]] e depois [[VIDEO:v2]]");
        assert_eq!(
            tokens,
            vec![
                ReplyToken::Text("Veja este vídeo: ".to_string()),
                ReplyToken::Video("v1".to_string()),
                ReplyToken::Text(" e depois ".to_string()),
                ReplyToken::Video("v2".to_string()),
            ]
        );
    }

    #[test]
    fn plain_text_and_malformed_markers_stay_text() {
        assert_eq!(
            tokenize_reply("sem marcador [[VIDEO:v1]"),
            vec![ReplyToken::Text("sem marcador [[VIDEO:v1]".to_string())]
        );
        assert!(tokenize_reply("").is_empty());
    }

    #[test]
    fn unresolved_ids_render_nothing() {
        let catalog = VideoCatalog::builtin();
        let tokens = tokenize_reply("a[[VIDEO:nope]]b[[VIDEO:v3]]");
        let segments = resolve_reply(&tokens, &catalog);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], ReplySegment::Text("a".to_string()));
        assert_eq!(segments[1], ReplySegment::Text("b".to_string()));
        assert!(matches!(segments[2], ReplySegment::Video(video) if video.id == "v3"));
    }
}
