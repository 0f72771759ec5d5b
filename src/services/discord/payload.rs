use serde::Serialize;

use crate::errors::{NotifyError, NotifyResult};
use crate::types::{MessageItem, MessageLevel};

use super::config::SCHEME;

/// Maximum characters in one content field or embed description
pub const CHUNK_SIZE: usize = 2000;
/// Maximum characters across all embeds of one message
pub const TOTAL_CHUNK_SIZE: usize = 6000;
pub const MAX_EMBEDS: usize = 10;
/// How far back from a chunk boundary to look for whitespace to split on
pub const MAX_SEARCH_RUNES: usize = 100;

#[derive(Debug, Serialize, Default)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<EmbedItem>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub avatar_url: String,
}

#[derive(Debug, Serialize, Default)]
pub struct EmbedItem {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(rename = "description", skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Items produced from a message plus the number of characters that did not fit
#[derive(Debug, Default)]
pub struct SplitMessage {
    pub items: Vec<MessageItem>,
    pub omitted: usize,
}

/// One item per non-empty line, within the embed limits
pub fn items_from_lines(message: &str, level: MessageLevel) -> SplitMessage {
    let mut split = SplitMessage::default();
    let mut total = 0;
    for line in message.lines().filter(|l| !l.trim().is_empty()) {
        let length = line.chars().count();
        if split.items.len() == MAX_EMBEDS || total >= TOTAL_CHUNK_SIZE {
            split.omitted += length;
            continue;
        }
        let keep = length.min(CHUNK_SIZE).min(TOTAL_CHUNK_SIZE - total);
        split.omitted += length - keep;
        total += keep;
        split
            .items
            .push(MessageItem::new(line.chars().take(keep).collect::<String>()).with_level(level));
    }
    split
}

/// Chunks of at most `CHUNK_SIZE` characters, preferring to break on whitespace
pub fn partition_message(message: &str, level: MessageLevel) -> SplitMessage {
    let chars: Vec<char> = message.chars().collect();
    let mut split = SplitMessage::default();
    let mut pos = 0;
    let mut total = 0;

    while pos < chars.len() && split.items.len() < MAX_EMBEDS && total < TOTAL_CHUNK_SIZE {
        let max_end = chars
            .len()
            .min(pos + CHUNK_SIZE)
            .min(pos + (TOTAL_CHUNK_SIZE - total));
        let mut end = max_end;
        if max_end < chars.len() {
            let floor = max_end.saturating_sub(MAX_SEARCH_RUNES).max(pos + 1);
            if let Some(i) = (floor..=max_end).rev().find(|&i| chars[i - 1].is_whitespace()) {
                end = i;
            }
        }
        let chunk: String = chars[pos..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            split.items.push(MessageItem::new(chunk).with_level(level));
        }
        total += end - pos;
        pos = end;
    }
    split.omitted = chars.len() - pos;
    split
}

/// Build the webhook payload for `items`
///
/// A single untitled item without a level is sent as plain `content`;
/// everything else becomes embeds coloured by level.
pub fn create_payload(
    items: Vec<MessageItem>,
    title: &str,
    colors: [u32; MessageLevel::COUNT],
) -> NotifyResult<WebhookPayload> {
    if items.is_empty() {
        return Err(NotifyError::validation(SCHEME, "message is empty"));
    }

    if items.len() == 1 && title.is_empty() && items[0].level == MessageLevel::Unknown {
        let mut items = items;
        return Ok(WebhookPayload {
            content: items.remove(0).text,
            ..Default::default()
        });
    }

    let embeds = items
        .into_iter()
        .take(MAX_EMBEDS)
        .enumerate()
        .map(|(i, item)| EmbedItem {
            title: if i == 0 { title.to_string() } else { String::new() },
            content: item.text,
            color: colors[item.level.index()],
            footer: (item.level != MessageLevel::Unknown).then(|| EmbedFooter {
                text: item.level.to_string(),
            }),
        })
        .collect();

    Ok(WebhookPayload {
        embeds,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: [u32; MessageLevel::COUNT] = [1, 2, 3, 4, 5];

    #[test]
    fn test_single_plain_item_uses_content() {
        let payload = create_payload(vec![MessageItem::new("hello")], "", COLORS).unwrap();
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"content":"hello"}"#);
    }

    #[test]
    fn test_titled_message_uses_embeds() {
        let items = vec![
            MessageItem::new("one").with_level(MessageLevel::Error),
            MessageItem::new("two"),
        ];
        let payload = create_payload(items, "Build", COLORS).unwrap();
        assert!(payload.content.is_empty());
        assert_eq!(payload.embeds.len(), 2);
        assert_eq!(payload.embeds[0].title, "Build");
        assert_eq!(payload.embeds[0].color, 2);
        assert_eq!(payload.embeds[0].footer.as_ref().unwrap().text, "Error");
        assert!(payload.embeds[1].title.is_empty());
        assert!(payload.embeds[1].footer.is_none());
    }

    #[test]
    fn test_empty_items_rejected() {
        assert!(create_payload(Vec::new(), "", COLORS).is_err());
    }

    #[test]
    fn test_lines_skip_blank_and_cap_embeds() {
        let message = (0..12).map(|i| format!("line {i}\n\n")).collect::<String>();
        let split = items_from_lines(&message, MessageLevel::Info);
        assert_eq!(split.items.len(), MAX_EMBEDS);
        assert_eq!(split.items[0].text, "line 0");
        assert_eq!(split.omitted, "line 10".len() + "line 11".len());
    }

    #[test]
    fn test_partition_prefers_whitespace() {
        let word = "abcd ";
        let message = word.repeat(1000);
        let split = partition_message(&message, MessageLevel::Unknown);
        assert!(split.items.len() >= 2);
        for item in &split.items {
            assert!(item.text.chars().count() <= CHUNK_SIZE);
            assert!(item.text.ends_with("abcd"));
        }
        assert_eq!(split.omitted, 0);
    }

    #[test]
    fn test_partition_respects_total_limit() {
        let message = "x".repeat(TOTAL_CHUNK_SIZE + 500);
        let split = partition_message(&message, MessageLevel::Unknown);
        assert_eq!(split.items.len(), 3);
        assert_eq!(split.omitted, 500);
    }
}
