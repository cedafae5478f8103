/*!
 * Tests for the batch translation state machine: delimiter parsing,
 * acceptance tolerance, retries, and the per-item fallback chain.
 */

use std::sync::Arc;

use subsmith::app_config::TranslationMode;
use subsmith::providers::mock::MockChatClient;
use subsmith::translation::batch::{build_batch_prompt, parse_batch_response, SEGMENT_DELIMITER};

use crate::common::{fast_batch_config, test_translator};

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// An empty chunk produces an empty result without any call
#[tokio::test]
async fn test_translate_chunk_withEmptyInput_shouldReturnEmpty() {
    let client = Arc::new(MockChatClient::working());
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator.translate_chunk(&[], TranslationMode::English).await;
    assert!(result.is_empty());
    assert_eq!(client.call_count(), 0);
}

/// Exactly N segments come back in order after cleaning
#[tokio::test]
async fn test_translate_chunk_withExactSegmentCount_shouldReturnAllInOrder() {
    let client = Arc::new(MockChatClient::working());
    client.push_response("Uno ===NEXT=== Dos ===NEXT=== Tres");
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator
        .translate_chunk(&texts(&["one", "two", "three"]), TranslationMode::English)
        .await;

    assert_eq!(result, vec!["Uno", "Dos", "Tres"]);
    assert_eq!(client.call_count(), 1);
}

/// Echoed ordinal labels are stripped from each segment
#[tokio::test]
async fn test_translate_chunk_withEchoedLabels_shouldStripThem() {
    let client = Arc::new(MockChatClient::working());
    client.push_response("Subtitle 1: Uno ===NEXT=== Subtitle 2: Dos ===NEXT=== Subtitle3： Tres");
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator
        .translate_chunk(&texts(&["one", "two", "three"]), TranslationMode::English)
        .await;

    assert_eq!(result, vec!["Uno", "Dos", "Tres"]);
}

/// One missing segment is tolerated: the last entry keeps its source text
#[tokio::test]
async fn test_translate_chunk_withOneMissingSegment_shouldPadWithOriginal() {
    let client = Arc::new(MockChatClient::working());
    client.push_response("Uno ===NEXT=== Dos");
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator
        .translate_chunk(&texts(&["one", "two", "three"]), TranslationMode::English)
        .await;

    assert_eq!(result, vec!["Uno", "Dos", "three"]);
    assert_eq!(client.call_count(), 1);
}

/// Spurious extra segments are truncated to the input count
#[tokio::test]
async fn test_translate_chunk_withExtraSegments_shouldTruncate() {
    let client = Arc::new(MockChatClient::working());
    client.push_response("Uno ===NEXT=== Dos ===NEXT=== Tres ===NEXT=== Cuatro");
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator
        .translate_chunk(&texts(&["one", "two", "three"]), TranslationMode::English)
        .await;

    assert_eq!(result, vec!["Uno", "Dos", "Tres"]);
}

/// A response short by more than one is untrustworthy: the whole batch is
/// redone item by item
#[tokio::test]
async fn test_translate_chunk_withTooFewSegments_shouldFallBackPerItem() {
    let client = Arc::new(MockChatClient::working());
    client.push_response("Bonjour");
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator
        .translate_chunk(&texts(&["a", "b", "c"]), TranslationMode::English)
        .await;

    // One batch call, then one call per entry using the working fallback
    assert_eq!(result, vec!["[TX] a", "[TX] b", "[TX] c"]);
    assert_eq!(client.call_count(), 4);
}

/// Transport errors retry the batch call, then fall back per item
#[tokio::test]
async fn test_translate_chunk_withFailingCalls_shouldRetryThenFallBack() {
    let client = Arc::new(MockChatClient::working());
    client.push_failure("boom");
    client.push_failure("boom again");
    client.push_failure("still down");
    client.push_response("Uno");
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator
        .translate_chunk(&texts(&["one", "two", "three"]), TranslationMode::English)
        .await;

    // 3 failed batch attempts, then per-item: first scripted "Uno", rest fallback
    assert_eq!(result, vec!["Uno", "[TX] two", "[TX] three"]);
    assert_eq!(client.call_count(), 6);
}

/// When every call fails, every entry ships with its original text
#[tokio::test]
async fn test_translate_chunk_withTotalOutage_shouldReturnOriginals() {
    let client = Arc::new(MockChatClient::failing());
    let translator = test_translator(client.clone(), fast_batch_config());

    let input = texts(&["keep me", "and me", "me too"]);
    let result = translator.translate_chunk(&input, TranslationMode::English).await;

    assert_eq!(result, input);
    // 3 batch attempts + 3 entries x 3 per-item attempts
    assert_eq!(client.call_count(), 12);
}

/// A single text never uses the delimiter prompt
#[tokio::test]
async fn test_translate_chunk_withSingleText_shouldUsePerItemPath() {
    let client = Arc::new(MockChatClient::working());
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator
        .translate_chunk(&texts(&["Bonjour"]), TranslationMode::English)
        .await;

    assert_eq!(result, vec!["[TX] Bonjour"]);
    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].user, "Bonjour");
    assert!(!calls[0].user.contains(SEGMENT_DELIMITER));
}

/// A chunk below the configured minimum goes straight to the per-item path
#[tokio::test]
async fn test_translate_chunk_belowBatchMin_shouldTranslateItemByItem() {
    let client = Arc::new(MockChatClient::working());
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator
        .translate_chunk(&texts(&["first", "second"]), TranslationMode::English)
        .await;

    assert_eq!(result, vec!["[TX] first", "[TX] second"]);
    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert!(!call.user.contains(SEGMENT_DELIMITER));
    }
}

/// Per-item retries are bounded; exhaustion keeps the original text without
/// disturbing neighbours
#[tokio::test]
async fn test_translate_chunk_withOnePoisonedItem_shouldKeepItsOriginal() {
    let client = Arc::new(MockChatClient::working());
    // Two texts, below batch_min: per-item path. The first item fails all
    // three attempts, the second succeeds on its first.
    client.push_failure("e1");
    client.push_failure("e2");
    client.push_failure("e3");
    client.push_response("Deuxième");
    let translator = test_translator(client.clone(), fast_batch_config());

    let result = translator
        .translate_chunk(&texts(&["doomed", "fine"]), TranslationMode::English)
        .await;

    assert_eq!(result, vec!["doomed", "Deuxième"]);
    assert_eq!(client.call_count(), 4);
}

/// The batch prompt carries the delimiter instruction and 1-based labels
#[test]
fn test_build_batch_prompt_withThreeTexts_shouldLabelAndDelimit() {
    let prompt = build_batch_prompt(&texts(&["alpha", "beta", "gamma"]), TranslationMode::Chinese);

    assert!(prompt.contains(SEGMENT_DELIMITER));
    assert!(prompt.contains("Subtitle 1: alpha"));
    assert!(prompt.contains("Subtitle 2: beta"));
    assert!(prompt.contains("Subtitle 3: gamma"));
    assert!(prompt.contains("Chinese"));
}

/// Delimiter splitting with trimming
#[test]
fn test_parse_batch_response_withTwoSegments_shouldSplitAndTrim() {
    let segments = parse_batch_response("Bonjour ===NEXT=== Monde");
    assert_eq!(segments, vec!["Bonjour", "Monde"]);
}

/// A response with no delimiter is a single segment
#[test]
fn test_parse_batch_response_withNoDelimiter_shouldYieldOneSegment() {
    let segments = parse_batch_response("Bonjour");
    assert_eq!(segments, vec!["Bonjour"]);
}

/// Segments empty after cleaning are discarded
#[test]
fn test_parse_batch_response_withEmptySegments_shouldDiscardThem() {
    let segments = parse_batch_response("A ===NEXT===  ===NEXT=== Subtitle 2: ===NEXT=== B");
    assert_eq!(segments, vec!["A", "B"]);
}

/// Token usage accumulates across calls
#[tokio::test]
async fn test_usage_afterCalls_shouldAccumulateTokens() {
    let client = Arc::new(MockChatClient::working());
    let translator = test_translator(client.clone(), fast_batch_config());

    translator
        .translate_chunk(&texts(&["hello"]), TranslationMode::English)
        .await;

    let usage = translator.usage();
    assert!(usage.prompt_tokens > 0);
    assert!(usage.completion_tokens > 0);
    assert_eq!(usage.total_tokens, usage.prompt_tokens + usage.completion_tokens);
}

/// The system prompt reflects the requested mode on every path
#[tokio::test]
async fn test_translate_chunk_shouldSendModeSpecificSystemPrompt() {
    let client = Arc::new(MockChatClient::working());
    client.push_response("Uno ===NEXT=== Dos ===NEXT=== Tres");
    let translator = test_translator(client.clone(), fast_batch_config());

    translator
        .translate_chunk(&texts(&["one", "two", "three"]), TranslationMode::Bilingual)
        .await;

    let calls = client.calls();
    assert!(calls[0].system.contains("English"));
    assert!(calls[0].system.contains("Chinese"));
}
