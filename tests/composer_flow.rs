mod common;

use crate::common::*;
use friendly_chat_lib::{MessageRecord, ViewUpdate};

#[test]
fn test_send_publishes_and_resets_composer() {
    let mut harness = Harness::text_only();
    harness.sign_in("alice");

    harness.handle.input_changed("hello").unwrap();
    harness.handle.send_pressed().unwrap();
    harness.event_loop.process_pending();

    assert_eq!(
        harness.feed.pushed_records(),
        vec![MessageRecord::text("alice", "hello")]
    );
    assert_eq!(harness.feed.pushes.lock().unwrap()[0].0, "messages");
    assert_eq!(harness.client().composer_input(), "");
    assert!(!harness.client().is_send_enabled());
    assert_eq!(
        harness.view.take().last(),
        Some(&ViewUpdate::ComposerChanged {
            input: String::new(),
            send_enabled: false,
        })
    );
}

#[test]
fn test_send_enabled_tracks_trimmed_input() {
    let mut harness = Harness::text_only();
    for (input, expected) in [("", false), ("   ", false), ("hi", true), (" hi ", true)] {
        harness.handle.input_changed(input).unwrap();
        harness.event_loop.process_pending();
        assert_eq!(harness.client().is_send_enabled(), expected, "input {input:?}");
    }
}

#[test]
fn test_blank_input_is_never_sent() {
    let mut harness = Harness::text_only();
    harness.sign_in("alice");
    harness.handle.input_changed("   ").unwrap();
    harness.handle.send_pressed().unwrap();
    harness.event_loop.process_pending();

    assert!(harness.feed.pushes.lock().unwrap().is_empty());
    assert_eq!(harness.client().composer_input(), "   ");
}

#[test]
fn test_input_is_capped_at_length_limit() {
    let mut harness = Harness::text_only();
    harness.sign_in("alice");
    harness.handle.input_changed("a".repeat(1001)).unwrap();
    harness.handle.send_pressed().unwrap();
    harness.event_loop.process_pending();

    let pushed = harness.feed.pushed_records();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].text_content().map(str::len), Some(1000));
}

#[test]
fn test_text_keeps_surrounding_whitespace() {
    let mut harness = Harness::text_only();
    harness.sign_in("alice");
    harness.handle.input_changed("  hi there ").unwrap();
    harness.handle.send_pressed().unwrap();
    harness.event_loop.process_pending();

    assert_eq!(
        harness.feed.pushed_records(),
        vec![MessageRecord::text("alice", "  hi there ")]
    );
}

#[test]
fn test_signed_out_sender_is_anonymous() {
    let mut harness = Harness::text_only();
    harness.handle.input_changed("who am i").unwrap();
    harness.handle.send_pressed().unwrap();
    harness.event_loop.process_pending();

    assert_eq!(
        harness.feed.pushed_records(),
        vec![MessageRecord::text("anonymous", "who am i")]
    );
}

#[test]
fn test_cap_is_measured_in_utf16_units() {
    let mut harness = Harness::text_only();
    harness.sign_in("alice");
    harness.handle.input_changed("\u{1f600}".repeat(1000)).unwrap();
    harness.handle.send_pressed().unwrap();
    harness.event_loop.process_pending();

    let pushed = harness.feed.pushed_records();
    let text = pushed[0].text_content().unwrap();
    assert_eq!(text.encode_utf16().count(), 1000);
}

#[test]
fn test_only_ascii_blank_disables_send() {
    let mut harness = Harness::text_only();
    for (input, expected) in [("\u{1}", false), ("\u{a0}", true), ("\u{3000}", true)] {
        harness.handle.input_changed(input).unwrap();
        harness.event_loop.process_pending();
        assert_eq!(harness.client().is_send_enabled(), expected, "input {input:?}");
    }
}
