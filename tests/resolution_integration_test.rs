//! Integration tests for background resolution: batch and individual
//! lookups, alternates, failures and superseded jobs.

mod common;

use common::{bob_smith, directory_with_bob, type_text, TestFieldBuilder};
use recipient_chips::adapters::mock::{MockDirectory, RecordedLookup};
use recipient_chips::events::{ChangeReason, ChipEvent};
use recipient_chips::models::{ContactId, RecipientEntry, TextRange};
use recipient_chips::traits::LookupError;

#[tokio::test]
async fn test_focused_paste_resolves_in_one_batch() {
    let directory = directory_with_bob();
    let mut field = TestFieldBuilder::new()
        .with_width(300)
        .with_directory(directory.clone())
        .build();

    field
        .paste_recipients("bob@example.com, carol@example.com")
        .unwrap();
    assert!(field.resolution_in_flight());
    field.settle().await.unwrap();

    assert_eq!(
        directory.get_requests(),
        vec![RecordedLookup::Addresses(vec![
            "bob@example.com".to_string(),
            "carol@example.com".to_string(),
        ])]
    );

    let chips = field.chips();
    assert_eq!(chips.len(), 2);
    assert_eq!(chips[0].entry(), &bob_smith());
    assert_eq!(chips[0].range(), TextRange::new(0, 28));
    assert!(chips[1].is_provisional());
    assert_eq!(chips[1].range(), TextRange::new(29, 47));
    assert_eq!(field.text(), "Bob Smith <bob@example.com>, carol@example.com, ");
    field.store().check_invariants().unwrap();
}

#[tokio::test]
async fn test_unfocused_paste_resolves_head_then_rest_on_focus() {
    let directory = directory_with_bob();
    directory.add_entry(RecipientEntry::resolved(Some("Erin"), "e@x.com", 7, true));
    let mut field = TestFieldBuilder::new()
        .with_width(300)
        .with_directory(directory.clone())
        .unfocused()
        .build();

    field
        .paste_recipients("bob@example.com, c@x.com, d@x.com, e@x.com")
        .unwrap();
    field.settle().await.unwrap();

    // only the visible head is looked up while collapsed
    assert_eq!(
        directory.get_requests(),
        vec![RecordedLookup::Addresses(vec![
            "bob@example.com".to_string(),
            "c@x.com".to_string(),
        ])]
    );
    assert_eq!(field.chips().len(), 2);
    assert_eq!(field.chips()[0].entry(), &bob_smith());
    assert_eq!(field.overflow().map(|summary| summary.count()), Some(2));

    field.on_focus_changed(true).unwrap();
    field.settle().await.unwrap();

    let addresses: Vec<String> = field
        .recipients()
        .iter()
        .map(|entry| entry.address().to_string())
        .collect();
    assert_eq!(addresses, vec!["bob@example.com", "c@x.com", "d@x.com", "e@x.com"]);
    assert_eq!(field.chips()[3].entry().contact_id(), ContactId::Directory(7));
    field.store().check_invariants().unwrap();
}

#[tokio::test]
async fn test_lookup_failure_keeps_chips_provisional() {
    let directory = directory_with_bob();
    directory.fail_with(LookupError::Unavailable("offline".to_string()));
    let mut field = TestFieldBuilder::new().with_directory(directory).build();
    type_text(&mut field, "bob@example.com,");

    field.start_batch_resolution().expect("batch started");
    field.settle().await.unwrap();

    assert!(field.chips()[0].is_provisional());
    assert_eq!(field.stats().lookup_failures, 1);
    assert_eq!(field.text(), "<bob@example.com>, ");
}

#[tokio::test]
async fn test_new_batch_supersedes_running_batch() {
    let directory = directory_with_bob().gated();
    let mut field = TestFieldBuilder::new()
        .with_directory(directory.clone())
        .build();
    type_text(&mut field, "bob@example.com,");

    let first = field.start_batch_resolution().expect("first batch");
    let second = field.start_batch_resolution().expect("second batch");
    assert_ne!(first, second);

    directory.release(2);
    field.settle().await.unwrap();

    assert_eq!(field.stats().resolutions_applied, 1);
    assert_eq!(field.chips()[0].entry(), &bob_smith());
    assert_eq!(field.stats().stale_resolutions, 0);
}

#[tokio::test]
async fn test_alternates_flow() {
    let robert = RecipientEntry::resolved(Some("Robert Smith"), "robert@example.com", 43, true);
    let directory = MockDirectory::new();
    directory.add_alternates("bob@example.com", vec![bob_smith(), robert.clone()]);
    let mut field = TestFieldBuilder::new().with_directory(directory).build();
    let mut events = field.subscribe();
    type_text(&mut field, "bob@example.com,");
    let chip = field.chips()[0].id();

    field.request_alternates(chip).unwrap();
    field.settle().await.unwrap();

    let mut loaded = None;
    while let Ok(event) = events.try_recv() {
        if let ChipEvent::AlternatesLoaded { chip: for_chip, entries } = event {
            loaded = Some((for_chip, entries));
        }
    }
    let (for_chip, entries) = loaded.expect("alternates event");
    assert_eq!(for_chip, chip);
    assert_eq!(entries.len(), 2);
    assert_eq!(field.alternates_for(chip).map(<[RecipientEntry]>::len), Some(2));

    field.choose_alternate(chip, robert.clone()).unwrap();
    assert_eq!(field.chips()[0].id(), chip);
    assert_eq!(field.chips()[0].entry(), &robert);
    assert_eq!(field.text(), "Robert Smith <robert@example.com>, ");

    let mut reasons = Vec::new();
    while let Ok(ChipEvent::ChipsChanged { reason, .. }) = events.try_recv() {
        reasons.push(reason);
    }
    assert_eq!(reasons, vec![ChangeReason::Resolved]);
}

#[tokio::test]
async fn test_alternates_for_removed_chip_are_dropped() {
    let directory = MockDirectory::new().gated();
    directory.add_alternates("bob@example.com", vec![bob_smith()]);
    let mut field = TestFieldBuilder::new()
        .with_directory(directory.clone())
        .build();
    type_text(&mut field, "bob@example.com,");
    let chip = field.chips()[0].id();

    field.request_alternates(chip).unwrap();
    field.remove_chip(chip).unwrap();
    directory.release(1);
    field.settle().await.unwrap();

    assert!(field.alternates_for(chip).is_none());
    assert_eq!(field.stats().stale_resolutions, 1);
}

#[tokio::test]
async fn test_refocus_resolves_typed_provisional_chips() {
    let directory = directory_with_bob();
    let mut field = TestFieldBuilder::new()
        .with_width(300)
        .with_directory(directory.clone())
        .build();
    type_text(&mut field, "bob@example.com, carol@example.com,");
    assert!(!field.resolution_in_flight());

    field.on_focus_changed(false).unwrap();
    field.on_focus_changed(true).unwrap();
    field.settle().await.unwrap();

    assert_eq!(
        directory.get_requests(),
        vec![RecordedLookup::Addresses(vec![
            "bob@example.com".to_string(),
            "carol@example.com".to_string(),
        ])]
    );
    assert_eq!(field.chips()[0].entry(), &bob_smith());
    assert!(field.chips()[1].is_provisional());
}

#[tokio::test]
async fn test_refocus_with_only_resolved_chips_starts_nothing() {
    let directory = directory_with_bob();
    let mut field = TestFieldBuilder::new()
        .with_width(300)
        .with_directory(directory.clone())
        .build();
    type_text(&mut field, "bob@example.com,");
    field.start_batch_resolution().expect("batch started");
    field.settle().await.unwrap();

    field.on_focus_changed(false).unwrap();
    field.on_focus_changed(true).unwrap();

    assert!(!field.resolution_in_flight());
    assert_eq!(directory.get_requests().len(), 1);
}
