//! Integration tests for collapsing, expanding, bulk paste and painting.

mod common;

use common::{chip_addresses, type_text, TestFieldBuilder};
use recipient_chips::adapters::mock::MockRenderSurface;
use recipient_chips::config::FieldConfig;
use recipient_chips::events::{ChangeReason, ChipEvent};

fn reasons(events: &mut tokio::sync::mpsc::UnboundedReceiver<ChipEvent>) -> Vec<ChangeReason> {
    let mut reasons = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ChipEvent::ChipsChanged { reason, .. } = event {
            reasons.push(reason);
        }
    }
    reasons
}

#[test]
fn test_collapse_expand_events_and_recipient_order() {
    let mut field = TestFieldBuilder::new().with_width(300).build();
    let mut events = field.subscribe();
    type_text(&mut field, "a@example.com, b@example.com, c@example.com, d@example.com,");
    assert_eq!(reasons(&mut events), vec![ChangeReason::Added; 4]);

    field.on_focus_changed(false).unwrap();
    let collapsed: Vec<String> = field
        .recipients()
        .iter()
        .map(|entry| entry.address().to_string())
        .collect();
    assert_eq!(
        collapsed,
        vec!["a@example.com", "b@example.com", "c@example.com", "d@example.com"]
    );
    assert_eq!(reasons(&mut events), vec![ChangeReason::Collapsed]);

    field.on_focus_changed(true).unwrap();
    assert_eq!(reasons(&mut events), vec![ChangeReason::Expanded]);
    assert_eq!(field.chips().len(), 4);
}

#[test]
fn test_custom_template_and_limit() {
    let config = FieldConfig::default()
        .with_chip_limit(1)
        .with_more_template("and %d others");
    let mut field = TestFieldBuilder::new().with_config(config).with_width(300).build();
    type_text(&mut field, "a@example.com, b@example.com, c@example.com,");

    field.on_focus_changed(false).unwrap();
    assert_eq!(field.chips().len(), 1);
    assert_eq!(field.overflow().map(|summary| summary.label()), Some("and 2 others"));
}

#[test]
fn test_should_shrink_off_never_collapses() {
    let config = FieldConfig::default().with_should_shrink(false);
    let mut field = TestFieldBuilder::new().with_config(config).with_width(300).build();
    type_text(&mut field, "a@example.com, b@example.com, c@example.com,");

    field.on_focus_changed(false).unwrap();
    assert!(field.overflow().is_none());
    assert_eq!(field.chips().len(), 3);
}

#[test]
fn test_paste_then_expand_restores_every_chip() {
    let mut field = TestFieldBuilder::new().with_width(300).unfocused().build();
    field
        .paste_recipients("a@example.com; b@example.com, c@example.com, d@example.com")
        .unwrap();
    assert_eq!(field.chips().len(), 2);

    field.on_focus_changed(true).unwrap();
    assert_eq!(
        chip_addresses(&field),
        vec!["a@example.com", "b@example.com", "c@example.com", "d@example.com"]
    );
    assert!(field.chips().iter().all(|chip| chip.is_visible()));
    field.store().check_invariants().unwrap();
}

#[test]
fn test_plain_text_mode_keeps_text_and_folds_tail() {
    let config = FieldConfig::default().with_no_chips(true);
    let mut field = TestFieldBuilder::new()
        .with_config(config)
        .with_width(300)
        .without_resources()
        .build();
    type_text(&mut field, "a@example.com, b@example.com, c@example.com");

    assert!(field.chips().is_empty());
    assert_eq!(field.text(), "a@example.com, b@example.com, c@example.com");

    field.on_focus_changed(false).unwrap();
    assert_eq!(field.overflow().map(|summary| summary.count()), Some(1));
    field.on_focus_changed(true).unwrap();
    assert!(field.overflow().is_none());
}

#[test]
fn test_paint_skips_folded_chips() {
    let mut field = TestFieldBuilder::new().with_width(300).build();
    type_text(&mut field, "a@example.com, b@example.com, c@example.com,");
    field.on_focus_changed(false).unwrap();

    let surface = MockRenderSurface::new();
    let painted = field.paint(&surface).unwrap();

    let labels: Vec<&str> = painted
        .chips
        .iter()
        .map(|chip| chip.rendered.drawable.as_str())
        .collect();
    assert_eq!(labels, vec!["[a@example.com]", "[b@example.com]"]);
    assert_eq!(
        painted.summary.map(|(_, rendered)| rendered.drawable),
        Some("+1 more".to_string())
    );
}

#[test]
fn test_paint_without_resources_is_configuration_error() {
    let mut field = TestFieldBuilder::new().without_resources().build();
    let surface = MockRenderSurface::new();
    let err = field.paint(&surface).unwrap_err();
    assert!(!err.is_recoverable());
}
