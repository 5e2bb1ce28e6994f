//! Edits that carry several addresses at once: every terminated address
//! becomes a chip and no typed text is lost.

mod common;

use common::{chip_addresses, type_text, TestFieldBuilder};

#[test]
fn test_set_text_chips_every_address() {
    let mut field = TestFieldBuilder::new().build();
    field.set_text("alice@example.com, bob@example.com,").unwrap();

    assert_eq!(chip_addresses(&field), vec!["alice@example.com", "bob@example.com"]);
    assert_eq!(field.text(), "<alice@example.com>, <bob@example.com>, ");
    field.store().check_invariants().unwrap();
}

#[test]
fn test_single_insert_chips_every_address() {
    let mut field = TestFieldBuilder::new().build();
    field
        .insert_text("alice@example.com; bob@example.com, carol@example.com,")
        .unwrap();

    assert_eq!(
        chip_addresses(&field),
        vec!["alice@example.com", "bob@example.com", "carol@example.com"]
    );
    assert_eq!(
        field.text(),
        "<alice@example.com>, <bob@example.com>, <carol@example.com>, "
    );
}

#[test]
fn test_replace_range_before_chip_keeps_every_address() {
    let mut field = TestFieldBuilder::new().build();
    type_text(&mut field, "carol@example.com,");

    field
        .replace_range(0, 0, "alice@example.com, bob@example.com, ")
        .unwrap();

    assert_eq!(
        chip_addresses(&field),
        vec!["alice@example.com", "bob@example.com", "carol@example.com"]
    );
    assert_eq!(
        field.text(),
        "<alice@example.com>, <bob@example.com>, <carol@example.com>, "
    );
    field.store().check_invariants().unwrap();
}

#[test]
fn test_unterminated_tail_stays_text() {
    let mut field = TestFieldBuilder::new().build();
    field.set_text("alice@example.com, bo").unwrap();

    assert_eq!(chip_addresses(&field), vec!["alice@example.com"]);
    assert_eq!(field.text(), "<alice@example.com>, bo");
}

#[test]
fn test_quoted_separator_is_not_a_token_end() {
    let mut field = TestFieldBuilder::new().build();
    field
        .set_text("\"Smith, Bob\" <bob@example.com>, carol@example.com,")
        .unwrap();

    let chips = field.chips();
    assert_eq!(chips.len(), 2);
    assert_eq!(chips[0].entry().display_name(), Some("Smith, Bob"));
    assert_eq!(
        field.text(),
        "\"Smith, Bob\" <bob@example.com>, <carol@example.com>, "
    );
}

#[test]
fn test_unfocused_set_text_keeps_raw_text() {
    let mut field = TestFieldBuilder::new().unfocused().build();
    field.set_text("alice@example.com, bob@example.com,").unwrap();

    assert!(field.chips().is_empty());
    assert_eq!(field.text(), "alice@example.com, bob@example.com,");
}
