//! Revision chain scenarios through the journal aggregate
//!
//! These tests drive chains the way an editor would: add entries, revise
//! them, move them around the timeline, and delete links, checking the
//! parent/child invariants after every command.

use questlog::domain::*;
use questlog::journal::Journal;

fn base_journal() -> Journal {
    let mut journal = Journal::new();
    journal
        .add_category(Category::new(
            CategoryId::from("stats"),
            "Stats",
            vec![PropertySpec::new("note", false)],
        ))
        .unwrap();
    let mut hero = Character::new(CharacterId::from("hero"), "Alia");
    hero.categories.push(CategoryId::from("stats"));
    journal.add_character(hero).unwrap();
    journal
}

fn entry(id: &str) -> Entry {
    Entry::new(
        EntryId::from(id),
        CharacterId::from("hero"),
        CategoryId::from("stats"),
        vec![format!("note for {id}")],
    )
}

#[test]
fn revision_extends_the_chain_after_its_tip() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("b")).unwrap();

    assert_eq!(
        journal.timeline().order(),
        &[EntryId::from("a"), EntryId::from("b")]
    );
    assert_eq!(journal.timeline().cursor(), Some(1));
    assert_eq!(journal.entry(&EntryId::from("a")).unwrap().child, Some(EntryId::from("b")));
    assert_eq!(journal.entry(&EntryId::from("b")).unwrap().parent, Some(EntryId::from("a")));
    assert_eq!(
        journal.chains().chain(&EntryId::from("a")).unwrap(),
        &[EntryId::from("a"), EntryId::from("b")]
    );
}

#[test]
fn new_entries_land_right_after_the_cursor() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_entry(entry("b")).unwrap();
    journal.set_history_index(Some(0));
    journal.add_entry(entry("c")).unwrap();

    assert_eq!(
        journal.timeline().order(),
        &[EntryId::from("a"), EntryId::from("c"), EntryId::from("b")]
    );
    assert_eq!(journal.timeline().current_entry(), Some(&EntryId::from("c")));
}

#[test]
fn revising_via_any_chain_member_extends_the_tip() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("b")).unwrap();
    // naming the root still appends after the current tip
    journal.add_revision(&EntryId::from("a"), entry("c")).unwrap();

    assert_eq!(
        journal.chains().chain(&EntryId::from("b")).unwrap(),
        &[EntryId::from("a"), EntryId::from("b"), EntryId::from("c")]
    );
    assert_eq!(journal.entry(&EntryId::from("b")).unwrap().child, Some(EntryId::from("c")));
}

#[test]
fn moving_a_revision_above_its_parent_swaps_their_roles() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("b")).unwrap();
    journal.add_entry(entry("c")).unwrap();
    assert_eq!(
        journal.timeline().order(),
        &[EntryId::from("a"), EntryId::from("b"), EntryId::from("c")]
    );

    journal.move_entry(&EntryId::from("b"), 0).unwrap();

    assert_eq!(
        journal.timeline().order(),
        &[EntryId::from("b"), EntryId::from("a"), EntryId::from("c")]
    );
    let a = journal.entry(&EntryId::from("a")).unwrap();
    let b = journal.entry(&EntryId::from("b")).unwrap();
    assert!(b.is_root());
    assert_eq!(b.child, Some(EntryId::from("a")));
    assert_eq!(a.parent, Some(EntryId::from("b")));
    assert_eq!(a.child, None);
    assert_eq!(
        journal.chains().chain(&EntryId::from("a")).unwrap(),
        &[EntryId::from("b"), EntryId::from("a")]
    );
}

#[test]
fn moving_a_parent_below_its_child_swaps_their_roles() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("b")).unwrap();
    journal.add_entry(entry("c")).unwrap();

    journal.move_entry(&EntryId::from("a"), 2).unwrap();

    assert_eq!(
        journal.timeline().order(),
        &[EntryId::from("b"), EntryId::from("c"), EntryId::from("a")]
    );
    let a = journal.entry(&EntryId::from("a")).unwrap();
    let b = journal.entry(&EntryId::from("b")).unwrap();
    assert!(b.is_root());
    assert_eq!(b.child, Some(EntryId::from("a")));
    assert_eq!(a.parent, Some(EntryId::from("b")));
}

#[test]
fn moving_within_the_allowed_span_keeps_links() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_entry(entry("x")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("b")).unwrap();
    assert_eq!(
        journal.timeline().order(),
        &[EntryId::from("a"), EntryId::from("x"), EntryId::from("b")]
    );

    // b stays strictly after its parent a; no role swap happens
    journal.move_entry(&EntryId::from("b"), 1).unwrap();

    assert_eq!(
        journal.timeline().order(),
        &[EntryId::from("a"), EntryId::from("b"), EntryId::from("x")]
    );
    assert_eq!(journal.entry(&EntryId::from("b")).unwrap().parent, Some(EntryId::from("a")));
    assert_eq!(journal.entry(&EntryId::from("a")).unwrap().child, Some(EntryId::from("b")));
}

#[test]
fn deleting_a_chain_root_promotes_its_child() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("b")).unwrap();

    journal.delete_entry(&EntryId::from("a")).unwrap();

    let b = journal.entry(&EntryId::from("b")).unwrap();
    assert!(b.is_root());
    assert_eq!(journal.timeline().order(), &[EntryId::from("b")]);
    assert_eq!(
        journal.chains().chain(&EntryId::from("b")).unwrap(),
        &[EntryId::from("b")]
    );
}

#[test]
fn deleting_a_middle_revision_relinks_its_neighbors() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("b")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("c")).unwrap();

    journal.delete_entry(&EntryId::from("b")).unwrap();

    assert_eq!(journal.entry(&EntryId::from("a")).unwrap().child, Some(EntryId::from("c")));
    assert_eq!(journal.entry(&EntryId::from("c")).unwrap().parent, Some(EntryId::from("a")));
    assert_eq!(
        journal.chains().chain(&EntryId::from("c")).unwrap(),
        &[EntryId::from("a"), EntryId::from("c")]
    );
}

#[test]
fn delete_chain_removes_every_member_at_once() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("b")).unwrap();
    journal.add_entry(entry("c")).unwrap();

    journal.delete_chain(&EntryId::from("b")).unwrap();

    assert_eq!(journal.timeline().order(), &[EntryId::from("c")]);
    assert!(journal.entry(&EntryId::from("a")).is_none());
    assert!(journal.entry(&EntryId::from("b")).is_none());
}

#[test]
fn deletion_impact_counts_downstream_revisions_only() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("b")).unwrap();
    journal.add_revision(&EntryId::from("a"), entry("c")).unwrap();

    assert_eq!(journal.deletion_impact(&EntryId::from("a")).unwrap(), 2);
    assert_eq!(journal.deletion_impact(&EntryId::from("b")).unwrap(), 1);
    assert_eq!(journal.deletion_impact(&EntryId::from("c")).unwrap(), 0);
}

#[test]
fn revisions_are_rejected_when_the_category_forbids_updates() {
    let mut journal = Journal::new();
    let mut category = Category::new(
        CategoryId::from("log"),
        "Log",
        vec![PropertySpec::new("note", false)],
    );
    category.can_update = false;
    journal.add_category(category).unwrap();
    let mut hero = Character::new(CharacterId::from("hero"), "Alia");
    hero.categories.push(CategoryId::from("log"));
    journal.add_character(hero).unwrap();

    let root = Entry::new(
        EntryId::from("a"),
        CharacterId::from("hero"),
        CategoryId::from("log"),
        vec![],
    );
    journal.add_entry(root).unwrap();

    let revision = Entry::new(
        EntryId::from("b"),
        CharacterId::from("hero"),
        CategoryId::from("log"),
        vec![],
    );
    let result = journal.add_revision(&EntryId::from("a"), revision);
    assert!(matches!(result, Err(DomainError::InvalidOperation { .. })));
}

#[test]
fn singleton_categories_hold_one_chain_but_allow_revisions() {
    let mut journal = Journal::new();
    let mut category = Category::new(
        CategoryId::from("sheet"),
        "Character Sheet",
        vec![PropertySpec::new("summary", true)],
    );
    category.is_singleton = true;
    journal.add_category(category).unwrap();
    let mut hero = Character::new(CharacterId::from("hero"), "Alia");
    hero.categories.push(CategoryId::from("sheet"));
    journal.add_character(hero).unwrap();

    let make = |id: &str| {
        Entry::new(
            EntryId::from(id),
            CharacterId::from("hero"),
            CategoryId::from("sheet"),
            vec![],
        )
    };
    journal.add_entry(make("a")).unwrap();
    assert!(journal.add_entry(make("other-root")).is_err());
    journal.add_revision(&EntryId::from("a"), make("b")).unwrap();
    assert_eq!(
        journal.chains().chain(&EntryId::from("a")).unwrap().len(),
        2
    );
}

#[test]
fn revision_must_keep_its_lineage_identity() {
    let mut journal = base_journal();
    let mut npc = Character::new(CharacterId::from("npc"), "Bren");
    npc.categories.push(CategoryId::from("stats"));
    journal.add_character(npc).unwrap();
    journal.add_entry(entry("a")).unwrap();

    let foreign = Entry::new(
        EntryId::from("b"),
        CharacterId::from("npc"),
        CategoryId::from("stats"),
        vec![],
    );
    let result = journal.add_revision(&EntryId::from("a"), foreign);
    assert!(matches!(result, Err(DomainError::InvalidOperation { .. })));
}

#[test]
fn prelinked_entries_are_rejected_as_new_roots() {
    let mut journal = base_journal();
    journal.add_entry(entry("a")).unwrap();

    let mut linked = entry("b");
    linked.parent = Some(EntryId::from("a"));
    assert!(journal.add_entry(linked).is_err());
    // the failed command must not leave a half-inserted entry behind
    assert_eq!(journal.timeline().len(), 1);
    assert!(journal.entry(&EntryId::from("b")).is_none());
}
