//! Output window lifecycle against a live timeline

use questlog::domain::*;
use questlog::journal::Journal;

fn journal_with_entries(ids: &[&str]) -> Journal {
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
    for id in ids {
        journal
            .add_entry(Entry::new(
                EntryId::from(*id),
                CharacterId::from("hero"),
                CategoryId::from("stats"),
                vec![format!("note {id}")],
            ))
            .unwrap();
    }
    journal
}

fn output(id: &str, target: &str) -> Output {
    Output::new(OutputId::from(id), id, "sheet-url", EntryId::from(target))
}

#[test]
fn window_entries_default_to_ignored_in_timeline_order() {
    let mut journal = journal_with_entries(&["a", "b"]);
    journal.add_output(output("out", "b")).unwrap();

    let out = journal.output(&OutputId::from("out")).unwrap();
    assert!(out.members.is_empty());
    assert_eq!(out.ignored, vec![EntryId::from("a"), EntryId::from("b")]);
    assert_eq!(
        journal.owning_output(&EntryId::from("a")),
        Some(&OutputId::from("out"))
    );
}

#[test]
fn consecutive_targets_partition_the_timeline() {
    let mut journal = journal_with_entries(&["a", "b", "c"]);
    journal.add_output(output("first", "a")).unwrap();
    journal.add_output(output("second", "c")).unwrap();

    assert_eq!(
        journal.owning_output(&EntryId::from("a")),
        Some(&OutputId::from("first"))
    );
    assert_eq!(
        journal.owning_output(&EntryId::from("b")),
        Some(&OutputId::from("second"))
    );
    let second = journal.output(&OutputId::from("second")).unwrap();
    assert_eq!(second.ignored, vec![EntryId::from("b"), EntryId::from("c")]);
}

#[test]
fn entries_past_the_last_target_belong_to_no_output() {
    let mut journal = journal_with_entries(&["a", "b"]);
    journal.add_output(output("out", "a")).unwrap();
    assert_eq!(journal.owning_output(&EntryId::from("b")), None);

    // a later entry stays unowned too
    journal
        .add_entry(Entry::new(
            EntryId::from("c"),
            CharacterId::from("hero"),
            CategoryId::from("stats"),
            vec![],
        ))
        .unwrap();
    assert_eq!(journal.owning_output(&EntryId::from("c")), None);
}

#[test]
fn membership_flips_move_entries_between_partitions() {
    let mut journal = journal_with_entries(&["a", "b"]);
    journal.add_output(output("out", "b")).unwrap();

    journal
        .set_output_membership(&OutputId::from("out"), &EntryId::from("a"), true)
        .unwrap();
    let out = journal.output(&OutputId::from("out")).unwrap();
    assert_eq!(out.members, vec![EntryId::from("a")]);
    assert_eq!(out.ignored, vec![EntryId::from("b")]);

    journal
        .set_output_membership(&OutputId::from("out"), &EntryId::from("a"), false)
        .unwrap();
    let out = journal.output(&OutputId::from("out")).unwrap();
    assert!(out.members.is_empty());
    assert_eq!(out.ignored, vec![EntryId::from("a"), EntryId::from("b")]);
}

#[test]
fn membership_is_rejected_outside_the_window() {
    let mut journal = journal_with_entries(&["a", "b"]);
    journal.add_output(output("out", "a")).unwrap();
    let result =
        journal.set_output_membership(&OutputId::from("out"), &EntryId::from("b"), true);
    assert!(matches!(result, Err(DomainError::InvalidOperation { .. })));
}

#[test]
fn two_outputs_cannot_share_a_target() {
    let mut journal = journal_with_entries(&["a", "b"]);
    journal.add_output(output("one", "a")).unwrap();
    assert!(journal.add_output(output("two", "a")).is_err());

    journal.add_output(output("two", "b")).unwrap();
    assert!(journal
        .retarget_output(&OutputId::from("two"), EntryId::from("a"))
        .is_err());
}

#[test]
fn deleting_the_target_retargets_to_the_prior_entry() {
    let mut journal = journal_with_entries(&["a", "b", "c"]);
    journal.add_output(output("out", "c")).unwrap();

    journal.delete_entry(&EntryId::from("c")).unwrap();

    let out = journal.output(&OutputId::from("out")).unwrap();
    assert_eq!(out.target_entry, EntryId::from("b"));
    assert_eq!(out.ignored, vec![EntryId::from("a"), EntryId::from("b")]);
}

#[test]
fn deleting_the_only_window_entry_drops_the_output() {
    let mut journal = journal_with_entries(&["a", "b"]);
    journal.add_output(output("one", "a")).unwrap();
    journal.add_output(output("two", "b")).unwrap();

    journal.delete_entry(&EntryId::from("a")).unwrap();

    assert!(journal.output(&OutputId::from("one")).is_none());
    let two = journal.output(&OutputId::from("two")).unwrap();
    assert_eq!(two.target_entry, EntryId::from("b"));
    assert_eq!(two.ignored, vec![EntryId::from("b")]);
}

#[test]
fn retargeting_purges_entries_that_left_the_window() {
    let mut journal = journal_with_entries(&["a", "b", "c"]);
    journal.add_output(output("out", "c")).unwrap();
    journal
        .set_output_membership(&OutputId::from("out"), &EntryId::from("c"), true)
        .unwrap();

    journal
        .retarget_output(&OutputId::from("out"), EntryId::from("a"))
        .unwrap();

    let out = journal.output(&OutputId::from("out")).unwrap();
    assert!(out.members.is_empty());
    assert_eq!(out.ignored, vec![EntryId::from("a")]);
}

#[test]
fn deleting_an_output_releases_its_window() {
    let mut journal = journal_with_entries(&["a"]);
    journal.add_output(output("out", "a")).unwrap();
    journal.delete_output(&OutputId::from("out")).unwrap();

    assert!(journal.outputs().is_empty());
    assert_eq!(journal.owning_output(&EntryId::from("a")), None);
}
