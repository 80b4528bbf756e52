use crate::*;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::grouping::{GroupedRow, group_items};
use crate::sorting::{compare, compare_text, sort_items, sort_tree};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn named(name: &str) -> Item {
    Item::new().with("displayName", name).with("value", name)
}

fn parent(name: &str, children: Vec<Item>) -> Item {
    named(name).with_children("items", children)
}

/// P, Q, X { Y, Z { W } }, V
fn sample_tree() -> Vec<Item> {
    vec![
        named("P"),
        named("Q"),
        parent("X", vec![named("Y"), parent("Z", vec![named("W")])]),
        named("V"),
    ]
}

fn labels(list: &mut ItemList, query: Option<&Query>) -> Vec<String> {
    let view = list.view_list(query).clone();
    view.iter()
        .map(|row| match &row.kind {
            RowKind::Item(id) => list.text_of(*id),
            RowKind::Group(h) => format!("[{}]", h.key),
        })
        .collect()
}

fn current_labels(list: &mut ItemList) -> Vec<String> {
    let query = list.query().cloned();
    labels(list, query.as_ref())
}

fn list_of(items: Vec<Item>) -> ItemList {
    let mut list = ItemList::new(ItemListOptions::default());
    list.set_items(items);
    list
}

fn random_value(rng: &mut Lcg) -> Option<Value> {
    match rng.gen_range_u32(0, 8) {
        0 => None,
        1 => Some(Value::Int(rng.gen_range_u64(0, 50) as i64 - 25)),
        2 => Some(Value::Float(rng.gen_range_u64(0, 1000) as f64 / 7.0)),
        3 => Some(Value::Text(format!("t{}", rng.gen_range_u32(0, 30)))),
        4 => Some(Value::date(rng.gen_range_u64(0, 10_000) as i64)),
        5 => Some(Value::Bool(rng.gen_bool())),
        6 => Some(Value::Text(String::new())),
        _ => {
            let v = rng.gen_range_u64(0, 20) as i64;
            Some(Value::lazy(move || Value::Int(v)))
        }
    }
}

#[test]
fn collapse_then_expand_restores_children() {
    let mut list = list_of(vec![parent("A", vec![named("B")]), named("C")]);
    assert_eq!(current_labels(&mut list), ["A", "B", "C"]);

    list.toggle_collapse(0, true).unwrap();
    assert_eq!(current_labels(&mut list), ["A", "C"]);
    assert!(list.row(0).unwrap().collapsed);

    list.toggle_collapse(0, false).unwrap();
    assert_eq!(current_labels(&mut list), ["A", "B", "C"]);
}

#[test]
fn collapse_roundtrip_restores_exact_subsequence_for_every_node() {
    let mut list = list_of(sample_tree());
    let before = current_labels(&mut list);
    for index in 0..before.len() {
        if !list.row(index).unwrap().collapsible {
            continue;
        }
        list.toggle_collapse(index, true).unwrap();
        list.toggle_collapse(index, false).unwrap();
        assert_eq!(current_labels(&mut list), before, "index={index}");
    }
}

#[test]
fn sort_by_age_ascending() {
    let mut items = vec![
        Item::new().with("age", 30),
        Item::new().with("age", 10),
        Item::new().with("age", 20),
    ];
    sort_items(&mut items, &[SortInfo::ascending("age")]);
    let ages: Vec<_> = items.iter().map(|it| it.get("age").cloned()).collect();
    assert_eq!(
        ages,
        [Some(Value::Int(10)), Some(Value::Int(20)), Some(Value::Int(30))]
    );
}

#[test]
fn fixed_window_past_the_end_is_empty_with_full_leading_padding() {
    let mut v = Viewport::new(ViewportOptions::new(ViewportMode::Fixed).with_row_height(20));
    v.set_count(10);
    v.set_geometry(100, 205);

    let w = v.window();
    assert_eq!(w.start_index, 10);
    assert_eq!(w.end_index, 10);
    assert_eq!(w.last_index(), None);
    assert_eq!(w.padding_before, 200);
    assert_eq!(w.padding_after, 0);
    assert!(w.out_of_range);
}

#[test]
fn short_query_yields_empty_view() {
    let mut list = ItemList::new(ItemListOptions::default().with_min_search_length(2));
    list.set_items(sample_tree());

    let view = list.view_list(Some(&Query::text("W")));
    assert!(view.is_empty());
    assert_eq!(view.depth_max(), 0);

    let view = list.view_list(Some(&Query::text("")));
    assert!(view.is_empty());

    let view = list.view_list(None);
    assert_eq!(view.len(), 7);
}

#[test]
fn drag_into_own_subtree_is_rejected() {
    let mut list = list_of(sample_tree());
    assert_eq!(current_labels(&mut list), ["P", "Q", "X", "Y", "Z", "W", "V"]);

    assert_eq!(list.calc_drag_target(2, 5), None);
    assert_eq!(list.calc_drag_target(2, 3), None);
    assert_eq!(
        list.drop_item(2, 5),
        Err(ListError::InvalidDropTarget { from: 2, to: 5 })
    );
    assert_eq!(current_labels(&mut list), ["P", "Q", "X", "Y", "Z", "W", "V"]);
}

#[test]
fn drag_onto_deeper_row_resolves_to_ancestor_at_same_depth() {
    let mut list = list_of(sample_tree());
    assert_eq!(list.calc_drag_target(6, 5), Some(2));
    assert_eq!(list.calc_drag_target(6, 3), Some(2));
    assert_eq!(list.calc_drag_target(3, 5), Some(4));
    assert_eq!(list.calc_drag_target(4, 4), Some(4));
    assert_eq!(list.calc_drag_target(4, 99), None);

    list.drop_item(6, 3).unwrap();
    assert_eq!(current_labels(&mut list), ["P", "Q", "V", "X", "Y", "Z", "W"]);
}

#[test]
fn dragging_down_places_row_after_target() {
    let mut list = list_of(sample_tree());
    list.drop_item(0, 1).unwrap();
    assert_eq!(current_labels(&mut list), ["Q", "P", "X", "Y", "Z", "W", "V"]);

    // A child dragged onto a shallower row leaves its parent.
    list.drop_item(5, 6).unwrap();
    assert_eq!(current_labels(&mut list), ["Q", "P", "X", "Y", "Z", "V", "W"]);
    let w = list.item_at(6).map(|it| it.text("displayName"));
    assert_eq!(w.as_deref(), Some("W"));
    assert_eq!(list.row(6).unwrap().depth, 0);
    assert!(!list.row(4).unwrap().collapsible);

    let items = list.items();
    assert_eq!(items.len(), 5);
}

#[test]
fn drag_onto_leaf_at_same_or_shallower_depth_is_a_sibling_position() {
    let mut list = list_of(sample_tree());
    // Q is a leaf beside P.
    assert_eq!(list.calc_drag_target(0, 1), Some(1));
    // V is a root leaf, shallower than Y.
    assert_eq!(list.calc_drag_target(3, 6), Some(6));
    // W is a leaf deeper than V: it resolves to X, its root ancestor.
    assert_eq!(list.calc_drag_target(6, 5), Some(2));
}

fn view_labels(list: &ItemList, view: &ViewList) -> Vec<String> {
    view.item_ids().map(|id| list.text_of(id)).collect()
}

#[test]
fn drop_preview_matches_the_committed_drop() {
    for (from, to) in [(6, 3), (3, 6), (0, 1), (5, 6)] {
        let mut list = list_of(sample_tree());
        let (resolved, preview) = list.preview_drop(from, to).unwrap();
        assert_eq!(Some(resolved), list.calc_drag_target(from, to));
        let previewed = view_labels(&list, &preview);
        let depths: Vec<usize> = preview.iter().map(|r| r.depth).collect();
        // Nothing is committed by a preview.
        assert_eq!(current_labels(&mut list), ["P", "Q", "X", "Y", "Z", "W", "V"]);

        list.drop_item(from, to).unwrap();
        assert_eq!(current_labels(&mut list), previewed, "drop {from} -> {to}");
        let committed: Vec<usize> = list.current_view().iter().map(|r| r.depth).collect();
        assert_eq!(committed, depths, "drop {from} -> {to}");
    }

    let mut list = list_of(sample_tree());
    assert_eq!(list.preview_drop(2, 5), None);
    let (resolved, same) = list.preview_drop(4, 4).unwrap();
    assert_eq!(resolved, 4);
    assert_eq!(&same, list.current_view());

    list.sort_by(None);
    assert_eq!(list.preview_drop(0, 1), None);
}

#[test]
fn reorder_is_unavailable_while_sorted_or_grouped() {
    let mut list = list_of(sample_tree());
    list.sort_by(None);
    assert_eq!(list.drop_item(0, 1), Err(ListError::ReorderUnavailable));
    list.clear_sort();

    list.group(vec![GroupInfo::new("displayName")]);
    assert_eq!(list.drop_item(1, 3), Err(ListError::ReorderUnavailable));
    assert_eq!(list.calc_drag_target(1, 3), None);
}

#[test]
fn filter_keeps_ancestors_of_matches() {
    let mut list = list_of(sample_tree());
    assert_eq!(labels(&mut list, Some(&Query::text("w"))), ["X", "Z", "W"]);
    assert_eq!(labels(&mut list, Some(&Query::text("W"))), ["X", "Z", "W"]);

    let q = Query::pattern(|text| text == "P" || text == "Y");
    assert_eq!(labels(&mut list, Some(&q)), ["P", "X", "Y"]);
}

#[test]
fn filter_uses_search_field_when_configured() {
    let items = vec![
        named("alpha").with("code", "zz"),
        named("beta").with("code", "aa"),
    ];
    let mut list = ItemList::new(ItemListOptions::default().with_search_field("code"));
    list.set_items(items);
    assert_eq!(labels(&mut list, Some(&Query::text("a"))), ["beta"]);
}

#[test]
fn hide_selected_removes_selected_subtrees() {
    let mut list = ItemList::new(
        ItemListOptions::default()
            .with_multi_select(true)
            .with_hide_selected(true),
    );
    list.set_items(sample_tree());
    let x = list.item_id_at(2).unwrap();
    let p = list.item_id_at(0).unwrap();

    list.toggle_select(&[x, p], true).unwrap();
    assert_eq!(current_labels(&mut list), ["Q", "V"]);

    list.unselect_all();
    assert_eq!(current_labels(&mut list).len(), 7);
}

#[test]
fn single_select_replaces_previous_selection() {
    let mut list = list_of(sample_tree());
    let p = list.item_id_at(0).unwrap();
    let q = list.item_id_at(1).unwrap();

    assert_eq!(list.toggle_select(&[p], true).unwrap(), [p]);
    let changed = list.toggle_select(&[q], true).unwrap();
    assert_eq!(changed, [p, q]);
    assert_eq!(list.selected_item(), Ok(Some(q)));

    assert_eq!(
        list.set_selected_items(&[p, q]),
        Err(ListError::TooManySelected { count: 2 })
    );
    assert_eq!(
        list.toggle_select(&[p, q], true),
        Err(ListError::TooManySelected { count: 2 })
    );

    list.set_multi_select(true);
    assert_eq!(list.selected_item(), Err(ListError::MultiSelectActive));
}

#[test]
fn switching_to_single_select_keeps_first_selected() {
    let mut list = ItemList::new(ItemListOptions::default().with_multi_select(true));
    list.set_items(sample_tree());
    let ids: Vec<ItemId> = (0..3).map(|i| list.item_id_at(i).unwrap()).collect();
    list.set_selected_items(&ids).unwrap();
    assert_eq!(list.selected_items().len(), 3);

    list.set_multi_select(false);
    assert_eq!(list.selected_item(), Ok(Some(ids[0])));
}

#[test]
fn unselectable_items_are_never_selected() {
    let mut list = ItemList::new(ItemListOptions::default().with_multi_select(true));
    list.set_items(vec![
        named("a"),
        named("b").with_selectable(false),
        named("c"),
    ]);
    let b = list.item_id_at(1).unwrap();
    assert!(list.toggle_select(&[b], true).unwrap().is_empty());

    assert_eq!(list.select_range(2, 0), Ok(2));
    let selected: Vec<String> = list
        .selected_items()
        .into_iter()
        .map(|id| list.text_of(id))
        .collect();
    assert_eq!(selected, ["a", "c"]);
}

#[test]
fn select_range_requires_multi_select_and_valid_indices() {
    let mut list = list_of(sample_tree());
    assert_eq!(
        list.select_range(0, 1),
        Err(ListError::RangeSelectRequiresMultiSelect)
    );

    list.set_multi_select(true);
    assert_eq!(
        list.select_range(0, 7),
        Err(ListError::IndexOutOfRange { index: 7, len: 7 })
    );
    assert_eq!(list.select_range(1, 3), Ok(3));
    assert_eq!(list.select_range(5, 5), Ok(1));
    assert_eq!(list.selected_items().len(), 1);
}

#[test]
fn set_items_preserving_selection_matches_on_value_field() {
    let mut list = ItemList::new(ItemListOptions::default().with_multi_select(true));
    list.set_items(vec![named("a"), named("b"), named("c")]);
    let a = list.item_id_at(0).unwrap();
    let c = list.item_id_at(2).unwrap();
    list.set_selected_items(&[a, c]).unwrap();

    list.set_items_preserving_selection(vec![named("c"), named("d"), named("a")]);
    let selected: Vec<String> = list
        .selected_items()
        .into_iter()
        .map(|id| list.text_of(id))
        .collect();
    assert_eq!(selected, ["c", "a"]);
}

#[test]
fn set_items_takes_selection_from_new_items() {
    let mut list = list_of(vec![named("a").with_selected(true)]);
    assert_eq!(list.selected_items().len(), 1);

    list.set_items(vec![
        named("x"),
        named("y").with_selected(true),
        named("z").with_selected(true),
    ]);
    let selected = list.selected_item().unwrap().map(|id| list.text_of(id));
    assert_eq!(selected.as_deref(), Some("y"));
}

#[test]
fn group_headers_precede_members_in_first_seen_order() {
    let items = vec![
        named("a").with("team", "red"),
        named("b").with("team", "blue"),
        named("c").with("team", "red"),
        named("d"),
    ];
    let mut list = list_of(items);
    list.group(vec![GroupInfo::new("team")]);
    assert_eq!(
        current_labels(&mut list),
        ["[red]", "a", "c", "[blue]", "b", "[]", "d"]
    );

    let header = list.row(0).unwrap().group().cloned().unwrap();
    assert_eq!(header.count, 2);
    assert_eq!(header.path, ["red"]);
    assert_eq!(list.row(1).unwrap().depth, 1);
    assert_eq!(list.item_id_at(0), Err(ListError::NotAnItem { index: 0 }));

    let info = list.group_infos()[0].clone();
    assert!(list.ungroup(&info));
    assert!(!list.ungroup(&info));
    assert_eq!(current_labels(&mut list), ["a", "b", "c", "d"]);
}

#[test]
fn nested_groups_sorted_by_key() {
    let items = vec![
        named("a").with("team", "red").with("role", "dev"),
        named("b").with("team", "blue").with("role", "ops"),
        named("c").with("team", "red").with("role", "ops"),
        named("d").with("team", "blue").with("role", "ops"),
    ];
    let mut list = list_of(items);
    list.group(vec![
        GroupInfo::new("team").with_order(GroupOrder::Sorted(SortOrder::Ascending)),
        GroupInfo::new("role").with_order(GroupOrder::Sorted(SortOrder::Descending)),
    ]);
    assert_eq!(
        current_labels(&mut list),
        [
            "[blue]", "[ops]", "b", "d", "[red]", "[ops]", "c", "[dev]", "a"
        ]
    );
    assert_eq!(list.current_view().depth_max(), 2);
}

fn grouped_labels(rows: &[GroupedRow<'_>]) -> Vec<String> {
    rows.iter()
        .map(|row| match row {
            GroupedRow::Header(h) => format!("{}[{}]", "-".repeat(h.level), h.key),
            GroupedRow::Member(item) => item.text("displayName"),
        })
        .collect()
}

#[test]
fn group_items_nests_buckets_in_first_seen_or_sorted_order() {
    let items = vec![
        named("a").with("team", "red").with("role", "ops"),
        named("b").with("team", "blue").with("role", "dev"),
        named("c").with("team", "red").with("role", "dev"),
        named("d").with("role", "ops"),
    ];

    let rows = group_items(&items, &[GroupInfo::new("team"), GroupInfo::new("role")]);
    assert_eq!(
        grouped_labels(&rows),
        [
            "[red]", "-[ops]", "a", "-[dev]", "c", "[blue]", "-[dev]", "b", "[]", "-[ops]", "d"
        ]
    );
    match &rows[1] {
        GroupedRow::Header(h) => {
            assert_eq!(h.path, ["red", "ops"]);
            assert_eq!(h.count, 1);
        }
        GroupedRow::Member(_) => panic!("expected a header"),
    }

    let sorted = GroupInfo::new("team").with_order(GroupOrder::Sorted(SortOrder::Descending));
    let rows = group_items(&items, &[sorted]);
    assert_eq!(
        grouped_labels(&rows),
        ["[red]", "a", "c", "[blue]", "b", "[]", "d"]
    );

    assert_eq!(grouped_labels(&group_items(&items, &[])), ["a", "b", "c", "d"]);
}

#[test]
fn collapsed_group_state_survives_recomputation() {
    let items = vec![
        named("b").with("team", "red"),
        named("a").with("team", "red"),
        named("c").with("team", "blue"),
    ];
    let mut list = list_of(items);
    list.group(vec![GroupInfo::new("team")]);

    assert_eq!(list.toggle_collapse(0, true).map(|k| k.item_id()), Ok(None));
    assert_eq!(current_labels(&mut list), ["[red]", "[blue]", "c"]);

    list.sort_by(None);
    assert_eq!(current_labels(&mut list), ["[red]", "[blue]", "c"]);

    list.toggle_collapse(0, false).unwrap();
    assert_eq!(current_labels(&mut list), ["[red]", "a", "b", "[blue]", "c"]);
}

#[test]
fn toggle_all_collapses_nested_nodes_and_groups() {
    let mut list = list_of(sample_tree());
    assert_eq!(list.toggle_all(true), 2);
    assert_eq!(current_labels(&mut list), ["P", "Q", "X", "V"]);

    list.toggle_collapse(2, false).unwrap();
    assert_eq!(current_labels(&mut list), ["P", "Q", "X", "Y", "Z", "V"]);

    assert_eq!(list.toggle_all(false), 1);
    assert_eq!(current_labels(&mut list).len(), 7);

    list.group(vec![GroupInfo::new("displayName")]);
    list.toggle_all(true);
    assert_eq!(current_labels(&mut list), ["[P]", "[Q]", "[X]", "[V]"]);
}

#[test]
fn toggle_collapse_rejects_leaves_and_bad_indices() {
    let mut list = list_of(sample_tree());
    assert_eq!(
        list.toggle_collapse(0, true),
        Err(ListError::NotCollapsible { index: 0 })
    );
    assert_eq!(
        list.toggle_collapse(42, true),
        Err(ListError::IndexOutOfRange { index: 42, len: 7 })
    );

    let x = list.item_id_at(2).unwrap();
    list.update_item(x, |item| item.collapsible = false);
    assert_eq!(
        list.toggle_collapse(2, true),
        Err(ListError::NotCollapsible { index: 2 })
    );
}

#[test]
fn depth_and_parent_info() {
    let mut list = list_of(sample_tree());
    let view = list.current_view().clone();
    assert_eq!(view.depth_max(), 2);
    let depths: Vec<usize> = view.iter().map(|r| r.depth).collect();
    assert_eq!(depths, [0, 0, 0, 1, 1, 2, 0]);

    let w = view.get(5).and_then(ViewRow::item_id).unwrap();
    let z = view.get(4).and_then(ViewRow::item_id).unwrap();
    let x = view.get(2).and_then(ViewRow::item_id).unwrap();
    assert_eq!(list.depth(w), Some(2));
    assert_eq!(list.parent(w), Some(z));
    assert_eq!(
        list.parent_info(z),
        Some(ParentInfo {
            parent: Some(x),
            index: 1,
            siblings: 2
        })
    );
    assert_eq!(list.parent_info(x).map(|p| p.parent), Some(None));
    assert_eq!(list.item_index(w), Some(5));
    assert_eq!(view.subtree_end(2), 6);
    assert_eq!(view.parent_index(5), Some(4));
}

#[test]
fn children_field_is_configurable() {
    let items = vec![named("root").with_children("nodes", vec![named("leaf")])];
    let mut list = ItemList::new(ItemListOptions::default().with_children_field("nodes"));
    list.set_items(items);
    assert_eq!(current_labels(&mut list), ["root", "leaf"]);

    list.set_children_field("items");
    assert_eq!(current_labels(&mut list), ["root"]);
}

#[test]
fn sort_applies_within_each_sibling_group() {
    let mut list = list_of(vec![
        parent("b", vec![named("y"), named("x")]),
        named("a"),
    ]);
    let info = list.sort_by(None);
    assert_eq!(info.order, SortOrder::Ascending);
    assert_eq!(current_labels(&mut list), ["a", "b", "x", "y"]);

    let info = list.sort_by(None);
    assert_eq!(info.order, SortOrder::Descending);
    assert_eq!(current_labels(&mut list), ["b", "y", "x", "a"]);

    let info = list.sort_by(Some("value"));
    assert_eq!(info.order, SortOrder::Ascending);
}

#[test]
fn absent_values_sort_first_ascending_and_last_descending() {
    let mut items = vec![named("b").with("n", 2), named("none"), named("a").with("n", 1)];
    sort_items(&mut items, &[SortInfo::ascending("n")]);
    let names: Vec<String> = items.iter().map(|it| it.text("displayName")).collect();
    assert_eq!(names, ["none", "a", "b"]);

    sort_items(&mut items, &[SortInfo::descending("n")]);
    let names: Vec<String> = items.iter().map(|it| it.text("displayName")).collect();
    assert_eq!(names, ["b", "a", "none"]);
}

#[test]
fn mixed_kinds_fall_back_to_text_and_dates_compare_by_timestamp() {
    let a = Item::new().with("v", 10);
    let b = Item::new().with("v", "9");
    // "10" < "9" as text.
    assert_eq!(compare(&a, &b, &SortInfo::ascending("v")), Ordering::Less);

    let early = Item::new().with("v", Value::date(1_000));
    let late = Item::new().with("v", Value::date(20_000));
    assert_eq!(compare(&early, &late, &SortInfo::ascending("v")), Ordering::Less);

    let forced = SortInfo::ascending("v").with_value_type(ValueType::Date);
    let x = Item::new().with("v", 5);
    let y = Item::new().with("v", Value::date(7));
    assert_eq!(compare(&x, &y, &forced), Ordering::Less);

    let falsy = Item::new().with("v", false);
    let text = Item::new().with("v", "a");
    assert_eq!(compare(&falsy, &text, &SortInfo::ascending("v")), Ordering::Less);
}

#[test]
fn text_sorts_case_insensitively_with_lowercase_first_on_ties() {
    let mut items = vec![
        named("cherry"),
        named("Banana"),
        named("apple"),
        named("Apple"),
        named("banana"),
    ];
    sort_items(&mut items, &[SortInfo::ascending("displayName")]);
    let names: Vec<String> = items.iter().map(|it| it.text("displayName")).collect();
    assert_eq!(names, ["apple", "Apple", "banana", "Banana", "cherry"]);

    assert_eq!(compare_text("Zeta", "alpha"), Ordering::Greater);
    assert_eq!(compare_text("abc", "abc"), Ordering::Equal);
}

#[test]
fn lazy_and_derived_values_are_evaluated() {
    let mut items = vec![
        named("b").with("n", Value::lazy(|| Value::Int(3))),
        named("a").with("n", Value::lazy(|| Value::Int(1))),
    ];
    sort_items(&mut items, &[SortInfo::ascending("n")]);
    assert_eq!(items[0].text("displayName"), "a");

    let by_len = Accessor::derive(|item| {
        item.get("displayName")
            .and_then(Value::as_str)
            .map(|s| Value::Int(s.len() as i64))
    });
    let mut items = vec![named("ccc"), named("a"), named("bb")];
    sort_items(&mut items, &[SortInfo::descending(by_len)]);
    let names: Vec<String> = items.iter().map(|it| it.text("displayName")).collect();
    assert_eq!(names, ["ccc", "bb", "a"]);
}

#[test]
fn per_item_sort_field_overrides_descriptor() {
    let mut items = vec![
        named("b").with("rank", 1).with_sort_field("rank"),
        named("a").with("rank", 9),
    ];
    sort_items(&mut items, &[SortInfo::ascending("rank")]);
    assert_eq!(items[0].text("displayName"), "b");
}

#[test]
fn property_ascending_comparator_is_antisymmetric() {
    for seed in 0..16u64 {
        let mut rng = Lcg::new(seed);
        for _ in 0..200 {
            let mut a = Item::new();
            let mut b = Item::new();
            if let Some(v) = random_value(&mut rng) {
                a.set("k", v);
            }
            if let Some(v) = random_value(&mut rng) {
                b.set("k", v);
            }
            let info = SortInfo::ascending("k");
            assert_eq!(
                compare(&a, &b, &info),
                compare(&b, &a, &info).reverse(),
                "seed={seed} a={a:?} b={b:?}"
            );
        }
    }
}

fn tree_shape(items: &[Item]) -> Vec<(String, Vec<String>)> {
    let mut out = Vec::new();
    for item in items {
        let mut children: Vec<String> = item
            .children("items")
            .unwrap_or(&[])
            .iter()
            .map(|c| c.text("displayName"))
            .collect();
        children.sort();
        out.push((item.text("displayName"), children));
        out.extend(tree_shape(item.children("items").unwrap_or(&[])));
    }
    out.sort();
    out
}

#[test]
fn property_sorting_a_tree_preserves_shape() {
    for seed in 0..8u64 {
        let mut rng = Lcg::new(seed);
        let mut next = 0usize;
        let mut build = |rng: &mut Lcg| -> Vec<Item> {
            let mut level = Vec::new();
            for _ in 0..rng.gen_range_usize(1, 5) {
                next += 1;
                level.push(named(&format!("n{next}")).with("k", rng.gen_range_u64(0, 5) as i64));
            }
            level
        };

        let mut roots = build(&mut rng);
        for root in roots.iter_mut() {
            if rng.gen_bool() {
                let mut kids = build(&mut rng);
                if let Some(first) = kids.first_mut() {
                    let grandkids = build(&mut rng);
                    *first = first.clone().with_children("items", grandkids);
                }
                *root = root.clone().with_children("items", kids);
            }
        }

        let before = tree_shape(&roots);
        sort_tree(&mut roots, &[SortInfo::descending("k")], "items");
        assert_eq!(tree_shape(&roots), before, "seed={seed}");
        for pair in roots.windows(2) {
            assert_ne!(
                compare(&pair[0], &pair[1], &SortInfo::descending("k")),
                Ordering::Greater
            );
        }
    }
}

#[test]
fn find_next_match_wraps_and_skips_unselectable_rows() {
    let mut list = list_of(vec![
        named("apple"),
        named("avocado").with_selectable(false),
        named("banana"),
        named("apricot"),
    ]);
    let starts_a = |item: &Item, _: usize| item.text("displayName").starts_with('a');
    assert_eq!(list.find_next_match(starts_a, 1), Some(3));
    assert_eq!(list.find_next_match(starts_a, 4), Some(0));
    assert_eq!(list.find_next_match(|_, _| false, 0), None);
    assert_eq!(list.find_next_match(|_, i| i == 2, 3), Some(2));
}

#[test]
fn view_cache_follows_revision_and_query() {
    let mut list = list_of(sample_tree());
    assert!(!list.has_cache());
    list.view_list(None);
    assert!(list.has_cache());

    list.set_sort(vec![SortInfo::descending("displayName")]);
    assert!(!list.has_cache());
    list.current_view();
    assert!(list.has_cache());

    let q = Query::text("z");
    assert_eq!(list.view_list(Some(&q)).len(), 2);
    assert_eq!(list.query(), Some(&q));
    assert_eq!(list.current_view().len(), 2);

    list.invalidate_cache();
    assert!(!list.has_cache());
}

#[test]
fn plain_values_and_records_become_items() {
    let options = ItemListOptions::new().with_search_field("search");
    let item = options.item_from_value(42);
    assert_eq!(item.text("displayName"), "42");
    assert_eq!(item.get("value"), Some(&Value::Int(42)));
    assert_eq!(item.text("search"), "42");

    let mut list = ItemList::new(ItemListOptions::new().with_multi_select(true));
    list.set_values(["red", "green"]);
    assert_eq!(current_labels(&mut list), ["red", "green"]);

    let record = Item::new()
        .with("value", "k1")
        .with_children("items", vec![Item::new().with("displayName", "child")]);
    list.set_records(vec![record, Item::new().with("displayName", "solo")], true);
    assert_eq!(current_labels(&mut list), ["k1", "child", "solo"]);
    // Only leaves take the initial selection.
    assert_eq!(
        list.selected_values(),
        [Value::from("child"), Value::from("solo")]
    );
}

#[test]
fn bound_values_select_items_or_become_stand_ins() {
    let mut list = ItemList::new(ItemListOptions::new().with_multi_select(true));
    list.set_values(["a", "b", "c"]);
    let missing = list
        .select_values(&[Value::from("b"), Value::from("z, y")])
        .unwrap();
    assert_eq!(list.selected_values(), [Value::from("b")]);
    let texts: Vec<String> = missing.iter().map(|it| it.text("displayName")).collect();
    assert_eq!(texts, ["z", "y"]);
    assert!(missing.iter().all(|it| it.selected));
    assert_eq!(missing[1].get("value"), Some(&Value::from("y")));

    let mut single = ItemList::new(ItemListOptions::default());
    single.set_values(["a", "b"]);
    let missing = single
        .select_values(&[Value::from("q"), Value::from("b")])
        .unwrap();
    assert!(missing.is_empty());
    assert_eq!(single.selected_values(), [Value::from("b")]);

    let missing = single
        .select_values(&[Value::Int(7), Value::from("x")])
        .unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].text("displayName"), "7");
    assert!(single.selected_values().is_empty());
}

#[test]
fn item_size_hints_patch_cached_rows() {
    let mut list = list_of(sample_tree());
    list.current_view();
    let q = list.item_id_at(1).unwrap();
    assert!(list.set_item_size(q, Some(50)));
    assert!(list.has_cache());
    assert_eq!(list.row(1).unwrap().size, Some(50));
}

#[test]
fn empty_collection_yields_empty_view() {
    let mut list = ItemList::default();
    assert!(list.view_list(Some(&Query::text("x"))).is_empty());
    assert_eq!(list.current_view().depth_max(), 0);
    assert_eq!(list.find_next_match(|_, _| true, 0), None);
}

fn check_padding_invariant(v: &Viewport, w: &ViewportWindow) {
    let rendered: u64 = (w.start_index..w.end_index)
        .map(|i| v.row_size(i).unwrap() as u64)
        .sum();
    assert_eq!(
        w.padding_before + rendered + w.padding_after,
        v.total_size(),
        "window={w:?}"
    );
}

#[test]
fn property_viewport_padding_invariant_fixed_and_variable() {
    for seed in 0..32u64 {
        let mut rng = Lcg::new(seed);
        let mode = match rng.gen_range_u32(0, 3) {
            0 => ViewportMode::Fixed,
            1 => ViewportMode::Variable,
            _ => ViewportMode::Auto,
        };
        let row_height = rng.gen_range_u32(1, 40);
        let mut v = Viewport::new(ViewportOptions::new(mode).with_row_height(row_height));

        let rows: Vec<Item> = (0..rng.gen_range_usize(0, 200))
            .map(|i| {
                let item = named(&format!("r{i}"));
                if rng.gen_bool() {
                    item.with_size(rng.gen_range_u32(0, 80))
                } else {
                    item
                }
            })
            .collect();
        let mut list = list_of(rows);
        v.set_rows(list.current_view());

        for _ in 0..8 {
            let index = rng.gen_range_usize(0, v.count().max(1));
            v.measure(index, rng.gen_range_u32(0, 100));
        }

        for _ in 0..50 {
            let container = rng.gen_range_u32(0, 500);
            let offset = rng.gen_range_u64(0, v.total_size() + 200);
            v.set_geometry(container, offset);
            let w = v.window();
            check_padding_invariant(&v, &w);
            assert!(w.start_index <= w.end_index && w.end_index <= v.count());

            if !w.out_of_range && container > 0 && offset < v.total_size() {
                let covering = v.index_at_offset(offset).unwrap();
                assert!(w.contains(covering), "seed={seed} offset={offset} {w:?}");
            }
        }

        for offset in [u64::MAX, u64::MAX - 1, v.total_size().saturating_add(1)] {
            v.set_geometry(rng.gen_range_u32(1, 500), offset);
            let w = v.window();
            check_padding_invariant(&v, &w);
            assert!(w.out_of_range, "seed={seed} offset={offset} {w:?}");
            assert!(w.is_empty(), "seed={seed} offset={offset} {w:?}");
        }
    }
}

#[test]
fn row_sizes_follow_mode() {
    let rows = vec![named("a").with_size(10), named("b").with_size(60), named("c")];
    let mut list = list_of(rows);
    let mut v = Viewport::new(ViewportOptions::new(ViewportMode::Variable).with_row_height(30));
    v.set_rows(list.current_view());

    assert_eq!(v.total_size(), 10 + 60 + 30);
    v.measure(2, 45);
    assert!(v.is_measured(2));
    assert_eq!(v.row_size(2), Some(45));

    v.set_mode(ViewportMode::Auto);
    assert_eq!(v.total_size(), 30 + 60 + 45);

    v.set_mode(ViewportMode::Fixed);
    assert_eq!(v.total_size(), 90);

    v.set_mode(ViewportMode::Variable);
    v.clear_measurements();
    assert!(!v.is_measured(2));
    assert_eq!(v.row_size(2), Some(30));
    assert_eq!(v.row_start(2), Some(70));
    assert_eq!(v.row_size(3), None);
}

#[test]
fn variable_window_adds_one_row_of_slack() {
    let mut v = Viewport::new(ViewportOptions::new(ViewportMode::Variable).with_row_height(10));
    v.set_count(100);
    v.set_geometry(25, 0);

    let w = v.window();
    assert_eq!((w.start_index, w.end_index), (0, 4));
    assert_eq!(w.padding_after, 960);

    v.set_scroll_offset(15);
    let w = v.window();
    assert_eq!((w.start_index, w.end_index), (1, 5));
    assert_eq!(w.padding_before, 10);
}

#[test]
fn disabled_viewport_renders_everything() {
    let mut v = Viewport::new(ViewportOptions::default());
    v.set_count(40);
    v.set_geometry(100, 500);
    let w = v.window();
    assert_eq!((w.start_index, w.end_index), (0, 40));
    assert_eq!((w.padding_before, w.padding_after), (0, 0));
    assert_eq!(v.ensure_visible(39), None);
}

#[test]
fn max_size_caps_container() {
    let mut v = Viewport::new(
        ViewportOptions::new(ViewportMode::Fixed)
            .with_row_height(10)
            .with_max_size(Some(30)),
    );
    v.set_count(100);
    v.set_geometry(1000, 0);
    assert_eq!(v.container_size(), 30);
    assert_eq!(v.window().end_index, 4);

    v.set_max_size(None);
    assert_eq!(v.window().end_index, 100);
}

#[test]
fn ensure_visible_emits_scroll_position_once() {
    let mut v = Viewport::new(ViewportOptions::new(ViewportMode::Fixed).with_row_height(20));
    v.set_count(50);
    v.set_geometry(100, 0);

    assert_eq!(v.ensure_visible(2), None);
    assert_eq!(v.ensure_visible(10), Some(120));
    assert_eq!(v.scroll_offset(), 120);
    assert_eq!(v.window().scroll_pos, Some(120));
    assert_eq!(v.next_window().scroll_pos, Some(120));
    assert_eq!(v.window().scroll_pos, None);

    assert_eq!(v.ensure_visible(0), Some(0));
    assert_eq!(v.scroll_to_index_offset(49, Align::Start), 900);
    assert_eq!(v.scroll_to_index_offset(20, Align::Center), 360);
    assert_eq!(v.scroll_to_index(20, Align::End), 320);
}

#[test]
fn batch_update_coalesces_notifications() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut v = Viewport::new(
        ViewportOptions::new(ViewportMode::Fixed).with_on_change(Some(move |_: &Viewport| {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        })),
    );

    v.set_count(10);
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);

    v.batch_update(|v| {
        v.set_container_size(100);
        v.set_scroll_offset(40);
        v.set_row_height(20);
    });
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);

    v.set_scroll_offset(40);
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
}

#[test]
fn viewport_state_roundtrips() {
    let mut v = Viewport::new(ViewportOptions::new(ViewportMode::Variable));
    v.set_count(100);
    v.set_geometry(200, 330);
    let state = v.viewport_state();

    let mut restored = Viewport::new(ViewportOptions::default());
    restored.set_count(100);
    restored.restore_viewport_state(state);
    assert_eq!(restored.viewport_state(), state);
    assert_eq!(restored.window(), v.window());
}
