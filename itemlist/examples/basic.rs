// Example: a small tree, sorted and filtered, rendered through a fixed-height viewport.
use itemlist::{
    Align, Item, ItemList, ItemListOptions, Query, RowKind, SortInfo, Viewport, ViewportMode,
    ViewportOptions,
};

fn main() {
    let mut list = ItemList::new(ItemListOptions::new().with_multi_select(true));
    let team = |name: &str, members: &[&str]| {
        let children = members
            .iter()
            .map(|m| Item::new().with("displayName", *m))
            .collect();
        Item::new()
            .with("displayName", name)
            .with_children("items", children)
    };
    list.set_items(vec![
        team("Platform", &["Wren", "Avery", "Sol"]),
        team("Design", &["Kit", "Blair"]),
        team("Data", &["Rowan", "Ash", "Quinn", "Eden"]),
    ]);
    list.set_sort(vec![SortInfo::ascending("displayName")]);

    let mut viewport = Viewport::new(ViewportOptions::new(ViewportMode::Fixed).with_row_height(24));
    viewport.set_rows(list.view_list(None));
    viewport.set_container_size(96);

    let off = viewport.scroll_to_index(8, Align::Center);
    let w = viewport.next_window();
    println!("total_size={} offset={off} window={w:?}", viewport.total_size());

    let view = list.current_view().clone();
    for row in &view.rows()[w.start_index..w.end_index] {
        if let RowKind::Item(id) = row.kind {
            println!("{}{}", "  ".repeat(row.depth), list.text_of(id));
        }
    }

    let matches = list.view_list(Some(&Query::text("as"))).len();
    println!("rows matching \"as\" (with ancestors): {matches}");
}
