// Example: grouped rows with measured heights in a variable-size viewport.
use itemlist::{
    GroupInfo, Item, ItemList, ItemListOptions, RowKind, Viewport, ViewportMode, ViewportOptions,
};

fn main() {
    let mut list = ItemList::new(ItemListOptions::default());
    let items = (0..40)
        .map(|i| {
            Item::new()
                .with("displayName", format!("Ticket #{i}"))
                .with("status", ["open", "blocked", "done"][i % 3])
                .with("priority", (i % 5) as i64)
        })
        .collect();
    list.set_items(items);
    list.group(vec![GroupInfo::new("status")]);

    let mut viewport =
        Viewport::new(ViewportOptions::new(ViewportMode::Variable).with_row_height(20));
    viewport.set_rows(list.current_view());
    viewport.set_geometry(200, 0);

    // Headers render taller than tickets.
    let view = list.current_view().clone();
    viewport.batch_update(|v| {
        for (i, row) in view.iter().enumerate() {
            if row.is_group() {
                v.measure(i, 32);
            }
        }
    });

    let w = viewport.window();
    println!("total_size={} window={w:?}", viewport.total_size());
    for row in &view.rows()[w.start_index..w.end_index] {
        match &row.kind {
            RowKind::Group(h) => println!("[{}] ({})", h.key, h.count),
            RowKind::Item(id) => println!("  {}", list.text_of(*id)),
        }
    }

    // Collapse the first group and re-window.
    list.toggle_collapse(0, true).ok();
    viewport.set_rows(list.current_view());
    println!("rows after collapse={}", viewport.count());
}
