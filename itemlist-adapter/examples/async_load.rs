use std::cell::RefCell;

use futures::stream;
use itemlist::{Item, ItemListOptions, ViewportMode, ViewportOptions};
use itemlist_adapter::{Interceptors, ListController, NavKey, load_item_stream, load_items, select};

fn page(from: usize, to: usize) -> Vec<Item> {
    (from..to)
        .map(|i| {
            Item::new()
                .with("displayName", format!("Record {i:04}"))
                .with("value", i as i64)
        })
        .collect()
}

fn main() {
    // Example: a controller fed by async providers, with an interceptor guarding selection.
    //
    // An adapter would:
    // - await providers on its executor and render `window()` / `visible_rows()` afterwards
    // - forward resize, scroll and key events
    // - call tick(now_ms) from a timer so debounced filter input gets applied
    let ctrl = RefCell::new(ListController::new(
        ItemListOptions::default(),
        ViewportOptions::new(ViewportMode::Fixed).with_row_height(18),
    ));
    {
        let mut c = ctrl.borrow_mut();
        c.on_resize(180);
        c.set_interceptors(Interceptors::new().with_before_select(|_, item: &Item| {
            let locked = item.get("value").and_then(|v| v.as_f64()) == Some(0.0);
            async move {
                if locked {
                    Err("record 0 is read-only".to_string())
                } else {
                    Ok(())
                }
            }
        }));
    }

    let loaded = pollster::block_on(load_items(&ctrl, async {
        Ok::<_, String>(page(0, 500))
    }));
    println!("loaded={loaded:?} rows={}", ctrl.borrow().viewport().count());

    let chunks = [page(0, 100), page(100, 200), page(200, 300)].map(Ok::<_, String>);
    let chunks = stream::iter(chunks);
    let streamed = pollster::block_on(load_item_stream(&ctrl, chunks));
    println!("streamed={streamed:?} rows={}", ctrl.borrow().viewport().count());

    println!("select 0: {:?}", pollster::block_on(select(&ctrl, 0, true)));
    println!("select 1: {:?}", pollster::block_on(select(&ctrl, 1, true)));

    let mut c = ctrl.borrow_mut();
    c.navigate(NavKey::End);
    println!("active={:?} window={:?}", c.active(), c.window());

    c.on_filter_input("02", 0);
    c.tick(1_000);
    let names: Vec<String> = c
        .visible_rows()
        .iter()
        .filter_map(|row| row.item_id())
        .collect::<Vec<_>>()
        .into_iter()
        .map(|id| c.list().text_of(id))
        .collect();
    println!("filtered window: {names:?}");
}
