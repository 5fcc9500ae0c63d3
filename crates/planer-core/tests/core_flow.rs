use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use planer_core::commands::Session;
use planer_core::config::Config;
use planer_core::render::Renderer;
use planer_core::{Outcome, StoreEvent, Task, TaskStore};
use tempfile::NamedTempFile;

fn texts<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a str> {
    tasks.into_iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn wash_car_read_book_walkthrough() {
    let mut store = TaskStore::default();
    let wash = store.add_task("Wash car").expect("wash car added");
    let read = store.add_task("Read book").expect("read book added");
    assert_eq!(texts(store.active()), ["Wash car", "Read book"]);

    assert_eq!(store.complete_task(wash), Outcome::Applied);
    assert_eq!(texts(store.active()), ["Read book"]);
    assert_eq!(texts(store.completed()), ["Wash car"]);

    store.set_search_query("read");
    assert_eq!(texts(store.visible_tasks()), ["Read book"]);

    assert_eq!(store.delete_task(read), Outcome::Applied);
    assert!(store.active().is_empty());
    assert_eq!(texts(store.completed()), ["Wash car"]);

    assert_eq!(store.clear_completed(), 1);
    assert!(store.completed().is_empty());
}

#[test]
fn blank_input_never_creates_tasks() {
    let mut store = TaskStore::default();
    assert!(store.add_task("").is_none());
    assert!(store.add_task("   ").is_none());
    assert_eq!(store.active().len(), 0);
}

#[test]
fn category_keeps_position_and_skips_completed() {
    let mut store = TaskStore::default();
    let first = store.add_task("first").expect("added");
    let second = store.add_task("second").expect("added");
    let third = store.add_task("third").expect("added");

    assert!(store.assign_category(second, "Hobi").is_applied());
    assert_eq!(texts(store.active()), ["first", "second", "third"]);
    assert_eq!(store.active()[1].category(), Some("Hobi"));

    store.complete_task(third);
    assert_eq!(store.assign_category(third, "Hobi"), Outcome::NotFound);
    assert_eq!(store.completed()[0].category(), None);
    assert_eq!(store.active()[0].id, first);
}

#[test]
fn view_matches_every_query_against_active_set() {
    let mut store = TaskStore::default();
    for text in ["Wash car", "Read book", "read MAIL", "Car wash", "Ručak"] {
        store.add_task(text);
    }

    for query in ["", "car", "READ", "a", "ruč", "nothing", " "] {
        let needle = query.to_lowercase();
        let expected: Vec<&str> = store
            .active()
            .iter()
            .filter(|t| t.text.to_lowercase().contains(&needle))
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts(store.active_view(query)), expected, "query {query:?}");
    }

    assert_eq!(texts(store.active_view("")), texts(store.active()));
}

#[test]
fn counts_track_adds_deletes_and_clears() {
    let mut store = TaskStore::default();
    let ids: Vec<_> = (0..6)
        .filter_map(|n| store.add_task(&format!("task {n}")))
        .collect();

    store.complete_task(ids[0]);
    store.complete_task(ids[1]);
    store.delete_task(ids[2]);
    store.delete_task(ids[0]);
    assert_eq!(store.active().len() + store.completed().len(), 6 - 1);

    store.clear_completed();
    assert_eq!(store.active().len() + store.completed().len(), 6 - 1 - 2);

    for task in store.active() {
        assert!(!store.completed().iter().any(|c| c.id == task.id));
    }
}

#[test]
fn observer_drives_redraws() {
    let mut store = TaskStore::default();
    let redraws = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&redraws);
    store.on_change(move |event| sink.borrow_mut().push(event.clone()));

    let id = store.add_task("Wash car").expect("added");
    let option = store
        .category_options(id)
        .into_iter()
        .find(|o| o.label() == "Faks")
        .expect("faks option");
    assert_eq!(option.commit(&mut store), Outcome::Applied);
    store.delete_task(id);
    store.delete_task(id);

    assert_eq!(
        *redraws.borrow(),
        vec![
            StoreEvent::Added { id },
            StoreEvent::Categorized {
                id,
                category: "Faks".to_string()
            },
            StoreEvent::Deleted { id },
        ]
    );
}

#[test]
fn shell_session_uses_configured_categories() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "categories = Posao, Kuca\ncolor = off\ntitle = Moj planer").expect("write rc");

    let cfg = Config::load(Some(file.path())).expect("load config");
    let renderer = Renderer::new(&cfg);
    let mut session = Session::new(TaskStore::new(cfg.category_registry()), renderer);

    let mut out = Vec::new();
    for line in ["add Kupi hleb", "category 1 2", "add Operi sudove", "done 2", "list"] {
        session.execute(line, &mut out).expect("command runs");
    }

    let text = String::from_utf8(out).expect("utf8 output");
    assert!(text.contains("Moj planer"));
    assert_eq!(session.store().active()[0].category(), Some("Kuca"));
    assert_eq!(texts(session.store().completed()), ["Operi sudove"]);
}
