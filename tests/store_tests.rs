// tests/store_tests.rs
// Bot / post / memory persistence, including cascade deletes.

use rusqlite::Connection;
use tempfile::TempDir;

use botsim_analyzer::AnalyzerConfig;
use botsim_analyzer::services::store::{DEFAULT_MODEL, Store};

fn store() -> Store {
    Store::open_in_memory().expect("open in-memory store")
}

#[test]
fn create_and_find_bot() {
    let s = store();
    let id = s.create_bot("DataBot", "A bot for testing data.", None).unwrap();

    let bot = s.find_bot_by_name("DataBot").unwrap().expect("bot exists");
    assert_eq!(bot.id, id);
    assert_eq!(bot.persona, "A bot for testing data.");
    assert_eq!(bot.model, DEFAULT_MODEL);
    assert_eq!(s.get_bot(id).unwrap(), Some(bot));
    assert!(s.find_bot_by_name("Nobody").unwrap().is_none());
}

#[test]
fn bot_names_are_unique() {
    let s = store();
    s.create_bot("Dan", "first", None).unwrap();
    assert!(s.create_bot("Dan", "second", None).is_err());
}

#[test]
fn update_bot_fields() {
    let s = store();
    let id = s.create_bot("Dan", "curious", Some("gemini-2.5-flash")).unwrap();

    assert!(s.update_bot(id, "Daniel", "grumpy", "gemini-2.5-pro").unwrap());
    let bot = s.get_bot(id).unwrap().unwrap();
    assert_eq!(bot.name, "Daniel");
    assert_eq!(bot.persona, "grumpy");
    assert_eq!(bot.model, "gemini-2.5-pro");

    assert!(!s.update_bot(9999, "x", "y", "z").unwrap());
}

#[test]
fn posts_and_memories_link_to_bot() {
    let s = store();
    let bot = s.create_bot("PostBot", "A bot that posts.", None).unwrap();
    s.add_post(Some(bot), Some("PostBot"), "This is a test post.").unwrap();
    s.add_post(None, Some("SYSTEM"), "[SYSTEM] topic injected").unwrap();
    s.add_memory(bot, "test_key", "test_value").unwrap();

    let posts = s.posts_for_bot(bot).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].content, "This is a test post.");
    assert_eq!(posts[0].bot_id, Some(bot));

    let recent = s.recent_posts(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].sender.as_deref(), Some("SYSTEM"));
    assert_eq!(recent[0].bot_id, None);

    let mems = s.memories_for_bot(bot).unwrap();
    assert_eq!(mems.len(), 1);
    assert_eq!(mems[0].key, "test_key");
    assert_eq!(mems[0].value, "test_value");
}

#[test]
fn memory_requires_existing_bot() {
    let s = store();
    assert!(s.add_memory(42, "k", "v").is_err());
}

#[test]
fn clear_posts_keeps_bots_and_memories() {
    let s = store();
    let bot = s.create_bot("ClearBot", "A bot for clearing.", None).unwrap();
    s.add_post(Some(bot), None, "Post 1").unwrap();
    s.add_post(Some(bot), None, "Post 2").unwrap();
    s.add_memory(bot, "k", "v").unwrap();
    assert_eq!(s.count_posts().unwrap(), 2);

    assert_eq!(s.clear_posts().unwrap(), 2);
    assert_eq!(s.count_posts().unwrap(), 0);
    assert_eq!(s.list_bots().unwrap().len(), 1);
    assert_eq!(s.count_memories().unwrap(), 1);
}

#[test]
fn deleting_bot_cascades() {
    let s = store();
    let bot = s.create_bot("CascadeBot", "A bot for cascading.", None).unwrap();
    let other = s.create_bot("Bystander", "Stays.", None).unwrap();
    s.add_post(Some(bot), None, "Cascade post.").unwrap();
    s.add_post(Some(other), None, "Unrelated.").unwrap();
    s.add_memory(bot, "cascade_key", "cascade_value").unwrap();

    assert!(s.delete_bot(bot).unwrap());

    assert!(s.get_bot(bot).unwrap().is_none());
    assert_eq!(s.list_bots().unwrap().len(), 1);
    assert_eq!(s.count_posts().unwrap(), 1);
    assert_eq!(s.count_memories().unwrap(), 0);
    assert!(!s.delete_bot(bot).unwrap());
}

#[test]
fn file_store_persists_across_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("bots.db");

    let s = Store::open(&path).unwrap();
    let id = s.create_bot("Dan", "persists", None).unwrap();
    s.add_post(Some(id), Some("Dan"), "hello").unwrap();
    s.close().unwrap();

    let reopened = Store::open(&path).unwrap();
    assert_eq!(reopened.find_bot_by_name("Dan").unwrap().map(|b| b.id), Some(id));
    assert_eq!(reopened.count_posts().unwrap(), 1);
    reopened.close().unwrap();

    // schema is plain SQLite; foreign keys declared with cascade
    let conn = Connection::open(&path).unwrap();
    let fk_sql: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type='table' AND name='memories'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert!(fk_sql.contains("ON DELETE CASCADE"));
}

#[test]
fn open_default_uses_configured_path() {
    let tmp = TempDir::new().unwrap();
    let cfg = AnalyzerConfig::load(tmp.path()).unwrap();

    let s = Store::open_default(&cfg).unwrap();
    s.create_bot("Dan", "configured", None).unwrap();
    s.close().unwrap();

    assert!(tmp.path().join("bots.db").exists());
}
