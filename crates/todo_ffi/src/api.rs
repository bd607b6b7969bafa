//! FFI use-case API for the Flutter list screen.
//!
//! # Responsibility
//! - Forward list-screen intents (submit, tap checkbox, delete, delete all)
//!   to the core item store.
//! - Return the newest-first list plus the ready flag after every call.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One process-wide store instance backs every call.
//! - Storage faults degrade to an in-memory list; calls keep working.

use log::{error, warn};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::{Arc, Mutex};
use todo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    resolve_db_path, InitOutcome, Item, ItemCollection, ItemId, ItemStore, KeyValueStore,
    MemoryKeyValueStore, SqliteKeyValueStore, StoreConfig,
};

/// Input surface cap on submitted item text, in characters.
const ENTRY_TEXT_MAX_CHARS: usize = 30;

static STORE: OnceCell<Mutex<ItemStore>> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the rendered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItemView {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
}

/// List envelope returned by every list-screen call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    /// Whether the call reached the store.
    pub ok: bool,
    /// False until the first load finished; the UI shows a spinner meanwhile.
    pub ready: bool,
    /// Items ordered newest first.
    pub items: Vec<TodoItemView>,
    /// Human-readable diagnostics message.
    pub message: String,
}

impl TodoListResponse {
    fn from_items(ready: bool, items: &ItemCollection, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            ready,
            items: items.newest_first().into_iter().map(to_item_view).collect(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            ready: false,
            items: Vec::new(),
            message: message.into(),
        }
    }
}

/// Returns the list after the first storage load, with load diagnostics.
///
/// # FFI contract
/// - Sync call; storage is read only by the first call into this API.
/// - Later calls never replace the in-memory list with stored state.
/// - A storage or decode fault yields an empty, ready list and a message.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_load() -> TodoListResponse {
    respond("todo_load", |store| {
        let items = store.snapshot();
        let message = match store.init_outcome() {
            InitOutcome::Degraded(fault) => format!("Previous items unavailable ({fault})."),
            _ => format!("Loaded {} item(s).", items.len()),
        };
        (items, message)
    })
}

/// Returns the current list without touching storage.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_list() -> TodoListResponse {
    respond("todo_list", |store| (store.snapshot(), String::new()))
}

/// Adds an item from submitted input text; blank input is ignored.
///
/// Text is trimmed and capped at 30 characters, matching the input field.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_add(text: String) -> TodoListResponse {
    let text = normalize_entry_text(&text);
    respond("todo_add", |store| {
        let before = store.snapshot().len();
        let items = store.add(&text);
        let message = if items.len() > before {
            "Item added."
        } else {
            "Nothing to add."
        };
        (items, message.to_string())
    })
}

/// Deletes one item by id; unknown ids are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_delete(id: String) -> TodoListResponse {
    respond("todo_delete", |store| {
        (store.delete(&ItemId::from(id.trim())), String::new())
    })
}

/// Marks one item completed (`true`) or open (`false`).
#[flutter_rust_bridge::frb(sync)]
pub fn todo_set_completed(id: String, value: bool) -> TodoListResponse {
    respond("todo_set_completed", |store| {
        (
            store.set_completed(&ItemId::from(id.trim()), value),
            String::new(),
        )
    })
}

/// Deletes every item and the persisted slot.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_clear() -> TodoListResponse {
    respond("todo_clear", |store| (store.clear(), "All items deleted.".to_string()))
}

fn respond(
    operation: &'static str,
    f: impl FnOnce(&mut ItemStore) -> (ItemCollection, String),
) -> TodoListResponse {
    match with_store(|store| {
        let (items, message) = f(store);
        TodoListResponse::from_items(store.is_ready(), &items, message)
    }) {
        Ok(response) => response,
        Err(err) => {
            error!("event=ffi_call module=ffi status=error op={operation} error={err}");
            TodoListResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

fn normalize_entry_text(text: &str) -> String {
    text.trim()
        .chars()
        .take(ENTRY_TEXT_MAX_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn with_store<T>(f: impl FnOnce(&mut ItemStore) -> T) -> Result<T, String> {
    let store = STORE.get_or_try_init(|| open_store(&resolve_db_path()))?;
    let mut guard = store
        .lock()
        .map_err(|_| "item store lock poisoned".to_string())?;
    if !guard.is_ready() {
        guard.initialize();
    }
    Ok(f(&mut guard))
}

fn open_store(db_path: &Path) -> Result<Mutex<ItemStore>, String> {
    let storage: Arc<dyn KeyValueStore> = match SqliteKeyValueStore::open(db_path) {
        Ok(storage) => Arc::new(storage),
        Err(err) => {
            warn!(
                "event=ffi_store_open module=ffi status=degraded error_code=storage_unavailable error={err}"
            );
            Arc::new(MemoryKeyValueStore::new())
        }
    };
    let store = ItemStore::new(storage, StoreConfig::default())
        .map_err(|err| format!("item store init failed: {err}"))?;
    Ok(Mutex::new(store))
}

fn to_item_view(item: &Item) -> TodoItemView {
    TodoItemView {
        id: item.id.to_string(),
        text: item.text.clone(),
        is_completed: item.is_completed,
        created_at_ms: item.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, normalize_entry_text, open_store, ping, todo_add,
        todo_clear, todo_delete, todo_list, todo_load, todo_set_completed, STORE,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn entry_text_is_trimmed_and_capped_at_input_length() {
        assert_eq!(normalize_entry_text("  Buy milk \n"), "Buy milk");
        assert_eq!(normalize_entry_text(&"a".repeat(40)).chars().count(), 30);
        assert_eq!(normalize_entry_text(&"é".repeat(31)), "é".repeat(30));
    }

    // One test drives the shared store so no parallel test can clear it midway.
    #[test]
    fn list_screen_flow_over_shared_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir.path().join("todo.sqlite3")).unwrap();
        assert!(
            STORE.set(store).is_ok(),
            "shared store must be opened by this test only"
        );

        let loaded = todo_load();
        assert!(loaded.ok, "{}", loaded.message);
        assert!(loaded.ready);

        let milk = unique_token("milk");
        let mom = unique_token("mom");

        let blank = todo_add("   ".to_string());
        assert!(blank.ok);
        assert_eq!(blank.message, "Nothing to add.");

        todo_add(milk.clone());
        let added = todo_add(format!("  {mom}  "));
        assert!(added.ok, "{}", added.message);
        assert_eq!(added.items[0].text, mom);
        assert_eq!(added.items[1].text, milk);

        let milk_id = added.items[1].id.clone();
        let toggled = todo_set_completed(milk_id.clone(), true);
        let milk_row = toggled.items.iter().find(|item| item.id == milk_id).unwrap();
        assert!(milk_row.is_completed);

        let mom_id = added.items[0].id.clone();
        let deleted = todo_delete(mom_id.clone());
        assert!(deleted.items.iter().all(|item| item.id != mom_id));
        assert_eq!(todo_delete(mom_id).items.len(), deleted.items.len());

        let long = todo_add(format!("{}{}", "x".repeat(40), mom));
        assert_eq!(long.items[0].text, "x".repeat(30));
        assert_eq!(todo_load().items, long.items);

        let cleared = todo_clear();
        assert!(cleared.ok);
        assert!(cleared.items.is_empty());
        assert!(todo_list().items.is_empty());
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
