use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod web;

/// Maximum title length, in UTF-16 code units like the browser's `maxlength`.
pub const MAX_TITLE_LEN: usize = 100;

/// A validated todo title, between 1 and [`MAX_TITLE_LEN`] UTF-16 code units.
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Title(String);

impl Title {
    /// Validates a raw title. Length is counted in UTF-16 code units, so a
    /// character outside the BMP counts twice, matching the `maxlength` of
    /// the title input. Surrounding whitespace is kept as submitted.
    pub fn parse(raw: String) -> Result<Self, TitleError> {
        let actual = raw.encode_utf16().count();
        if actual == 0 {
            return Err(TitleError::Empty);
        }
        if actual > MAX_TITLE_LEN {
            return Err(TitleError::TooLong {
                max: MAX_TITLE_LEN,
                actual,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for title validation.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TitleError {
    /// The title was missing or empty.
    #[error("Title must not be empty")]
    Empty,
    /// The title exceeded the maximum length. Both lengths are in UTF-16
    /// code units.
    #[error("Title must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Todo {
    id: String,
    title: Title,
}

impl Todo {
    pub fn new(id: String, title: Title) -> Self {
        Self { id, title }
    }

    /// Returns the opaque identifier of the todo.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }
}

/// In-memory, insertion-ordered todo list.
///
/// Cloning is cheap and every clone shares the same list. Each operation holds
/// the lock for its own synchronous window only, so mutations are applied one
/// at a time in arrival order.
#[derive(Clone, Debug, Default)]
pub struct TodoStore {
    todos: Arc<RwLock<Vec<Todo>>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all todos in insertion order.
    pub async fn list(&self) -> Vec<Todo> {
        self.todos.read().await.clone()
    }

    /// Appends a new todo with a freshly generated id and returns it.
    #[tracing::instrument(skip(self))]
    pub async fn append(&self, title: Title) -> Todo {
        let todo = Todo::new(uuid::Uuid::new_v4().to_string(), title);
        self.todos.write().await.push(todo.clone());
        todo
    }

    /// Removes the first todo with the given id.
    ///
    /// Returns `false` when no todo matched; the list is left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> bool {
        let mut todos = self.todos.write().await;
        match todos.iter().position(|todo| todo.id == id) {
            Some(index) => {
                todos.remove(index);
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.todos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.todos.read().await.is_empty()
    }
}
