use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get},
};
use serde::Deserialize;

use crate::todo::{Title, TitleError, Todo, TodoStore};
use crate::web::htmx::{FragmentOrRedirect, HtmxConfig, HxRequest};

/// Submitted form fields in arrival order, repeated keys included.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct CreateTodoForm {
    fields: Vec<(String, String)>,
}

impl CreateTodoForm {
    /// The last submitted `title` value. A missing field is reported as an
    /// empty title, not as a rejected form.
    pub fn into_title(self) -> String {
        self.fields
            .into_iter()
            .rev()
            .find(|(name, _)| name == "title")
            .map(|(_, value)| value)
            .unwrap_or_default()
    }
}

/// Custom error type for todo handler operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// The submitted title failed validation.
    #[error("Invalid title: {0}")]
    Validation(#[from] TitleError),
    /// The request body could not be read as a url-encoded form.
    #[error("Invalid form submission")]
    Form(#[from] FormRejection),
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    /// The htmx client configuration could not be serialized.
    #[error("htmx configuration serialization failed")]
    HtmxConfig(#[from] serde_json::Error),
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let (status_code, user_facing_error_message) = match &self {
            TodoError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            TodoError::Form(rejection) => {
                tracing::debug!(%rejection, "Rejected todo form");
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            _ => {
                tracing::error!("Failed to handle todo request: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later."
                        .to_string(),
                )
            }
        };

        let error_template = ErrorMessageTemplate::new(user_facing_error_message);
        let Ok(rendered) = error_template.render() else {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };

        (status_code, Html(rendered)).into_response()
    }
}

#[derive(Template)]
#[template(path = "todos.html")]
struct TodosPageTemplate {
    todos: Vec<Todo>,
    htmx_config: String,
    reset_title_input: bool,
}

impl TodosPageTemplate {
    pub fn new(todos: Vec<Todo>, htmx_config: String) -> Self {
        Self {
            todos,
            htmx_config,
            reset_title_input: false,
        }
    }
}

#[derive(Template)]
#[template(path = "todos/todo_list.html")]
struct TodoListTemplate {
    todos: Vec<Todo>,
}

impl TodoListTemplate {
    pub fn new(todos: Vec<Todo>) -> Self {
        Self { todos }
    }
}

#[derive(Template)]
#[template(path = "todos/todo_item.html")]
struct TodoItemTemplate {
    todo: Todo,
}

impl TodoItemTemplate {
    pub fn new(todo: Todo) -> Self {
        Self { todo }
    }
}

/// The title input. With `reset_title_input` set it is rendered empty and
/// marked for an out-of-band swap, which clears the form after a submission.
#[derive(Template)]
#[template(path = "todos/title_input.html")]
struct TitleInputTemplate {
    reset_title_input: bool,
}

impl TitleInputTemplate {
    pub fn out_of_band_reset() -> Self {
        Self {
            reset_title_input: true,
        }
    }
}

#[derive(Template)]
#[template(path = "todos/error_message.html")]
struct ErrorMessageTemplate {
    message: String,
}

impl ErrorMessageTemplate {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

/// Renders the fragment answering an htmx submission: the new row followed by
/// an out-of-band reset of the title input.
fn render_created_fragment(todo: Todo) -> Result<String, askama::Error> {
    let row_html = TodoItemTemplate::new(todo).render()?;
    let input_html = TitleInputTemplate::out_of_band_reset().render()?;
    Ok(format!("{row_html}\n{input_html}"))
}

/// Handler for GET / that renders the full page.
#[tracing::instrument(skip(store))]
async fn todos_page_handler(State(store): State<TodoStore>) -> Result<Html<String>, TodoError> {
    let htmx_config = HtmxConfig::default().to_json()?;
    let template = TodosPageTemplate::new(store.list().await, htmx_config);
    template.render().map(Html).map_err(TodoError::from)
}

/// Handler for GET /todos that returns just the list fragment.
#[tracing::instrument(skip(store))]
async fn todo_list_handler(State(store): State<TodoStore>) -> Result<Html<String>, TodoError> {
    let template = TodoListTemplate::new(store.list().await);
    template.render().map(Html).map_err(TodoError::from)
}

/// Handler for creating a todo via POST request.
#[tracing::instrument(skip(store))]
async fn create_todo_handler(
    State(store): State<TodoStore>,
    HxRequest(is_hx_request): HxRequest,
    form: Result<Form<CreateTodoForm>, FormRejection>,
) -> Result<FragmentOrRedirect, TodoError> {
    let Form(form) = form?;
    let title = Title::parse(form.into_title())?;
    let todo = store.append(title).await;
    tracing::info!(id = todo.id(), "Created todo");

    FragmentOrRedirect::choose(is_hx_request, || render_created_fragment(todo))
        .map_err(TodoError::from)
}

/// Handler for deleting a todo via DELETE request.
///
/// Unknown ids get the same response as a successful delete. For htmx the
/// empty fragment replaces the row, removing it from the page.
#[tracing::instrument(skip(store))]
async fn delete_todo_handler(
    State(store): State<TodoStore>,
    HxRequest(is_hx_request): HxRequest,
    Path(id): Path<String>,
) -> FragmentOrRedirect {
    if store.remove(&id).await {
        tracing::info!(id = %id, "Deleted todo");
    } else {
        tracing::debug!(id = %id, "No todo to delete");
    }

    FragmentOrRedirect::empty(is_hx_request)
}

/// Creates and returns the todo router with all todo-related routes.
pub fn create_todo_router(store: TodoStore) -> Router {
    Router::new()
        .route("/", get(todos_page_handler))
        .route("/todos", get(todo_list_handler).post(create_todo_handler))
        .route("/todos/{id}", delete(delete_todo_handler))
        .with_state(store)
}
