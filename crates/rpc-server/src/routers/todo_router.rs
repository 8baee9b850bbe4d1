use super::{ByIdInput, UpdateInput};
use crate::model::{todo_create_schema, todo_schema, TodoCreate, TodoId, TodoPatch};
use crate::todo_service::TodoService;
use rpc_framework::schema::Schema;
use rpc_framework::{ActorClient, Context, Procedure, Router};

/// Alias the todo procedures are mounted under.
pub const TODO_ALIAS: &str = "todo";

pub fn todo_router(todos: TodoService) -> Router {
    Router::with_alias(TODO_ALIAS)
        .procedure(get_todo_by_id(todos.clone()))
        .procedure(get_all_todos(todos.clone()))
        .procedure(create_todo(todos.clone()))
        .procedure(update_todo(todos.clone()))
        .procedure(delete_todo(todos))
}

fn by_id_schema() -> Schema {
    Schema::object().required("id", Schema::string()).into()
}

fn get_todo_by_id(todos: TodoService) -> Procedure {
    Procedure::query("getTodoById")
        .input(by_id_schema())
        .output(todo_schema())
        .handler(move |_: Context, input: ByIdInput<TodoId>| {
            let todos = todos.clone();
            async move { todos.get_by_id(input.id).await }
        })
}

fn get_all_todos(todos: TodoService) -> Procedure {
    Procedure::query("getAllTodos")
        .output(Schema::array(todo_schema()))
        .handler(move |_: Context, (): ()| {
            let todos = todos.clone();
            async move { todos.get_all().await }
        })
}

fn create_todo(todos: TodoService) -> Procedure {
    Procedure::mutation("createTodo")
        .input(todo_create_schema())
        .output(todo_schema())
        .handler(move |_: Context, params: TodoCreate| {
            let todos = todos.clone();
            async move { todos.create(params).await }
        })
}

fn update_todo(todos: TodoService) -> Procedure {
    Procedure::mutation("updateTodo")
        .input(
            Schema::object()
                .required("id", Schema::string())
                .required("data", todo_create_schema().partial()),
        )
        .output(todo_schema())
        .handler(move |_: Context, input: UpdateInput<TodoId, TodoPatch>| {
            let todos = todos.clone();
            async move { todos.update(input.id, input.data).await }
        })
}

fn delete_todo(todos: TodoService) -> Procedure {
    Procedure::mutation("deleteTodo")
        .input(by_id_schema())
        .output(Schema::boolean())
        .handler(move |_: Context, input: ByIdInput<TodoId>| {
            let todos = todos.clone();
            async move { todos.delete(input.id).await }
        })
}
