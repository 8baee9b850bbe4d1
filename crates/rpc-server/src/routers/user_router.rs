use super::{ByIdInput, UpdateInput};
use crate::model::{user_create_schema, user_schema, UserCreate, UserId, UserPatch};
use crate::user_service::UserService;
use rpc_framework::schema::Schema;
use rpc_framework::{ActorClient, Context, Procedure, Router};

pub fn user_router(users: UserService) -> Router {
    Router::new()
        .procedure(get_users(users.clone()))
        .procedure(get_user_by_id(users.clone()))
        .procedure(create_user(users.clone()))
        .procedure(update_user(users.clone()))
        .procedure(delete_user(users))
}

fn get_users(users: UserService) -> Procedure {
    Procedure::query("getUsers")
        .output(Schema::array(user_schema()))
        .handler(move |_: Context, (): ()| {
            let users = users.clone();
            async move { users.get_all().await }
        })
}

fn get_user_by_id(users: UserService) -> Procedure {
    Procedure::query("getUserById")
        .input(Schema::string())
        .output(user_schema())
        .handler(move |_: Context, id: UserId| {
            let users = users.clone();
            async move { users.get_by_id(id).await }
        })
}

fn create_user(users: UserService) -> Procedure {
    Procedure::mutation("createUser")
        .input(user_create_schema())
        .output(user_schema())
        .handler(move |_: Context, params: UserCreate| {
            let users = users.clone();
            async move { users.create(params).await }
        })
}

fn update_user(users: UserService) -> Procedure {
    Procedure::mutation("updateUser")
        .input(
            Schema::object()
                .required("id", Schema::string())
                .required("data", user_create_schema().partial()),
        )
        .output(user_schema())
        .handler(move |_: Context, input: UpdateInput<UserId, UserPatch>| {
            let users = users.clone();
            async move { users.update(input.id, input.data).await }
        })
}

fn delete_user(users: UserService) -> Procedure {
    Procedure::mutation("deleteUser")
        .input(Schema::object().required("id", Schema::string()))
        .output(Schema::boolean())
        .handler(move |_: Context, input: ByIdInput<UserId>| {
            let users = users.clone();
            async move { users.delete(input.id).await }
        })
}

