//! Users API endpoints

use api_types::user::{Role as ApiRole, UserCreated, UserNew, UserView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{Role, User};

fn map_role(role: Role) -> ApiRole {
    match role {
        Role::Admin => ApiRole::Admin,
        Role::Operator => ApiRole::Operator,
    }
}

fn draft_role(role: ApiRole) -> Role {
    match role {
        ApiRole::Admin => Role::Admin,
        ApiRole::Operator => Role::Operator,
    }
}

pub(crate) fn map_user(user: &User) -> UserView {
    UserView {
        id: user.id.clone(),
        login: user.login.clone(),
        password: user.password.clone(),
        role: map_role(user.role),
        name: user.name.clone(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    let mut engine = state.engine.write().await;
    let user = engine.create_user(
        &payload.login,
        &payload.password,
        draft_role(payload.role),
        &payload.name,
    )?;

    Ok((StatusCode::CREATED, Json(UserCreated { id: user.id })))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.delete_user(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
