use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, SharedEngine, run, run_with_listener, spawn_with_listener};

mod assets;
mod movements;
mod reports;
mod server;
mod snapshot;
mod users;

pub mod types {
    pub mod movement {
        pub use api_types::movement::{
            MovementCreated, MovementKind, MovementListResponse, MovementNew, MovementUpdate,
            MovementView,
        };
    }

    pub mod asset {
        pub use api_types::asset::{
            AssetCreated, AssetKind, AssetNew, AssetUpdate, AssetView, MeterMode,
        };
    }

    pub mod user {
        pub use api_types::user::{Role, UserCreated, UserNew, UserView};
    }

    pub mod report {
        pub use api_types::report::{
            AnomalyKind, AssetReportView, EfficiencyView, FleetReport, RowPerformanceView,
            TankStatusView, TotalsView, WindowUsageView,
        };
    }

    pub mod data {
        pub use api_types::data::DataResponse;
    }

    pub mod snapshot {
        pub use engine::Snapshot;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Serialization(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidQuantity(_)
        | EngineError::InvalidMovement(_)
        | EngineError::InvalidAsset(_)
        | EngineError::InvalidUser(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Storage(store_err) => {
            tracing::error!("store error: {store_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res =
            ServerError::from(EngineError::InvalidMovement("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(EngineError::InvalidAsset("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(EngineError::InvalidUser("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_storage_maps_to_500_and_hides_the_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = EngineError::Storage(engine::StoreError::Io(io));
        assert_eq!(message_for_engine_error(err), "internal server error");

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let res = ServerError::from(EngineError::Storage(engine::StoreError::Io(io)))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
