//! JSON envelopes returned by handlers.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// `{ "data": T }`, the shape of every successful JSON body.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A `201 Created` response carrying the new resource.
pub type Created<T> = (StatusCode, Json<DataResponse<T>>);

pub fn created<T: Serialize>(data: T) -> Created<T> {
    (StatusCode::CREATED, Json(DataResponse { data }))
}
