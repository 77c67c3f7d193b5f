use axum::extract::FromRequest;

use crate::error::Error;

/// `Json` whose rejections (bad syntax, unknown enum values, missing fields)
/// come back as `{ "error": ... }` with 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);
