pub mod reset;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new().route(
        "/reset/{token}",
        get(reset::reset_form).post(reset::submit_new_password),
    )
}
