use axum::Router;

use crate::state::MockState;

pub mod dev;
pub mod exhibits;
pub mod jotforms;
pub mod notes;
pub mod parts;

pub fn router() -> Router<MockState> {
    Router::new()
        .merge(exhibits::router())
        .merge(parts::router())
        .merge(notes::router())
        .merge(jotforms::router())
        .merge(dev::router())
}
