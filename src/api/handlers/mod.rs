//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by resource.

/// Admin dashboard and admin-scoped user/store views.
pub mod admin;
/// Authentication handlers (register, login).
pub mod auth;
/// Rating submission, listing, stats, and edits.
pub mod ratings;
/// Store CRUD, ownership rules, and rating aggregation.
pub mod stores;
/// User management and password changes.
pub mod users;

use crate::db::RatingDetail;
use crate::types::RatingEntry;

/// Maps a joined rating row to its wire shape. The store reference is
/// omitted where the surrounding response already names the store.
pub(crate) fn rating_entry(detail: RatingDetail, include_store: bool) -> RatingEntry {
    RatingEntry {
        id: detail.rating.id,
        rating: detail.rating.score,
        comment: detail.rating.comment,
        created_at: detail.rating.created_at,
        user: detail.rater,
        store: include_store.then_some(detail.store),
    }
}
