//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! `diesel print-schema` regenerates them from a live database.

diesel::table! {
    /// Obstacle reports.
    obstacles (id) {
        /// Primary key.
        id -> Int8,
        /// Reporting user; null for reports restored from the archive.
        owner_id -> Nullable<Uuid>,
        name -> Varchar,
        /// Height in metres, 0 to 200.
        height -> Int4,
        description -> Varchar,
        /// GeoJSON payload.
        geometry -> Text,
        /// 1 pending, 2 approved, 3 rejected.
        status -> Int4,
    }
}

diesel::table! {
    /// Comments on obstacles; removed with their obstacle.
    obstacle_comments (id) {
        id -> Int8,
        obstacle_id -> Int8,
        text -> Text,
        /// `human` or `system`.
        authored_by -> Varchar,
    }
}

diesel::table! {
    /// Archived copies of rejected obstacles, one per original obstacle.
    archived_reports (id) {
        id -> Int8,
        original_obstacle_id -> Int8,
        name -> Varchar,
        height -> Int4,
        description -> Varchar,
        geometry -> Text,
        archived_at -> Timestamptz,
        /// JSON array of comment texts in original order.
        comments_json -> Text,
    }
}

diesel::table! {
    /// Role memberships mirrored from the identity provider.
    user_roles (user_id, role) {
        user_id -> Uuid,
        role -> Varchar,
    }
}

diesel::joinable!(obstacle_comments -> obstacles (obstacle_id));
diesel::allow_tables_to_appear_in_same_query!(obstacles, obstacle_comments);
