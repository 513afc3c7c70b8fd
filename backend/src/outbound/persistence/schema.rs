//! Diesel table definitions mirroring `migrations/`.
//!
//! Keep in sync with the SQL migrations; `diesel print-schema` against a
//! migrated database regenerates these.

diesel::table! {
    /// Customer projects POIs can be linked to.
    projects (id) {
        id -> Text,
        name -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// POI categories, keyed by slug.
    categories (id) {
        id -> Text,
        name -> Text,
        icon -> Text,
        color -> Text,
    }
}

diesel::table! {
    /// Points of interest.
    ///
    /// `editorial_hook`, `local_insight`, and `story_priority` are written by
    /// editors only; imports never touch them.
    pois (id) {
        id -> Text,
        name -> Text,
        lat -> Double,
        lng -> Double,
        address -> Nullable<Text>,
        category_id -> Text,
        google_place_id -> Nullable<Text>,
        entur_stopplace_id -> Nullable<Text>,
        bysykkel_station_id -> Nullable<Text>,
        google_rating -> Nullable<Double>,
        google_review_count -> Nullable<Integer>,
        photo_reference -> Nullable<Text>,
        editorial_hook -> Nullable<Text>,
        local_insight -> Nullable<Text>,
        story_priority -> Nullable<Integer>,
        last_imported_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Project to POI association.
    project_pois (project_id, poi_id) {
        project_id -> Text,
        poi_id -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(pois -> categories (category_id));
diesel::joinable!(project_pois -> pois (poi_id));
diesel::joinable!(project_pois -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(categories, pois, project_pois, projects);
