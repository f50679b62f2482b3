//! Diesel schema for actor persistence.

diesel::table! {
    /// Actor identities with role profiles.
    actors (id) {
        /// Actor identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        display_name -> Varchar,
        /// Normalised e-mail address.
        #[max_length = 320]
        email -> Varchar,
        /// Role discriminator duplicated from the profile for indexing.
        #[max_length = 20]
        role -> Varchar,
        /// Role profile payload.
        profile -> Jsonb,
        /// Reporting manager for staff actors.
        manager_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
