//! Diesel schema for work-item persistence.

diesel::table! {
    /// Top-level tasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Human-readable identifier such as `T0001`.
        #[max_length = 32]
        external_id -> Varchar,
        /// Numeric part of the external identifier.
        sequence_number -> Int8,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Status.
        #[max_length = 20]
        status -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Creating administrator.
        created_by -> Uuid,
        /// Assigned manager.
        assigned_to -> Uuid,
        /// First completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Subtasks under a task.
    subtasks (id) {
        /// Subtask identifier.
        id -> Uuid,
        /// Human-readable identifier such as `ST0001`.
        #[max_length = 32]
        external_id -> Varchar,
        /// Numeric part of the external identifier.
        sequence_number -> Int8,
        /// Parent task.
        task_id -> Uuid,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Status.
        #[max_length = 20]
        status -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Creating manager.
        created_by -> Uuid,
        /// Assigned staff member.
        assigned_to -> Nullable<Uuid>,
        /// First completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-kind allocation counters.
    work_item_counters (kind) {
        /// Work-item kind.
        #[max_length = 20]
        kind -> Varchar,
        /// Last sequence handed out.
        value -> Int8,
    }
}

diesel::table! {
    /// Comments on tasks or subtasks.
    comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Commented task.
        task_id -> Nullable<Uuid>,
        /// Commented subtask.
        subtask_id -> Nullable<Uuid>,
        /// Author.
        author_id -> Uuid,
        /// Text.
        body -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Attachment metadata for tasks or subtasks.
    attachments (id) {
        /// Attachment identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Nullable<Uuid>,
        /// Owning subtask.
        subtask_id -> Nullable<Uuid>,
        /// Display name.
        #[max_length = 255]
        file_name -> Varchar,
        /// MIME type.
        #[max_length = 255]
        content_type -> Varchar,
        /// Blob size.
        size_bytes -> Int8,
        /// Hex SHA-256 of the blob.
        #[max_length = 64]
        checksum -> Varchar,
        /// Blob storage key.
        #[max_length = 255]
        storage_key -> Varchar,
        /// Uploader.
        uploaded_by -> Uuid,
        /// Upload timestamp.
        uploaded_at -> Timestamptz,
    }
}

diesel::joinable!(subtasks -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(tasks, subtasks, comments, attachments);
