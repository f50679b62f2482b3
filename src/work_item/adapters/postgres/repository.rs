//! `PostgreSQL` repository implementation for tasks and subtasks.

use super::{
    models::{NewSubtaskRow, NewTaskRow, SubtaskRow, TaskRow},
    schema::{attachments, subtasks, tasks},
};
use crate::actor::domain::ActorId;
use crate::persistence::{PgPool, get_conn_with, run_blocking_with};
use crate::work_item::{
    domain::{
        ExternalId, PersistedSubtaskData, PersistedTaskData, Priority, Progress, Subtask,
        SubtaskId, Task, TaskId, WorkItemKind, WorkItemStatus,
    },
    ports::{
        DeletedTask, SubtaskFilter, TaskFilter, WorkItemRepository, WorkItemRepositoryError,
        WorkItemRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

const TASK_EXTERNAL_ID_CONSTRAINT: &str = "tasks_external_id_key";
const SUBTASK_EXTERNAL_ID_CONSTRAINT: &str = "subtasks_external_id_key";
const SUBTASK_PARENT_CONSTRAINT: &str = "subtasks_task_id_fkey";

/// `PostgreSQL`-backed work-item repository.
///
/// Uniqueness of external identifiers is enforced by the `UNIQUE`
/// constraints on `tasks.external_id` and `subtasks.external_id`; deletes
/// cascade through foreign keys.
#[derive(Debug, Clone)]
pub struct PostgresWorkItemRepository {
    pool: PgPool,
}

impl PostgresWorkItemRepository {
    /// Creates a new repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(super) async fn run_blocking<F, T>(&self, f: F) -> WorkItemRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WorkItemRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, WorkItemRepositoryError::persistence)?;
                f(&mut connection)
            },
            WorkItemRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl WorkItemRepository for PostgresWorkItemRepository {
    async fn store_task(&self, task: &Task) -> WorkItemRepositoryResult<()> {
        let task_id = task.id();
        let external_id = task.external_id();
        let row = task_to_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if info.constraint_name() == Some(TASK_EXTERNAL_ID_CONSTRAINT) =>
                    {
                        WorkItemRepositoryError::DuplicateExternalId(external_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        WorkItemRepositoryError::DuplicateTask(task_id)
                    }
                    _ => WorkItemRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> WorkItemRepositoryResult<()> {
        let task_id = task.id();
        let row = task_to_row(task)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(WorkItemRepositoryError::persistence)?;
            if affected == 0 {
                return Err(WorkItemRepositoryError::TaskNotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> WorkItemRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(WorkItemRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_task_by_external_id(
        &self,
        external_id: ExternalId,
    ) -> WorkItemRepositoryResult<Option<Task>> {
        let lookup = external_id.to_string();
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::external_id.eq(lookup))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(WorkItemRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_tasks(&self, filter: TaskFilter) -> WorkItemRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .order(tasks::sequence_number.asc())
                .select(TaskRow::as_select())
                .into_boxed();
            if let Some(assignee) = filter.assigned_to {
                query = query.filter(tasks::assigned_to.eq(assignee.into_inner()));
            }
            if let Some(status) = filter.status {
                query = query.filter(tasks::status.eq(status.as_str()));
            }
            let rows = query
                .load::<TaskRow>(connection)
                .map_err(WorkItemRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> WorkItemRepositoryResult<DeletedTask> {
        self.run_blocking(move |connection| {
            let task_uuid = id.into_inner();
            let deleted = connection
                .transaction::<_, DieselError, _>(|tx| {
                    let subtask_uuids = subtasks::table
                        .filter(subtasks::task_id.eq(task_uuid))
                        .select(subtasks::id)
                        .load::<Uuid>(tx)?;
                    let attachment_keys = attachments::table
                        .filter(
                            attachments::task_id
                                .eq(task_uuid)
                                .or(attachments::subtask_id.eq_any(&subtask_uuids)),
                        )
                        .select(attachments::storage_key)
                        .load::<String>(tx)?;
                    let affected = diesel::delete(tasks::table.find(task_uuid)).execute(tx)?;
                    Ok((affected > 0).then(|| DeletedTask {
                        subtask_ids: subtask_uuids.into_iter().map(SubtaskId::from_uuid).collect(),
                        attachment_keys,
                    }))
                })
                .map_err(WorkItemRepositoryError::persistence)?;
            deleted.ok_or(WorkItemRepositoryError::TaskNotFound(id))
        })
        .await
    }

    async fn store_subtask(&self, subtask: &Subtask) -> WorkItemRepositoryResult<()> {
        let subtask_id = subtask.id();
        let task_id = subtask.task_id();
        let external_id = subtask.external_id();
        let row = subtask_to_row(subtask)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(subtasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if info.constraint_name() == Some(SUBTASK_EXTERNAL_ID_CONSTRAINT) =>
                    {
                        WorkItemRepositoryError::DuplicateExternalId(external_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        WorkItemRepositoryError::DuplicateSubtask(subtask_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info)
                        if info.constraint_name() == Some(SUBTASK_PARENT_CONSTRAINT) =>
                    {
                        WorkItemRepositoryError::TaskNotFound(task_id)
                    }
                    _ => WorkItemRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_subtask(&self, subtask: &Subtask) -> WorkItemRepositoryResult<()> {
        let subtask_id = subtask.id();
        let row = subtask_to_row(subtask)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(subtasks::table.find(subtask_id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(WorkItemRepositoryError::persistence)?;
            if affected == 0 {
                return Err(WorkItemRepositoryError::SubtaskNotFound(subtask_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_subtask(&self, id: SubtaskId) -> WorkItemRepositoryResult<Option<Subtask>> {
        self.run_blocking(move |connection| {
            let row = subtasks::table
                .find(id.into_inner())
                .select(SubtaskRow::as_select())
                .first::<SubtaskRow>(connection)
                .optional()
                .map_err(WorkItemRepositoryError::persistence)?;
            row.map(row_to_subtask).transpose()
        })
        .await
    }

    async fn find_subtask_by_external_id(
        &self,
        external_id: ExternalId,
    ) -> WorkItemRepositoryResult<Option<Subtask>> {
        let lookup = external_id.to_string();
        self.run_blocking(move |connection| {
            let row = subtasks::table
                .filter(subtasks::external_id.eq(lookup))
                .select(SubtaskRow::as_select())
                .first::<SubtaskRow>(connection)
                .optional()
                .map_err(WorkItemRepositoryError::persistence)?;
            row.map(row_to_subtask).transpose()
        })
        .await
    }

    async fn list_subtasks(
        &self,
        filter: SubtaskFilter,
    ) -> WorkItemRepositoryResult<Vec<Subtask>> {
        self.run_blocking(move |connection| {
            let mut query = subtasks::table
                .order(subtasks::sequence_number.asc())
                .select(SubtaskRow::as_select())
                .into_boxed();
            if let Some(task_id) = filter.task_id {
                query = query.filter(subtasks::task_id.eq(task_id.into_inner()));
            }
            if let Some(assignee) = filter.assigned_to {
                query = query.filter(subtasks::assigned_to.eq(assignee.into_inner()));
            }
            if let Some(status) = filter.status {
                query = query.filter(subtasks::status.eq(status.as_str()));
            }
            let rows = query
                .load::<SubtaskRow>(connection)
                .map_err(WorkItemRepositoryError::persistence)?;
            rows.into_iter().map(row_to_subtask).collect()
        })
        .await
    }

    async fn delete_subtask(&self, id: SubtaskId) -> WorkItemRepositoryResult<Vec<String>> {
        self.run_blocking(move |connection| {
            let subtask_uuid = id.into_inner();
            let deleted = connection
                .transaction::<_, DieselError, _>(|tx| {
                    let attachment_keys = attachments::table
                        .filter(attachments::subtask_id.eq(subtask_uuid))
                        .select(attachments::storage_key)
                        .load::<String>(tx)?;
                    let affected = diesel::delete(subtasks::table.find(subtask_uuid)).execute(tx)?;
                    Ok((affected > 0).then_some(attachment_keys))
                })
                .map_err(WorkItemRepositoryError::persistence)?;
            deleted.ok_or(WorkItemRepositoryError::SubtaskNotFound(id))
        })
        .await
    }

    async fn latest_external_id(
        &self,
        kind: WorkItemKind,
    ) -> WorkItemRepositoryResult<Option<String>> {
        self.run_blocking(move |connection| {
            let latest = match kind {
                WorkItemKind::Task => tasks::table
                    .order(tasks::sequence_number.desc())
                    .select(tasks::external_id)
                    .first::<String>(connection),
                WorkItemKind::Subtask => subtasks::table
                    .order(subtasks::sequence_number.desc())
                    .select(subtasks::external_id)
                    .first::<String>(connection),
            };
            latest
                .optional()
                .map_err(WorkItemRepositoryError::persistence)
        })
        .await
    }
}

fn sequence_to_column(external_id: ExternalId) -> WorkItemRepositoryResult<i64> {
    i64::try_from(external_id.sequence().value()).map_err(WorkItemRepositoryError::persistence)
}

/// The `sequence_number` column disagrees with the stored external identifier.
#[derive(Debug, thiserror::Error)]
#[error("stored identifier {external_id} does not match sequence column {sequence_number}")]
struct SequenceColumnMismatch {
    external_id: ExternalId,
    sequence_number: i64,
}

fn parse_external_id(
    kind: WorkItemKind,
    raw: &str,
    sequence_number: i64,
) -> WorkItemRepositoryResult<ExternalId> {
    let external_id = ExternalId::parse(kind, raw).map_err(WorkItemRepositoryError::persistence)?;
    if sequence_to_column(external_id)? != sequence_number {
        return Err(WorkItemRepositoryError::persistence(SequenceColumnMismatch {
            external_id,
            sequence_number,
        }));
    }
    Ok(external_id)
}

fn parse_status(raw: &str) -> WorkItemRepositoryResult<WorkItemStatus> {
    WorkItemStatus::try_from(raw).map_err(WorkItemRepositoryError::persistence)
}

fn task_to_row(task: &Task) -> WorkItemRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        external_id: task.external_id().to_string(),
        sequence_number: sequence_to_column(task.external_id())?,
        title: task.title().to_owned(),
        description: task.description().map(str::to_owned),
        priority: task.priority().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        due_date: task.due_date(),
        created_by: task.created_by().into_inner(),
        assigned_to: task.assigned_to().into_inner(),
        completed_at: task.completed_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> WorkItemRepositoryResult<Task> {
    let TaskRow {
        id,
        external_id: persisted_external_id,
        sequence_number,
        title,
        description,
        priority: persisted_priority,
        status: persisted_status,
        due_date,
        created_by,
        assigned_to,
        completed_at,
        created_at,
        updated_at,
    } = row;

    let external_id =
        parse_external_id(WorkItemKind::Task, &persisted_external_id, sequence_number)?;
    let priority = Priority::try_from(persisted_priority.as_str())
        .map_err(WorkItemRepositoryError::persistence)?;
    let status = parse_status(&persisted_status)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        external_id,
        title,
        description,
        priority,
        due_date,
        created_by: ActorId::from_uuid(created_by),
        assigned_to: ActorId::from_uuid(assigned_to),
        progress: Progress::from_parts(status, completed_at),
        created_at,
        updated_at,
    }))
}

fn subtask_to_row(subtask: &Subtask) -> WorkItemRepositoryResult<NewSubtaskRow> {
    Ok(NewSubtaskRow {
        id: subtask.id().into_inner(),
        external_id: subtask.external_id().to_string(),
        sequence_number: sequence_to_column(subtask.external_id())?,
        task_id: subtask.task_id().into_inner(),
        title: subtask.title().to_owned(),
        description: subtask.description().map(str::to_owned),
        status: subtask.status().as_str().to_owned(),
        due_date: subtask.due_date(),
        created_by: subtask.created_by().into_inner(),
        assigned_to: subtask.assigned_to().map(ActorId::into_inner),
        completed_at: subtask.completed_at(),
        created_at: subtask.created_at(),
        updated_at: subtask.updated_at(),
    })
}

fn row_to_subtask(row: SubtaskRow) -> WorkItemRepositoryResult<Subtask> {
    let SubtaskRow {
        id,
        external_id: persisted_external_id,
        sequence_number,
        task_id,
        title,
        description,
        status: persisted_status,
        due_date,
        created_by,
        assigned_to,
        completed_at,
        created_at,
        updated_at,
    } = row;

    let external_id = parse_external_id(
        WorkItemKind::Subtask,
        &persisted_external_id,
        sequence_number,
    )?;
    let status = parse_status(&persisted_status)?;

    Ok(Subtask::from_persisted(PersistedSubtaskData {
        id: SubtaskId::from_uuid(id),
        external_id,
        task_id: TaskId::from_uuid(task_id),
        title,
        description,
        due_date,
        created_by: ActorId::from_uuid(created_by),
        assigned_to: assigned_to.map(ActorId::from_uuid),
        progress: Progress::from_parts(status, completed_at),
        created_at,
        updated_at,
    }))
}
