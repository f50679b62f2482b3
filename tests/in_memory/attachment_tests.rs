//! Attachments written through the capability-scoped filesystem store.

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use etms::work_item::{
    domain::WorkItemRef,
    services::{
        CollaborationError, CreateSubtaskRequest, CreateTaskRequest, UploadAttachmentRequest,
    },
};

use super::helpers::deployment;

fn stored_files(dir: &tempfile::TempDir) -> Result<usize, eyre::Report> {
    let root = Dir::open_ambient_dir(dir.path(), ambient_authority())?;
    Ok(root.entries()?.count())
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_lands_on_disk_and_downloads_intact() -> Result<(), eyre::Report> {
    let env = deployment().await?;
    let team = &env.team;
    let task = env
        .work_items
        .create_task(&team.admin, CreateTaskRequest::new("Quarterly audit", team.manager.id()))
        .await?;
    let contents = b"sku,count\nA-100,42\n".to_vec();

    let attachment = env
        .collaboration
        .upload_attachment(
            &team.manager,
            UploadAttachmentRequest::new(task.id(), "counts.csv", "text/csv", contents.clone()),
        )
        .await?;
    eyre::ensure!(stored_files(&env.blob_dir)? == 1, "one blob is written");

    let downloaded = env
        .collaboration
        .download_attachment(&team.admin, attachment.id())
        .await?;
    eyre::ensure!(downloaded.bytes == contents, "bytes survive the round trip");
    eyre::ensure!(
        downloaded.attachment.file_name().as_str() == "counts.csv",
        "file name is kept"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn staff_can_attach_to_their_subtask_but_not_others() -> Result<(), eyre::Report> {
    let env = deployment().await?;
    let team = &env.team;
    let task = env
        .work_items
        .create_task(&team.admin, CreateTaskRequest::new("Stocktake", team.manager.id()))
        .await?;
    let subtask = env
        .work_items
        .create_subtask(
            &team.manager,
            CreateSubtaskRequest::new(task.id(), "Count aisle B").with_assignee(team.staff.id()),
        )
        .await?;

    env.collaboration
        .upload_attachment(
            &team.staff,
            UploadAttachmentRequest::new(subtask.id(), "aisle-b.txt", "text/plain", b"17".to_vec()),
        )
        .await?;
    let refused = env
        .collaboration
        .upload_attachment(
            &team.other_staff,
            UploadAttachmentRequest::new(subtask.id(), "aisle-b.txt", "text/plain", b"0".to_vec()),
        )
        .await;
    eyre::ensure!(
        matches!(
            refused,
            Err(CollaborationError::WorkItem(ref err)) if err.is_authorization_mismatch()
        ),
        "unrelated staff are refused, got {refused:?}"
    );
    eyre::ensure!(stored_files(&env.blob_dir)? == 1, "refused upload writes nothing");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_lets_its_blobs_be_discarded() -> Result<(), eyre::Report> {
    let env = deployment().await?;
    let team = &env.team;
    let task = env
        .work_items
        .create_task(&team.admin, CreateTaskRequest::new("Office move", team.manager.id()))
        .await?;
    let subtask = env
        .work_items
        .create_subtask(
            &team.manager,
            CreateSubtaskRequest::new(task.id(), "Pack desks").with_assignee(team.staff.id()),
        )
        .await?;
    let targets: [(WorkItemRef, &str); 2] = [
        (task.id().into(), "plan.pdf"),
        (subtask.id().into(), "list.txt"),
    ];
    for (target, name) in targets {
        env.collaboration
            .upload_attachment(
                &team.manager,
                UploadAttachmentRequest::new(
                    target,
                    name,
                    "application/octet-stream",
                    b"payload".to_vec(),
                ),
            )
            .await?;
    }
    env.collaboration
        .add_comment(&team.staff, subtask.id(), "Desks are packed")
        .await?;
    eyre::ensure!(stored_files(&env.blob_dir)? == 2, "two blobs before deletion");

    let deleted = env.work_items.delete_task(&team.admin, task.id()).await?;
    let removed = env.collaboration.discard_blobs(&deleted.attachment_keys).await;

    eyre::ensure!(removed == 2, "both blobs are discarded, removed {removed}");
    eyre::ensure!(stored_files(&env.blob_dir)? == 0, "blob directory is empty");
    Ok(())
}
