//! Resource CRUD commands.

use std::path::Path;

use anyhow::Context;
use folio_client::resources::{Resource, ResourceClient, Resumes};
use folio_common::models::PageRequest;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::print_json;
use crate::cli::ResourceAction;

pub async fn run<R>(client: ResourceClient<R>, action: ResourceAction) -> anyhow::Result<()>
where
    R: Resource,
    R::Item: Serialize,
    R::Draft: DeserializeOwned,
{
    match action {
        ResourceAction::List { page, size } => print_json(&client.list(PageRequest::new(page, size)).await?),
        ResourceAction::Get { id } => print_json(&client.get(id).await?),
        ResourceAction::Create { file } => {
            let draft: R::Draft = read_draft(&file)?;
            print_json(&client.create(&draft).await?)
        }
        ResourceAction::Update { id, file } => {
            let draft: R::Draft = read_draft(&file)?;
            print_json(&client.update(id, &draft).await?)
        }
        ResourceAction::Delete { id } => {
            client.delete(id).await?;
            println!("Deleted {}/{id}", R::PATH);
            Ok(())
        }
    }
}

pub async fn upload_resume(client: ResourceClient<Resumes>, path: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("resume path has no file name")?;
    let content_type = mime_guess::from_path(path).first_or_octet_stream();

    let resume = client.upload(file_name, content_type.essence_str(), bytes).await?;
    print_json(&resume)
}

fn read_draft<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a valid draft", path.display()))
}
