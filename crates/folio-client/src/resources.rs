//! Typed CRUD clients for the portfolio resources.
//!
//! Every call is auth-required and goes through [`ApiClient::send`], so a
//! stale access token is refreshed transparently.

use std::marker::PhantomData;

use folio_common::models::{
    Education, EducationDraft, Experience, ExperienceDraft, Page, PageRequest, Project, ProjectDraft,
    Resume, ResumeDraft,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::dispatcher::{ApiClient, ApiRequest};
use crate::error::Result;
use crate::transport::MultipartForm;

/// A collection exposed under `PATH` with the usual list/get/create/update/delete.
pub trait Resource {
    const PATH: &'static str;
    type Item: DeserializeOwned;
    type Draft: Serialize;
}

pub struct Projects;
pub struct Experiences;
pub struct Educations;
pub struct Resumes;

impl Resource for Projects {
    const PATH: &'static str = "/api/projects";
    type Item = Project;
    type Draft = ProjectDraft;
}

impl Resource for Experiences {
    const PATH: &'static str = "/api/experiences";
    type Item = Experience;
    type Draft = ExperienceDraft;
}

impl Resource for Educations {
    const PATH: &'static str = "/api/educations";
    type Item = Education;
    type Draft = EducationDraft;
}

impl Resource for Resumes {
    const PATH: &'static str = "/api/resumes";
    type Item = Resume;
    type Draft = ResumeDraft;
}

pub struct ResourceClient<R> {
    api: ApiClient,
    _kind: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: ApiClient) -> Self {
        Self { api, _kind: PhantomData }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<R::Item>> {
        debug!(resource = R::PATH, page = page.page, size = page.size, "Listing");
        self.api.get(&format!("{}{}", R::PATH, page.query())).await
    }

    pub async fn get(&self, id: i64) -> Result<R::Item> {
        self.api.get(&format!("{}/{id}", R::PATH)).await
    }

    pub async fn create(&self, draft: &R::Draft) -> Result<R::Item> {
        self.api.post(R::PATH, draft).await
    }

    pub async fn update(&self, id: i64, draft: &R::Draft) -> Result<R::Item> {
        self.api.put(&format!("{}/{id}", R::PATH), draft).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("{}/{id}", R::PATH)).await
    }
}

impl ResourceClient<Resumes> {
    /// Upload a resume file as multipart field `file`.
    pub async fn upload(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<Resume> {
        debug!(file_name, size = bytes.len(), "Uploading resume");
        let form = MultipartForm::new().file("file", file_name, content_type, bytes);
        self.api
            .send(ApiRequest::post(format!("{}/upload", Resumes::PATH)).multipart(form))
            .await
    }
}

impl ApiClient {
    pub fn projects(&self) -> ResourceClient<Projects> {
        ResourceClient::new(self.clone())
    }

    pub fn experiences(&self) -> ResourceClient<Experiences> {
        ResourceClient::new(self.clone())
    }

    pub fn educations(&self) -> ResourceClient<Educations> {
        ResourceClient::new(self.clone())
    }

    pub fn resumes(&self) -> ResourceClient<Resumes> {
        ResourceClient::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTransport, BASE_URL};
    use crate::storage::MemoryStorage;
    use crate::tokens::TokenStore;
    use crate::transport::RequestBody;
    use folio_common::models::StoredTokens;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MockTransport>, ApiClient) {
        let transport = Arc::new(MockTransport::new());
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        tokens.set_tokens(StoredTokens { access_token: "a0".into(), refresh_token: "r0".into() });
        (transport.clone(), ApiClient::new(BASE_URL, transport, tokens))
    }

    #[tokio::test]
    async fn lists_a_page_of_projects() {
        let (transport, api) = setup();
        transport.reply_json(
            Method::GET,
            "/api/projects?page=1&size=2",
            200,
            json!({
                "content": [{ "id": 3, "title": "Folio" }, { "id": 4, "title": "Crate" }],
                "totalElements": 4, "totalPages": 2, "size": 2, "number": 1,
                "first": false, "last": true
            }),
        );

        let page = api.projects().list(PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.content[1].title, "Crate");
        assert!(page.last);
        assert_eq!(transport.bearers("/api/projects?page=1&size=2"), vec![Some("Bearer a0".into())]);
    }

    #[tokio::test]
    async fn crud_paths_and_methods() {
        let (transport, api) = setup();
        let edu = json!({ "id": 5, "institution": "ETH" });
        transport
            .reply_json(Method::GET, "/api/educations/5", 200, edu.clone())
            .reply_json(Method::POST, "/api/educations", 201, edu.clone())
            .reply_json(Method::PUT, "/api/educations/5", 200, edu)
            .reply(Method::DELETE, "/api/educations/5", 204, "");

        let educations = api.educations();
        let draft = EducationDraft { institution: "ETH".into(), ..Default::default() };
        assert_eq!(educations.get(5).await.unwrap().institution, "ETH");
        assert_eq!(educations.create(&draft).await.unwrap().id, 5);
        assert_eq!(educations.update(5, &draft).await.unwrap().id, 5);
        educations.delete(5).await.unwrap();

        let methods: Vec<Method> = transport.requests().into_iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![Method::GET, Method::POST, Method::PUT, Method::DELETE]);
    }

    #[tokio::test]
    async fn experience_create_sends_draft() {
        let (transport, api) = setup();
        transport.reply_json(
            Method::POST,
            "/api/experiences",
            201,
            json!({ "id": 1, "company": "Acme", "position": "Engineer", "current": true }),
        );

        let draft = ExperienceDraft {
            company: "Acme".into(),
            position: "Engineer".into(),
            current: true,
            ..Default::default()
        };
        let created = api.experiences().create(&draft).await.unwrap();
        assert!(created.current);

        match &transport.requests()[0].body {
            Some(RequestBody::Json(body)) => {
                assert_eq!(body, &json!({ "company": "Acme", "position": "Engineer", "current": true }))
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn resume_upload_is_multipart() {
        let (transport, api) = setup();
        transport.reply_json(
            Method::POST,
            "/api/resumes/upload",
            201,
            json!({ "id": 9, "fileName": "cv.pdf", "active": true }),
        );

        let resume = api
            .resumes()
            .upload("cv.pdf", "application/pdf", b"%PDF".to_vec())
            .await
            .unwrap();
        assert_eq!(resume.id, 9);

        match &transport.requests()[0].body {
            Some(RequestBody::Multipart(form)) => {
                assert_eq!(form.files[0].field, "file");
                assert_eq!(form.files[0].content_type, "application/pdf");
            }
            other => panic!("unexpected body {other:?}"),
        }
    }
}
