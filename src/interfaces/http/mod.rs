pub mod views;

use crate::application::{AdminUseCase, SubmissionUseCase};
use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::record_store::JsonRecordStore;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{dev::Server, get, middleware, post, web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

pub struct HttpState {
    pub submissions: SubmissionUseCase,
    pub admin: AdminUseCase,
}

impl HttpState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(JsonRecordStore::new(config.data_file.clone()));
        Ok(Self {
            submissions: SubmissionUseCase::new(store.clone()),
            admin: AdminUseCase::new(store, config)?,
        })
    }
}

#[derive(Deserialize, Default)]
pub struct SubmissionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub manitto: String,
}

#[derive(Deserialize)]
pub struct ResultQuery {
    pub name: Option<String>,
    pub manitto: Option<String>,
}

#[derive(Deserialize)]
pub struct SortQuery {
    #[serde(default)]
    pub sort: Option<String>,
}

impl SortQuery {
    pub fn by_name(&self) -> bool {
        self.sort.as_deref() == Some("1")
    }
}

#[derive(Deserialize, Default)]
pub struct PasswordForm {
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Default)]
pub struct EditForm {
    #[serde(default)]
    pub name: String,
}

#[get("/")]
async fn health() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Manitto server is running")
}

#[get("/form")]
async fn form_page() -> impl Responder {
    html(views::form_page())
}

#[post("/form")]
async fn submit_form(
    data: web::Data<HttpState>,
    form: Option<web::Form<SubmissionForm>>,
) -> impl Responder {
    let form = form_or_default(form);
    let state = data.clone();

    match blocking(move || state.submissions.submit(&form.name, &form.manitto)).await {
        Ok(record) => redirect(&result_location(&record.name, &record.manitto)),
        // Blank fields just bring the form back.
        Err(e) if e.is_validation() => html(views::form_page()),
        Err(e) => error_response(e),
    }
}

#[get("/result")]
async fn result_page(query: web::Query<ResultQuery>) -> impl Responder {
    html(views::result_page(
        query.name.as_deref(),
        query.manitto.as_deref(),
    ))
}

#[get("/admin")]
async fn admin_page(data: web::Data<HttpState>, query: web::Query<SortQuery>) -> impl Responder {
    let sort_by_name = query.by_name();
    let state = data.clone();

    match blocking(move || state.admin.view(sort_by_name, None)).await {
        Ok(view) => html(views::admin_page(&view)),
        Err(e) => error_response(e),
    }
}

#[post("/admin")]
async fn admin_reveal(
    data: web::Data<HttpState>,
    query: web::Query<SortQuery>,
    form: Option<web::Form<PasswordForm>>,
) -> impl Responder {
    let sort_by_name = query.by_name();
    let password = form_or_default(form).password;
    let state = data.clone();

    match blocking(move || state.admin.view(sort_by_name, Some(&password))).await {
        Ok(view) => html(views::admin_page(&view)),
        Err(e) => error_response(e),
    }
}

#[get("/admin/edit/{idx}")]
async fn edit_page(data: web::Data<HttpState>, path: web::Path<usize>) -> impl Responder {
    let idx = path.into_inner();
    let state = data.clone();

    match blocking(move || state.admin.record(idx)).await {
        Ok(entry) => html(views::edit_page(&entry)),
        Err(e) => error_response(e),
    }
}

#[post("/admin/edit/{idx}")]
async fn edit_submit(
    data: web::Data<HttpState>,
    path: web::Path<usize>,
    form: Option<web::Form<EditForm>>,
) -> impl Responder {
    let idx = path.into_inner();
    let new_name = form_or_default(form).name;
    let state = data.clone();

    match blocking(move || state.admin.edit(idx, &new_name)).await {
        Ok(_) => redirect("/admin"),
        Err(e) => error_response(e),
    }
}

#[post("/admin/delete/{idx}")]
async fn delete_submit(data: web::Data<HttpState>, path: web::Path<usize>) -> impl Responder {
    let idx = path.into_inner();
    let state = data.clone();

    match blocking(move || state.admin.delete(idx)).await {
        Ok(_) => redirect("/admin"),
        Err(e) => error_response(e),
    }
}

#[get("/admin/export_csv")]
async fn export_csv(data: web::Data<HttpState>, query: web::Query<SortQuery>) -> impl Responder {
    let sort_by_name = query.by_name();
    let state = data.clone();

    match blocking(move || state.admin.export(sort_by_name)).await {
        Ok(export) => HttpResponse::Ok()
            .content_type(export.content_type)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(export.file_name)],
            })
            .body(export.bytes),
        Err(e) => error_response(e),
    }
}

/// Registers every route; shared by the server and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(form_page)
        .service(submit_form)
        .service(result_page)
        .service(admin_page)
        .service(admin_reveal)
        .service(export_csv)
        .service(edit_page)
        .service(edit_submit)
        .service(delete_submit);
}

pub fn start_server(state: HttpState, config: &AppConfig) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    info!(host = %config.host, port = config.port, "HTTP server listening");
    Ok(server)
}

/// Store calls do blocking file I/O; keep them off the async workers.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

/// A missing or non-urlencoded body reads as a form with every field empty.
fn form_or_default<T: Default>(form: Option<web::Form<T>>) -> T {
    form.map(web::Form::into_inner).unwrap_or_default()
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn result_location(name: &str, manitto: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("name", name)
        .append_pair("manitto", manitto)
        .finish();
    format!("/result?{}", query)
}

fn error_response(e: AppError) -> HttpResponse {
    match e {
        AppError::NotFound(msg) => HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body(format!("Not Found: {}", msg)),
        AppError::ValidationError(msg) => HttpResponse::BadRequest()
            .content_type("text/plain; charset=utf-8")
            .body(msg),
        other => {
            error!(error = %other, "Request failed");
            HttpResponse::InternalServerError()
                .content_type("text/plain; charset=utf-8")
                .body(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_location_encodes_hangul_and_spaces() {
        let location = result_location("김 철수", "A&B");
        assert!(location.starts_with("/result?name="));
        let query = location.trim_start_matches("/result?");
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "김 철수".to_string()),
                ("manitto".to_string(), "A&B".to_string())
            ]
        );
    }

    #[test]
    fn test_sort_query_flag() {
        assert!(SortQuery { sort: Some("1".into()) }.by_name());
        assert!(!SortQuery { sort: Some("0".into()) }.by_name());
        assert!(!SortQuery { sort: None }.by_name());
    }
}
