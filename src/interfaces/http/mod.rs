use crate::application::DatasetHandle;
use crate::domain::error::AppError;
use crate::infrastructure::assets::CharacterImages;
use crate::infrastructure::csv::TextEncoding;
use actix_cors::Cors;
use actix_web::{dev::Server, get, web, App, HttpResponse, HttpServer, Responder, Scope};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub dataset: Arc<DatasetHandle>,
    pub images: CharacterImages,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub available: bool,
    pub encoding: Option<TextEncoding>,
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegionProfile {
    pub region: String,
    pub character: String,
    pub feature: String,
    pub display_name: String,
    /// File name inside the image directory, when one matches
    pub image: Option<String>,
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> impl Responder {
    let catalog = data.dataset.get();

    HttpResponse::Ok().json(HealthResponse {
        available: catalog.is_available(),
        encoding: catalog.encoding(),
        rows: catalog.dataset().len(),
        columns: catalog.dataset().columns().to_vec(),
    })
}

#[get("/binding")]
async fn get_binding(data: web::Data<HttpState>) -> impl Responder {
    let catalog = data.dataset.get();

    match catalog.ensure_available() {
        Ok(binding) => HttpResponse::Ok().json(binding),
        Err(e) => error_response(&data.logs, "Binding", &e),
    }
}

#[get("/regions")]
async fn list_regions(data: web::Data<HttpState>) -> impl Responder {
    let catalog = data.dataset.get();

    match catalog.regions() {
        Ok(regions) => HttpResponse::Ok().json(regions),
        Err(e) => error_response(&data.logs, "Regions", &e),
    }
}

#[get("/regions/{region}")]
async fn select_region(data: web::Data<HttpState>, region: web::Path<String>) -> impl Responder {
    let region = region.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "Regions",
        &format!("Selecting region: {}", region),
    );

    let catalog = data.dataset.get();
    let selection = match catalog.select(&region) {
        Ok(selection) => selection,
        Err(e) => return error_response(&data.logs, "Regions", &e),
    };

    let image = if selection.character == catalog.placeholder() {
        None
    } else {
        data.images
            .find(selection.display_name())
            .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
    };

    HttpResponse::Ok().json(RegionProfile {
        display_name: selection.display_name().to_string(),
        region: selection.region,
        character: selection.character,
        feature: selection.feature,
        image,
    })
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = lock_logs(&data.logs);
    HttpResponse::Ok().json(&*logs)
}

fn error_response(logs: &Mutex<Vec<LogEntry>>, source: &str, err: &AppError) -> HttpResponse {
    match err {
        AppError::NotFound(_) => {
            add_log(logs, "WARN", source, &err.to_string());
            HttpResponse::NotFound().body(err.to_string())
        }
        AppError::DatasetUnavailable(_) => {
            add_log(logs, "ERROR", source, &err.to_string());
            HttpResponse::ServiceUnavailable().body(err.to_string())
        }
        AppError::ValidationError(_) => HttpResponse::BadRequest().body(err.to_string()),
        _ => {
            add_log(logs, "ERROR", source, &err.to_string());
            HttpResponse::InternalServerError().body(err.to_string())
        }
    }
}

fn lock_logs(logs: &Mutex<Vec<LogEntry>>) -> MutexGuard<'_, Vec<LogEntry>> {
    logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = lock_logs(logs);
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

fn api_scope() -> Scope {
    web::scope("/api")
        .service(health)
        .service(get_binding)
        .service(list_regions)
        .service(select_region)
        .service(get_logs)
}

pub fn start_server(
    dataset: Arc<DatasetHandle>,
    images: CharacterImages,
    logs: Arc<Mutex<Vec<LogEntry>>>,
    host: &str,
    port: u16,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState {
        dataset,
        images,
        logs,
    });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Read-only local API

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .service(api_scope())
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::binding::RoleCandidates;
    use crate::infrastructure::csv::TabularLoader;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use std::fs;
    use std::path::Path;

    const SEOUL: &str = "/api/regions/%EC%84%9C%EC%9A%B8";
    const BUSAN: &str = "/api/regions/%EB%B6%80%EC%82%B0";
    const DAEGU: &str = "/api/regions/%EB%8C%80%EA%B5%AC";

    fn state(data_path: &Path, image_dir: &Path) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            dataset: Arc::new(DatasetHandle::new(
                data_path,
                TabularLoader::new(),
                RoleCandidates::default(),
                "정보 없음",
            )),
            images: CharacterImages::new(image_dir),
            logs: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("regions.csv"),
            "지역,캐릭터, 특징\n서울,김시간 (골동품 가게 주인),차분함\n부산,,활발함\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("images")).unwrap();
        fs::write(dir.path().join("images").join("김시간.png"), b"img").unwrap();
        dir
    }

    #[actix_web::test]
    async fn test_regions_and_selection() {
        let dir = fixture();
        let data = state(&dir.path().join("regions.csv"), &dir.path().join("images"));
        let app = actix_test::init_service(App::new().app_data(data.clone()).service(api_scope())).await;

        let req = actix_test::TestRequest::get().uri("/api/regions").to_request();
        let regions: Vec<String> = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(regions, vec!["서울", "부산"]);

        let req = actix_test::TestRequest::get().uri(SEOUL).to_request();
        let profile: RegionProfile = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(profile.character, "김시간 (골동품 가게 주인)");
        assert_eq!(profile.display_name, "김시간");
        assert_eq!(profile.feature, "차분함");
        assert_eq!(profile.image.as_deref(), Some("김시간.png"));

        let req = actix_test::TestRequest::get().uri(BUSAN).to_request();
        let profile: RegionProfile = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(profile.character, "정보 없음");
        assert_eq!(profile.image, None);

        assert!(!lock_logs(&data.logs).is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_region_is_not_found() {
        let dir = fixture();
        let data = state(&dir.path().join("regions.csv"), &dir.path().join("images"));
        let app = actix_test::init_service(App::new().app_data(data).service(api_scope())).await;

        let req = actix_test::TestRequest::get().uri(DAEGU).to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_unreadable_dataset_is_service_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("regions.csv"), [0xFF, 0xFE, 0x80]).unwrap();
        let data = state(&dir.path().join("regions.csv"), dir.path());
        let app = actix_test::init_service(App::new().app_data(data).service(api_scope())).await;

        for uri in ["/api/regions", "/api/binding", SEOUL] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        }

        let req = actix_test::TestRequest::get().uri("/api/health").to_request();
        let report: HealthResponse = actix_test::call_and_read_body_json(&app, req).await;
        assert!(!report.available);
        assert_eq!(report.encoding, None);
        assert_eq!(report.rows, 0);
    }

    #[actix_web::test]
    async fn test_binding_reports_resolved_columns() {
        let dir = fixture();
        let data = state(&dir.path().join("regions.csv"), &dir.path().join("images"));
        let app = actix_test::init_service(App::new().app_data(data).service(api_scope())).await;

        let req = actix_test::TestRequest::get().uri("/api/binding").to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["region"]["column"], "지역");
        assert_eq!(body["feature"]["column"], " 특징");
        assert_eq!(body["feature"]["source"]["kind"], "matched");
        assert_eq!(body["feature"]["source"]["candidate"], "특징");
    }

    #[test]
    fn test_log_ring_is_bounded() {
        let logs = Mutex::new(Vec::new());
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            add_log(&logs, "INFO", "Test", &format!("entry {}", i));
        }

        let logs = lock_logs(&logs);
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "entry 5");
    }
}
