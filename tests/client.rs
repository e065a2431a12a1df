use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{Json, Router, body::Bytes, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};

use sheetcms::{
    api,
    client::{
        API_URL_KEY, CmsClient, ConnectionState, Console, ImageFile, ImageUploader,
        MemorySettings, NOT_CONFIGURED, NoticeKind, PUBLIC_KEY_KEY, SettingsStore,
    },
    config::{ConfigResolver, PRIVATE_KEY_NAME, ScriptProperties, ServerConfig},
    content::{POST_HEADER, Post},
    error::Error,
    state::AppState,
    storage::{self, CONFIG_SHEET, MEDIA_SHEET, MemoryWorkbook, POSTS_SHEET, Workbook},
};

const UPLOADED_URL: &str = "https://ik.example/cat.png";

/// 在随机端口启动路由，返回基地址
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("绑定端口失败");
    let addr = listener.local_addr().expect("读取地址失败");
    tokio::spawn(async move { axum::serve(listener, router).await.expect("服务退出") });
    format!("http://{addr}")
}

async fn spawn_backend(workbook: MemoryWorkbook, props: ScriptProperties) -> String {
    let app = AppState::new(
        workbook,
        ConfigResolver::standard(props),
        ServerConfig::default(),
    );
    format!("{}/exec", spawn(api::setup_route(app)).await)
}

async fn fake_upload(State(hits): State<Arc<AtomicUsize>>, body: Bytes) -> (StatusCode, Json<Value>) {
    hits.fetch_add(1, Ordering::SeqCst);

    let text = String::from_utf8_lossy(&body);
    for field in [
        "file",
        "fileName",
        "publicKey",
        "signature",
        "expire",
        "token",
        "useUniqueFileName",
    ] {
        if !text.contains(&format!("name=\"{field}\"")) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": format!("missing {field}")})),
            );
        }
    }
    (
        StatusCode::OK,
        Json(json!({"url": UPLOADED_URL, "name": "cat.png"})),
    )
}

async fn rejecting_upload(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, Json<Value>) {
    hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::FORBIDDEN,
        Json(json!({"message": "Your account cannot be authenticated."})),
    )
}

/// 假图床，返回上传地址和调用计数
async fn spawn_image_host(accept: bool) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = if accept {
        Router::new().route("/upload", post(fake_upload))
    } else {
        Router::new().route("/upload", post(rejecting_upload))
    };
    let base = spawn(router.with_state(hits.clone())).await;
    (format!("{base}/upload"), hits)
}

fn settings(api_url: &str, public_key: &str) -> MemorySettings {
    let mut settings = MemorySettings::default();
    settings.set(API_URL_KEY, api_url).unwrap();
    settings.set(PUBLIC_KEY_KEY, public_key).unwrap();
    settings
}

fn image() -> ImageFile {
    ImageFile {
        name: "cat.png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

async fn ready_workbook() -> MemoryWorkbook {
    let workbook = MemoryWorkbook::new();
    storage::setup(&workbook).await.unwrap();
    workbook
}

#[tokio::test]
async fn test_console_post_lifecycle() {
    let url = spawn_backend(ready_workbook().await, ScriptProperties::default()).await;
    let mut console = Console::new(settings(&url, ""), reqwest::Client::new());
    assert_eq!(console.connection(), ConnectionState::Connected);

    console.fetch_posts().await.unwrap();
    assert!(console.posts().is_empty());

    // 新建
    let mut post = console.begin_create();
    post.title = "Hello".to_string();
    post.slug = "hello".to_string();
    console.save_post(&post).await.unwrap();
    assert_eq!(console.notification().unwrap().message, "Post created");
    assert_eq!(console.posts().len(), 1);
    assert_eq!(console.posts()[0].status, "Draft");

    // 修改 slug
    let mut post = console.begin_edit("hello").unwrap();
    post.slug = "hello-world".to_string();
    post.status = "Published".to_string();
    console.save_post(&post).await.unwrap();
    assert!(console.editing().is_none());
    assert_eq!(console.posts().len(), 1);
    assert_eq!(console.posts()[0].slug, "hello-world");
    assert_eq!(console.posts()[0].status, "Published");

    // 删除不存在的文章
    assert!(console.delete_post("hello").await.is_err());
    let notice = console.notification().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "Post not found for deletion");

    console.delete_post("hello-world").await.unwrap();
    assert_eq!(console.notification().unwrap().message, "Post deleted");
    assert!(console.posts().is_empty());
}

#[tokio::test]
async fn test_client_reads_by_slug_with_encoding() {
    let workbook = ready_workbook().await;
    let url = spawn_backend(workbook.clone(), ScriptProperties::default()).await;
    let client = CmsClient::new(reqwest::Client::new(), &url);

    let post = Post {
        title: "Spaces".to_string(),
        slug: "a b&c".to_string(),
        ..Default::default()
    };
    client.create_post(&post).await.unwrap();

    let found = client.get_post_by_slug("a b&c").await.unwrap();
    assert_eq!(found.title, "Spaces");

    // 省略的可选字段在服务端填充默认值
    assert_eq!(found.status, "Draft");
    assert_eq!(found.kind, "Post");
    assert_eq!(workbook.rows(POSTS_SHEET).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_client_keeps_existing_query_string() {
    let url = spawn_backend(ready_workbook().await, ScriptProperties::default()).await;
    let client = CmsClient::new(reqwest::Client::new(), format!("{url}?deployment=1"));

    let status = client.get_system_status().await.unwrap();
    assert!(status.posts_sheet);
    assert!(!status.signing_key);
}

#[tokio::test]
async fn test_demo_mode_makes_no_request() {
    let mut console = Console::new(MemorySettings::default(), reqwest::Client::new());
    assert_eq!(console.connection(), ConnectionState::Demo);

    let err = console.fetch_posts().await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(console.notification().unwrap().message, NOT_CONFIGURED);
}

#[tokio::test]
async fn test_save_settings_switches_backend() {
    let url = spawn_backend(ready_workbook().await, ScriptProperties::default()).await;
    let mut console = Console::new(MemorySettings::default(), reqwest::Client::new());

    console.save_settings(&url, Some("public_abc")).unwrap();
    assert_eq!(console.connection(), ConnectionState::Connected);
    assert_eq!(console.settings().public_key(), "public_abc");
    assert_eq!(console.notification().unwrap().message, "Settings saved");
    console.fetch_posts().await.unwrap();
}

#[tokio::test]
async fn test_transport_failures_are_network_errors() {
    // 端口释放后无人监听
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = CmsClient::new(reqwest::Client::new(), format!("http://{addr}/exec"));
    assert!(matches!(
        client.get_all_posts().await,
        Err(Error::Network(_))
    ));

    // 非 JSON 响应
    let base = spawn(Router::new().route("/exec", axum::routing::get(|| async { "<html>" }))).await;
    let client = CmsClient::new(reqwest::Client::new(), format!("{base}/exec"));
    let err = client.get_all_posts().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert_eq!(
        err.to_string(),
        "Network error. Check your API URL or internet connection."
    );
}

#[tokio::test]
async fn test_upload_sets_image_after_logging() {
    let workbook = ready_workbook().await;
    let props = ScriptProperties::default().with(PRIVATE_KEY_NAME, "private_key");
    let url = spawn_backend(workbook.clone(), props).await;
    let (upload_url, hits) = spawn_image_host(true).await;

    let mut console = Console::new(settings(&url, "public_key"), reqwest::Client::new())
        .with_uploader(ImageUploader::new(reqwest::Client::new()).with_endpoint(upload_url));

    let mut post = console.begin_create();
    let image_url = console.upload_image(&mut post, image()).await.unwrap();

    assert_eq!(image_url, UPLOADED_URL);
    assert_eq!(post.image, UPLOADED_URL);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let media = workbook.rows(MEDIA_SHEET).await.unwrap();
    assert_eq!(media.len(), 2);
    assert_eq!(media[1][0], "cat.png");
    assert_eq!(media[1][1], UPLOADED_URL);
}

#[tokio::test]
async fn test_upload_rejected_by_host_leaves_post_untouched() {
    let workbook = ready_workbook().await;
    let props = ScriptProperties::default().with(PRIVATE_KEY_NAME, "private_key");
    let url = spawn_backend(workbook.clone(), props).await;
    let (upload_url, _) = spawn_image_host(false).await;

    let mut console = Console::new(settings(&url, "public_key"), reqwest::Client::new())
        .with_uploader(ImageUploader::new(reqwest::Client::new()).with_endpoint(upload_url));

    let mut post = console.begin_create();
    let err = console.upload_image(&mut post, image()).await.unwrap_err();

    assert!(matches!(err, Error::Upload(ref m) if m == "Your account cannot be authenticated."));
    assert_eq!(post.image, "");
    assert_eq!(
        console.notification().unwrap().message,
        "Upload Error: Your account cannot be authenticated."
    );
    assert_eq!(workbook.rows(MEDIA_SHEET).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_media_log_blocks_image() {
    // 没有 MEDIA 表，记录会失败
    let workbook = MemoryWorkbook::new();
    workbook.ensure_sheet(POSTS_SHEET, &POST_HEADER).await.unwrap();
    workbook
        .ensure_sheet(CONFIG_SHEET, &["Key", "Value"])
        .await
        .unwrap();

    let props = ScriptProperties::default().with(PRIVATE_KEY_NAME, "private_key");
    let url = spawn_backend(workbook, props).await;
    let (upload_url, hits) = spawn_image_host(true).await;

    let mut console = Console::new(settings(&url, "public_key"), reqwest::Client::new())
        .with_uploader(ImageUploader::new(reqwest::Client::new()).with_endpoint(upload_url));

    let mut post = console.begin_create();
    let err = console.upload_image(&mut post, image()).await.unwrap_err();

    assert!(matches!(err, Error::Remote(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 1, "文件已上传但未记录");
    assert_eq!(post.image, "");
}

#[tokio::test]
async fn test_upload_preconditions() {
    let url = spawn_backend(ready_workbook().await, ScriptProperties::default()).await;
    let (upload_url, hits) = spawn_image_host(true).await;

    // 缺少公钥
    let mut console = Console::new(settings(&url, ""), reqwest::Client::new())
        .with_uploader(ImageUploader::new(reqwest::Client::new()).with_endpoint(&upload_url));
    let mut post = console.begin_create();
    let err = console.upload_image(&mut post, image()).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    // 后端未配置私钥
    let mut console = Console::new(settings(&url, "public_key"), reqwest::Client::new())
        .with_uploader(ImageUploader::new(reqwest::Client::new()).with_endpoint(&upload_url));
    let err = console.upload_image(&mut post, image()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("{PRIVATE_KEY_NAME} not configured in Script Properties")
    );

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(post.image, "");
}

#[tokio::test]
async fn test_create_with_slug_from_title() {
    let url = spawn_backend(ready_workbook().await, ScriptProperties::default()).await;
    let mut console = Console::new(settings(&url, ""), reqwest::Client::new());

    let post = console.begin_create_titled("Hello, World: Part 2!");
    assert_eq!(post.slug, "hello-world-part-2");
    assert_eq!(post.status, "Draft");
    assert_eq!(post.kind, "Post");

    console.save_post(&post).await.unwrap();
    assert_eq!(console.posts()[0].slug, "hello-world-part-2");
    assert_eq!(console.posts()[0].title, "Hello, World: Part 2!");
}
