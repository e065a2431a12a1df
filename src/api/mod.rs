mod action;
mod envelope;
mod lock;
mod read;
mod write;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    response::Response,
    routing::get,
};
use axum_extra::extract::Query;
use tower_http::trace::TraceLayer;
use tracing::instrument;

pub use self::{
    action::Action,
    envelope::{Envelope, Status},
    lock::ScriptLock,
    read::{ActionParams, SystemStatus},
};

use crate::{
    error::{Error, Result},
    state::AppState,
    storage::Workbook,
};

/// 所有 action 共用的路径
pub const EXEC_PATH: &str = "/exec";

/// 设置应用的路由。
///
/// 读操作 `GET /exec?action=...`，写操作 `POST /exec?action=...` 并携带 JSON 请求体。
pub fn setup_route<W: Workbook>(app: AppState<W>) -> Router {
    Router::new()
        .route(
            EXEC_PATH,
            get(dispatch_read::<W>).post(dispatch_write::<W>),
        )
        .with_state(app)
}

/// 分发读操作
///
/// 查询串按键值对读取，重复参数只取第一个，不会因格式问题绕过信封。
/// 先在有限时间内尝试获取全局锁，超时后照常处理。
#[instrument(name = "read", skip_all, fields(action = tracing::field::Empty))]
async fn dispatch_read<W: Workbook>(
    State(app): State<AppState<W>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let params = ActionParams::from_pairs(&pairs);
    tracing::Span::current().record("action", params.action.as_str());
    let _guard = app.acquire().await;

    let action: Action = params.action.parse()?;
    read::handle(&app, action, params).await
}

/// 分发写操作
///
/// 请求体必须是合法 JSON，否则直接返回错误信封。
#[instrument(name = "write", skip_all, fields(action = tracing::field::Empty))]
async fn dispatch_write<W: Workbook>(
    State(app): State<AppState<W>>,
    Query(pairs): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Response> {
    let params = ActionParams::from_pairs(&pairs);
    tracing::Span::current().record("action", params.action.as_str());
    let _guard = app.acquire().await;

    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(Error::InvalidPayload)?;
    let action: Action = params.action.parse()?;
    write::handle(&app, action, payload).await
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
#[instrument(name = "http server", skip_all)]
pub async fn run_server_with_router(router: Router, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "listening");

    axum::serve(listener, router).await?;
    Ok(())
}

/// 启动 HTTP 服务，自动设置路由和中间件。
///
/// 1. 生成路由
/// 2. 添加日志和追踪中间件
/// 3. 启动服务器
pub async fn run_server<W: Workbook>(app: AppState<W>) -> Result<()> {
    let addr = app.config().addr.clone();
    let router = add_middlewares(setup_route(app));
    run_server_with_router(router, &addr).await
}

/// 为路由添加中间件，包括请求追踪和失败日志记录。
///
/// 日志记录会在请求失败时输出错误信息。
fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {
                // 空实现，关闭请求日志
            }),
    )
}
