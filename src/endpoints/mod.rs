//! # HTTPエンドポイント
//!
//! 匿名クライアント向けのバイト転送エンドポイント。設定可能なプレフィックス
//! （デフォルト `/r2`）配下に、キー指定の読み取り・POSTによる書き込み・
//! CORSプリフライト応答の3ルートをマウントする。
//!
//! ルート登録はホストのルーターを変更せず、合成可能な `Router` を
//! 返す純粋な関数として提供する。ホスト側は `Router::merge` / `nest` で
//! 組み込む。

pub mod get_object;
pub mod send;

pub use get_object::handle_get_object;
pub use send::{handle_send, handle_send_preflight};

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::config::GatewayState;

/// アップロード後フック。
///
/// プロキシ書き込みが成功するたびに、割り当てられたキーと元リクエストの
/// URLを引数に同期的に（awaitして）呼び出される。通常はホスト
/// アプリケーションがキーを自身のデータモデルへ永続化するために使う。
/// フックのエラーは書き込みエンドポイントの失敗として伝播する。
#[async_trait::async_trait]
pub trait UploadHook: Send + Sync {
    async fn on_upload(&self, object_key: &str, request_url: &str) -> anyhow::Result<()>;
}

/// ルート登録オプション。
pub struct RouteOptions {
    /// マウント先のパスプレフィックス（`/` 始まり）
    pub path_prefix: String,
    /// CORSで許可するオリジン
    pub allowed_origin: String,
    /// アップロード後フック（任意）
    pub on_upload: Option<Arc<dyn UploadHook>>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            path_prefix: "/r2".to_string(),
            allowed_origin: "*".to_string(),
            on_upload: None,
        }
    }
}

/// エンドポイントハンドラが参照する状態。
/// Gateway本体に加え、CORSオリジンとフックをインスタンス単位で保持する。
pub(crate) struct RouteState {
    pub(crate) gateway: Arc<GatewayState>,
    pub(crate) allowed_origin: String,
    pub(crate) on_upload: Option<Arc<dyn UploadHook>>,
}

/// GatewayのHTTPルートを構築する。
///
/// - `GET  {prefix}/get/{key}` — キー指定のオブジェクト読み取り
/// - `POST {prefix}/send` — ボディ全体のプロキシ書き込み
/// - `OPTIONS {prefix}/send` — CORSプリフライト応答
///
/// 返された `Router` をホストのルーターに合成することで登録が完了する。
pub fn routes(gateway: Arc<GatewayState>, options: RouteOptions) -> Router {
    let state = Arc::new(RouteState {
        gateway,
        allowed_origin: options.allowed_origin,
        on_upload: options.on_upload,
    });

    let inner = Router::new()
        .route("/get/{key}", get(handle_get_object))
        .route(
            "/send",
            post(handle_send).options(handle_send_preflight),
        )
        .with_state(state);

    Router::new().nest(&options.path_prefix, inner)
}
