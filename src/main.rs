//! # R2 Gateway サーバー
//!
//! 単体起動用のエントリポイント。環境変数から設定を読み込み、
//! HTTPエンドポイントを公開する。
//!
//! ## 環境変数
//! - `S3_BUCKET` / `S3_ENDPOINT` / `S3_ACCESS_KEY` / `S3_SECRET_KEY` — ストア設定（必須）
//! - `S3_REGION` — リージョン（省略時はエンドポイントから自動検出）
//! - `PRESIGN_EXPIRY_SECS` — 署名付きURLの有効期限（デフォルト3600）
//! - `GATEWAY_PATH_PREFIX` — ルートのプレフィックス（デフォルト `/r2`）
//! - `GATEWAY_ALLOWED_ORIGIN` — CORSで許可するオリジン（デフォルト `*`）
//! - `GATEWAY_LISTEN_ADDR` — 待ち受けアドレス（デフォルト `0.0.0.0:3000`）

use std::sync::Arc;

use r2_gateway::{
    endpoints, GatewayState, RouteOptions, S3ObjectStore, StoreConfig,
    DEFAULT_PRESIGN_EXPIRY_SECS,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // ストア設定の解決（欠落があればここで即座に失敗する）
    let store_config = StoreConfig::from_env()?;
    tracing::info!(
        endpoint = %store_config.endpoint,
        bucket = %store_config.bucket,
        "オブジェクトストアを設定"
    );

    let store = S3ObjectStore::from_config(&store_config)?;

    let presign_expiry_secs = std::env::var("PRESIGN_EXPIRY_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PRESIGN_EXPIRY_SECS);

    let gateway = Arc::new(GatewayState::new(Box::new(store), presign_expiry_secs));

    let path_prefix =
        std::env::var("GATEWAY_PATH_PREFIX").unwrap_or_else(|_| "/r2".to_string());
    let allowed_origin =
        std::env::var("GATEWAY_ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string());

    // 単体起動ではアップロード後フックなし（ホストアプリ組み込み時の機能）
    let app = endpoints::routes(
        gateway,
        RouteOptions {
            path_prefix,
            allowed_origin,
            on_upload: None,
        },
    );

    let addr =
        std::env::var("GATEWAY_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    tracing::info!("Gatewayを {} で起動します", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
