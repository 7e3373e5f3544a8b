//! # Gateway設定・共有状態
//!
//! ストア設定の解決（明示指定 > 環境変数）とGatewayの共有状態の定義。

use crate::error::GatewayError;
use crate::storage::ObjectStore;

/// 署名付きURLの有効期限のデフォルト（秒）
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u32 = 3600;

/// オブジェクトストアの接続設定。
///
/// 構築後は不変。認証情報のローテーションはGatewayの再構築で行う。
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// バケット名
    pub bucket: String,
    /// エンドポイントURL
    pub endpoint: String,
    /// アクセスキーID
    pub access_key: String,
    /// シークレットアクセスキー
    pub secret_key: String,
}

/// ストア設定の明示指定。`None` のフィールドは環境変数から補完される。
#[derive(Debug, Clone, Default)]
pub struct StoreOverrides {
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl StoreConfig {
    /// 明示指定と環境変数からストア設定を解決する。明示指定が優先。
    /// どちらにも値がないフィールドがあれば `Config` エラー。
    pub fn resolve(overrides: StoreOverrides) -> Result<Self, GatewayError> {
        Ok(Self {
            bucket: required(overrides.bucket, "S3_BUCKET")?,
            endpoint: required(overrides.endpoint, "S3_ENDPOINT")?,
            access_key: required(overrides.access_key, "S3_ACCESS_KEY")?,
            secret_key: required(overrides.secret_key, "S3_SECRET_KEY")?,
        })
    }

    /// 環境変数のみから構築する。
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::resolve(StoreOverrides::default())
    }
}

/// 明示値があればそれを、なければ環境変数を返す。空文字列は未設定扱い。
fn required(explicit: Option<String>, env_key: &str) -> Result<String, GatewayError> {
    if let Some(value) = explicit {
        if !value.is_empty() {
            return Ok(value);
        }
    }
    std::env::var(env_key)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| GatewayError::Config(format!("{env_key} が設定されていません")))
}

/// Gatewayの共有状態。
///
/// 全フィールドは構築後読み取り専用であり、`Arc` で全リクエストに
/// 安全に共有される。リクエスト間で共有される可変状態は持たない。
pub struct GatewayState {
    /// オブジェクトストア（S3互換等、トレイトで抽象化）
    pub store: Box<dyn ObjectStore>,
    /// URL取り込み用HTTPクライアント（接続再利用のため共有）
    pub http_client: reqwest::Client,
    /// 署名付きURLの有効期限（秒）
    pub presign_expiry_secs: u32,
}

impl GatewayState {
    /// ストア実装と署名有効期限からGatewayを構築する。
    pub fn new(store: Box<dyn ObjectStore>, presign_expiry_secs: u32) -> Self {
        Self {
            store,
            http_client: reqwest::Client::new(),
            presign_expiry_secs,
        }
    }
}
