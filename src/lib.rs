//! # R2 Gateway
//!
//! S3互換オブジェクトストア（AWS S3, MinIO, Cloudflare R2等）への
//! アクセスGateway。
//!
//! ## 役割
//! - 署名付きURLの発行（アップロード認可・読み取り認可）
//! - 匿名クライアント向けHTTPバイト転送（キー指定読み取り・POST書き込み）
//! - CORSプリフライト応答
//! - URLからのサーバーサイド取り込み
//! - キー指定のオブジェクト削除
//!
//! ## 組み込み方
//! ホストアプリケーションは [`GatewayState`] を構築して認可発行・取り込み・
//! 削除を直接呼び出し、[`endpoints::routes`] が返すルーターを自身の
//! ルーターに合成してHTTP面を公開する。

pub mod bridge;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod key;
pub mod storage;

pub use bridge::UploadAuthorization;
pub use config::{GatewayState, StoreConfig, StoreOverrides, DEFAULT_PRESIGN_EXPIRY_SECS};
pub use endpoints::{routes, RouteOptions, UploadHook};
pub use error::GatewayError;
pub use storage::{ObjectStore, S3ObjectStore};
