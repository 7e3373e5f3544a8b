//! # GET {prefix}/get/{key}
//!
//! キー指定のオブジェクト読み取り。サーバー保持の認証情報でストアへ
//! 直接読み取りを行い、オブジェクト全体をバッファしてから返す。
//!
//! 書き込みパスと異なり、このパスにはCORSヘッダを付与しない。
//! 読み取りは同一オリジンまたは `<img>` 埋め込み（CORS不要）を想定した
//! 非対称な設計であり、意図的に現状維持としている。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;

use super::RouteState;
use crate::error::GatewayError;

/// キーのオブジェクトを読み取って返す。
///
/// 成功時は200と生のバイト列。オブジェクトが存在しない場合は
/// 404とプレーンテキストの "not found"。
pub async fn handle_get_object(
    State(state): State<Arc<RouteState>>,
    Path(object_key): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    match state.gateway.store.get(&object_key).await? {
        Some(bytes) => Ok(bytes),
        None => Err(GatewayError::NotFound),
    }
}
