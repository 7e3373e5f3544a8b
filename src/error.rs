//! # Gateway エラー型
//!
//! 操作の失敗は全て即座に呼び出し元へ伝播する。内部でのリトライは行わない
//! （リトライが必要な場合は呼び出し元の責任）。

use axum::http::StatusCode;

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// ストア設定（認証情報・エンドポイント）が欠落または不正
    #[error("設定が不正です: {0}")]
    Config(String),
    /// 指定されたキーに対応するオブジェクトが存在しない
    #[error("オブジェクトが見つかりません")]
    NotFound,
    /// バックエンドからの読み取りに失敗
    #[error("ストレージ読み取りに失敗: {0}")]
    StoreRead(String),
    /// バックエンドへの書き込みに失敗
    #[error("ストレージ書き込みに失敗: {0}")]
    StoreWrite(String),
    /// バックエンドでの削除に失敗
    #[error("ストレージ削除に失敗: {0}")]
    StoreDelete(String),
    /// 取り込み元URLのフェッチに失敗（到達不能または非成功ステータス）
    #[error("取り込み元URLのフェッチに失敗: {0}")]
    Fetch(String),
    /// アップロード後フックがエラーを返した。
    /// この時点でオブジェクト自体は格納済みである点に注意。
    #[error("アップロード後フックに失敗: {0}")]
    Callback(String),
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        // NotFoundのみ本文を固定文字列にする（読み取りエンドポイントの契約）
        if matches!(self, GatewayError::NotFound) {
            return (StatusCode::NOT_FOUND, "not found").into_response();
        }
        let status = match &self {
            GatewayError::StoreRead(_)
            | GatewayError::StoreWrite(_)
            | GatewayError::StoreDelete(_)
            | GatewayError::Fetch(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Config(_) | GatewayError::Callback(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::NotFound => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}
