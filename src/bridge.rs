//! # ホストアプリケーション向け操作
//!
//! ホストアプリケーションの永続化・認可レイヤから呼び出される
//! Gatewayの呼び出し面。アップロード認可の発行、読み取り認可の発行、
//! URLからのサーバーサイド取り込み、キー指定の削除を提供する。

use std::time::{SystemTime, UNIX_EPOCH};

use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::io::StreamReader;

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::key;

/// アップロード認可の発行結果。
///
/// `url` は有効期限付きの署名付きPUT URL。クライアントはこのURLに
/// 直接アップロードし、ホストアプリケーションは `key` を自身の
/// レコードに保存する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAuthorization {
    /// 新規に割り当てられたオブジェクトキー
    pub key: String,
    /// 署名付きアップロードURL（PUT）
    pub url: String,
    /// URL有効期限のUNIXタイムスタンプ（秒）
    pub expires_at: u64,
}

impl GatewayState {
    /// アップロード認可を発行する。
    ///
    /// 新しいキーを割り当て、そのキーに対する時間制限付きの書き込み
    /// 認可URLを計算して返す。ストアへのネットワーク呼び出しは行わない
    /// 純粋な署名計算のため、ストアの可用性に依存しない。
    pub async fn issue_upload_authorization(
        &self,
    ) -> Result<UploadAuthorization, GatewayError> {
        let object_key = key::new_key();

        let url = self
            .store
            .presign_put(&object_key, self.presign_expiry_secs)
            .await?;

        // URL有効期限のUNIXタイムスタンプ
        let expires_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            + self.presign_expiry_secs as u64;

        Ok(UploadAuthorization {
            key: object_key,
            url,
            expires_at,
        })
    }

    /// 既存キーに対する読み取り認可を発行する。
    ///
    /// キーの存在確認は行わない。存在しないオブジェクトのURLは、
    /// クライアントが参照した時点でバックエンドがnot-foundを返す。
    pub async fn issue_read_authorization(&self, object_key: &str) -> Result<String, GatewayError> {
        self.store
            .presign_get(object_key, self.presign_expiry_secs)
            .await
    }

    /// 取り込み元URLからサーバーサイドでオブジェクトを格納する。
    ///
    /// 取り込み元のバイトストリームをバッファせずにストアへ中継する。
    /// 取り込み元が到達不能または非成功ステータスの場合は `Fetch`、
    /// ストアへの書き込み失敗は `StoreWrite` として失敗する。
    /// 失敗時にキーが外部に漏れることはない。
    pub async fn store_from_url(&self, source_url: &str) -> Result<String, GatewayError> {
        let response = self
            .http_client
            .get(source_url)
            .send()
            .await
            .map_err(|e| GatewayError::Fetch(format!("HTTP送信失敗: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Fetch(format!(
                "取り込み元が非成功ステータスを返しました: HTTP {status}"
            )));
        }

        let object_key = key::new_key();

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(Box::pin(stream));
        self.store.put_stream(&object_key, &mut reader).await?;

        tracing::info!(
            object_key = %object_key,
            source_url = %source_url,
            "URLからの取り込みが完了"
        );

        Ok(object_key)
    }

    /// キーのオブジェクトを削除する。
    ///
    /// べき等。存在しないキーの削除もエラーにしない。
    pub async fn delete_by_key(&self, object_key: &str) -> Result<(), GatewayError> {
        self.store.delete(object_key).await
    }
}
