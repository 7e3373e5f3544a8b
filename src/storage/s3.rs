//! # S3互換オブジェクトストア実装
//!
//! AWS S3, MinIO, Cloudflare R2 等のS3互換APIを使用する
//! ObjectStore実装。署名付きURLはHMACベースのリクエスト署名による
//! ローカル計算であり、バックエンドへの往復を伴わない。

use s3::error::S3Error;

use super::{ObjectStore, StreamingBody};
use crate::config::StoreConfig;
use crate::error::GatewayError;

/// S3互換ストレージによるObjectStore実装。
/// AWS S3, MinIO, Cloudflare R2 等のS3互換APIを使用する。
pub struct S3ObjectStore {
    bucket: s3::Bucket,
}

impl S3ObjectStore {
    /// ストア設定からバケットクライアントを構築する。
    ///
    /// 認証情報はここで一度だけ束ねられ、以後は読み取り専用で共有される。
    /// ローテーションが必要な場合は再構築する。
    pub fn from_config(config: &StoreConfig) -> Result<Self, GatewayError> {
        // AWS S3エンドポイント（s3.REGION.amazonaws.com）からリージョンを自動検出。
        // 非AWSエンドポイントではus-east-1をフォールバックとして使用。
        let endpoint = &config.endpoint;
        let detected_region = std::env::var("S3_REGION").ok().unwrap_or_else(|| {
            if let Some(caps) = endpoint.find("s3.").and_then(|start| {
                let rest = &endpoint[start + 3..];
                rest.find(".amazonaws.com").map(|end| rest[..end].to_string())
            }) {
                caps
            } else {
                "us-east-1".to_string()
            }
        });
        let region = s3::Region::Custom {
            region: detected_region,
            endpoint: endpoint.to_string(),
        };

        let credentials = s3::creds::Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| GatewayError::Config(format!("認証情報の構築に失敗: {e}")))?;

        let bucket = s3::Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| GatewayError::Config(format!("バケットクライアントの構築に失敗: {e}")))?
            .with_path_style();

        Ok(Self { bucket: *bucket })
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(&self, key: &str, expiry_secs: u32) -> Result<String, GatewayError> {
        self.bucket
            .presign_put(key, expiry_secs, None, None)
            .await
            .map_err(|e| GatewayError::StoreWrite(format!("署名付きアップロードURL生成失敗: {e}")))
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, GatewayError> {
        self.bucket
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(|e| GatewayError::StoreRead(format!("署名付きダウンロードURL生成失敗: {e}")))
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), GatewayError> {
        self.bucket
            .put_object(key, bytes)
            .await
            .map_err(|e| GatewayError::StoreWrite(format!("アップロード失敗: {e}")))?;
        Ok(())
    }

    async fn put_stream(
        &self,
        key: &str,
        reader: StreamingBody<'_>,
    ) -> Result<(), GatewayError> {
        let mut reader = reader;
        self.bucket
            .put_object_stream(&mut reader, key)
            .await
            .map_err(|e| GatewayError::StoreWrite(format!("ストリーミングアップロード失敗: {e}")))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, GatewayError> {
        match self.bucket.get_object(key).await {
            Ok(data) if data.status_code() == 404 => Ok(None),
            Ok(data) => Ok(Some(data.bytes().to_vec())),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(None),
            Err(e) => Err(GatewayError::StoreRead(format!("ダウンロード失敗: {e}"))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), GatewayError> {
        match self.bucket.delete_object(key).await {
            Ok(_) => Ok(()),
            // 存在しないキーの削除はべき等に成功扱い
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(()),
            Err(e) => Err(GatewayError::StoreDelete(format!("削除失敗: {e}"))),
        }
    }
}
