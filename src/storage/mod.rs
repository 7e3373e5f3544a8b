//! # オブジェクトストア抽象
//!
//! Gateway運用者が選択可能なオブジェクトストアの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

pub mod s3;

pub use s3::S3ObjectStore;

use tokio::io::AsyncRead;

use crate::error::GatewayError;

/// ストリーミングアップロード用のリーダー型。
/// reqwestのレスポンスストリーム等を `tokio_util::io::StreamReader` で
/// 包んだものを渡す。
pub type StreamingBody<'a> = &'a mut (dyn AsyncRead + Send + Unpin);

/// オブジェクトストアの抽象インターフェース。
///
/// 運用者はS3互換ストレージ（MinIO, AWS S3, Cloudflare R2等）や
/// その他のバックエンドを実装として選択できる。全操作は `&self` のみを
/// 取り、共有可変状態を持たないため並行実行に安全。
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// 署名付きアップロードURL（PUT）を生成する。
    ///
    /// ネットワーク呼び出しを伴わない純粋な署名計算。キーの存在確認は
    /// 行わず、有効期限と操作種別の強制はバックエンド側が行う。
    async fn presign_put(&self, key: &str, expiry_secs: u32) -> Result<String, GatewayError>;

    /// 署名付きダウンロードURL（GET）を生成する。
    ///
    /// 存在しないキーに対するURLも生成される。クライアントが実際に
    /// 参照した時点でバックエンドがnot-foundを返す。
    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, GatewayError>;

    /// バイト列をキーの下に格納する。
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), GatewayError>;

    /// リーダーからストリーミングで格納する。全体をバッファせずに転送する。
    async fn put_stream(&self, key: &str, reader: StreamingBody<'_>)
        -> Result<(), GatewayError>;

    /// キーのオブジェクト全体を読み取る。存在しない場合は `None`。
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, GatewayError>;

    /// キーのオブジェクトを削除する。存在しないキーの削除もエラーに
    /// しない（S3互換のべき等セマンティクス）。
    async fn delete(&self, key: &str) -> Result<(), GatewayError>;
}
