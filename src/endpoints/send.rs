//! # POST {prefix}/send / OPTIONS {prefix}/send
//!
//! プロキシ書き込みエンドポイントとCORSプリフライト応答。
//! クライアントのリクエストボディ全体を新規キーの下にストアへ中継し、
//! 設定済みのフックがあればキーと元リクエストURLを通知する。

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{OriginalUri, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};

use super::RouteState;
use crate::error::GatewayError;
use crate::key;

/// プリフライトのキャッシュ有効期間（秒）
const PREFLIGHT_MAX_AGE: &str = "86400";

/// ボディ全体をアップロードし、フックを呼び出して200（空ボディ）を返す。
///
/// フックはawaitされるため、フックの失敗はリクエストの失敗として
/// 伝播する。その時点でオブジェクト自体は格納済みであり、ホスト側への
/// 通知だけが失われる（呼び出し元が検知できるようエラーで表面化する）。
pub async fn handle_send(
    State(state): State<Arc<RouteState>>,
    OriginalUri(request_uri): OriginalUri,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let object_key = key::new_key();

    state.gateway.store.put(&object_key, &body).await?;

    tracing::info!(
        object_key = %object_key,
        size = body.len(),
        "プロキシ書き込みが完了"
    );

    if let Some(hook) = &state.on_upload {
        hook.on_upload(&object_key, &request_uri.to_string())
            .await
            .map_err(|e| {
                tracing::warn!(object_key = %object_key, "アップロード後フックが失敗: {e}");
                GatewayError::Callback(e.to_string())
            })?;
    }

    let headers = [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            state.allowed_origin.clone(),
        ),
        (header::VARY, "origin".to_string()),
    ];
    Ok((headers, ()).into_response())
}

/// CORSプリフライトに応答する。
///
/// `Origin`・`Access-Control-Request-Method`・`Access-Control-Request-Headers`
/// が全て揃った正当なプリフライトにのみCORSヘッダを返す。欠けている場合は
/// 空ボディのみを返し、ブラウザ側で本リクエストが拒否される。
pub async fn handle_send_preflight(
    State(state): State<Arc<RouteState>>,
    request_headers: HeaderMap,
) -> Response {
    let valid = request_headers.contains_key(header::ORIGIN)
        && request_headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
        && request_headers.contains_key(header::ACCESS_CONTROL_REQUEST_HEADERS);

    if !valid {
        return ().into_response();
    }

    let headers = [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            state.allowed_origin.clone(),
        ),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST".to_string()),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "Content-Type, Digest".to_string(),
        ),
        (
            header::ACCESS_CONTROL_MAX_AGE,
            PREFLIGHT_MAX_AGE.to_string(),
        ),
    ];
    (headers, ()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::http::{StatusCode, Uri};

    use crate::config::GatewayState;
    use crate::endpoints::{routes, RouteOptions, UploadHook};
    use crate::storage::mock::MockObjectStore;
    use crate::storage::ObjectStore;

    /// 呼び出し引数を記録するテスト用フック
    #[derive(Default)]
    struct RecordingHook {
        seen: Mutex<Option<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl UploadHook for RecordingHook {
        async fn on_upload(&self, object_key: &str, request_url: &str) -> anyhow::Result<()> {
            *self.seen.lock().unwrap() =
                Some((object_key.to_string(), request_url.to_string()));
            Ok(())
        }
    }

    /// 受け取ったキーを記録した上で常に失敗するテスト用フック
    #[derive(Default)]
    struct FailingHook {
        seen_key: Mutex<Option<String>>,
    }

    #[async_trait::async_trait]
    impl UploadHook for FailingHook {
        async fn on_upload(&self, object_key: &str, _request_url: &str) -> anyhow::Result<()> {
            *self.seen_key.lock().unwrap() = Some(object_key.to_string());
            anyhow::bail!("永続化に失敗")
        }
    }

    fn test_state(on_upload: Option<Arc<dyn UploadHook>>) -> Arc<RouteState> {
        Arc::new(RouteState {
            gateway: Arc::new(GatewayState::new(Box::new(MockObjectStore::default()), 900)),
            allowed_origin: "https://app.example".to_string(),
            on_upload,
        })
    }

    /// 書き込み成功時に200（空ボディ）とCORSヘッダが返ることを確認
    #[tokio::test]
    async fn test_send_responds_with_cors_headers() {
        let state = test_state(None);

        let response = handle_send(
            State(state),
            OriginalUri(Uri::from_static("http://gw.example/r2/send")),
            Bytes::from_static(b"\xDE\xAD\xBE\xEF"),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example"
        );
        assert_eq!(response.headers()[header::VARY], "origin");

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }

    /// フックが新規キーと元リクエストURLを受け取ることを確認
    #[tokio::test]
    async fn test_send_invokes_hook() {
        let hook = Arc::new(RecordingHook::default());
        let state = test_state(Some(hook.clone()));

        handle_send(
            State(state.clone()),
            OriginalUri(Uri::from_static("http://gw.example/r2/send")),
            Bytes::from_static(b"payload"),
        )
        .await
        .unwrap();

        let (object_key, request_url) = hook.seen.lock().unwrap().clone().unwrap();
        assert_eq!(request_url, "http://gw.example/r2/send");

        // フックが受け取ったキーの下にボディが格納されている
        let bytes = state.gateway.store.get(&object_key).await.unwrap().unwrap();
        assert_eq!(bytes, b"payload");
    }

    /// フックの失敗がCallbackエラーとして伝播することを確認。
    /// その時点でオブジェクト自体は格納済みのまま残る（不整合ウィンドウ）。
    #[tokio::test]
    async fn test_send_hook_failure_aborts_response() {
        let hook = Arc::new(FailingHook::default());
        let state = test_state(Some(hook.clone()));

        let result = handle_send(
            State(state.clone()),
            OriginalUri(Uri::from_static("http://gw.example/r2/send")),
            Bytes::from_static(b"payload"),
        )
        .await;

        assert!(matches!(result, Err(GatewayError::Callback(_))));

        // リクエストは失敗するが、バイト列はフック呼び出し前に格納済み
        let object_key = hook.seen_key.lock().unwrap().clone().unwrap();
        let bytes = state.gateway.store.get(&object_key).await.unwrap().unwrap();
        assert_eq!(bytes, b"payload");
    }

    /// 正当なプリフライトに全CORSヘッダが返ることを確認
    #[tokio::test]
    async fn test_preflight_valid() {
        let state = test_state(None);

        let mut request_headers = HeaderMap::new();
        request_headers.insert(header::ORIGIN, "https://app.example".parse().unwrap());
        request_headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            "POST".parse().unwrap(),
        );
        request_headers.insert(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            "content-type".parse().unwrap(),
        );

        let response = handle_send_preflight(State(state), request_headers).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Digest"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_MAX_AGE], "86400");
    }

    /// Access-Control-Request-Headersを欠くプリフライトにCORSヘッダが
    /// 一切付かないことを確認
    #[tokio::test]
    async fn test_preflight_missing_request_headers_is_denied() {
        let state = test_state(None);

        let mut request_headers = HeaderMap::new();
        request_headers.insert(header::ORIGIN, "https://app.example".parse().unwrap());
        request_headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            "POST".parse().unwrap(),
        );

        let response = handle_send_preflight(State(state), request_headers).await;

        assert!(!response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }

    /// ルーター全体を実ポートで起動し、POST→GETのラウンドトリップと
    /// プレフィックス配下へのマウントを確認
    #[tokio::test]
    async fn test_routes_roundtrip_over_http() {
        let gateway = Arc::new(GatewayState::new(Box::new(MockObjectStore::default()), 900));
        let hook = Arc::new(RecordingHook::default());
        let app = routes(
            gateway.clone(),
            RouteOptions {
                path_prefix: "/r2".to_string(),
                allowed_origin: "https://app.example".to_string(),
                on_upload: Some(hook.clone()),
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let client = reqwest::Client::new();
        let base = format!("http://127.0.0.1:{port}/r2");

        // 書き込み
        let response = client
            .post(format!("{base}/send"))
            .body(b"\xDE\xAD\xBE\xEF".to_vec())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://app.example"
        );

        // フックが記録したキーで読み取り
        let (object_key, _) = hook.seen.lock().unwrap().clone().unwrap();
        let response = client
            .get(format!("{base}/get/{object_key}"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(&response.bytes().await.unwrap()[..], b"\xDE\xAD\xBE\xEF");

        // 存在しないキーは404 "not found"
        let response = client
            .get(format!("{base}/get/no-such-key"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.text().await.unwrap(), "not found");

        // プリフライト
        let response = client
            .request(reqwest::Method::OPTIONS, format!("{base}/send"))
            .header(header::ORIGIN, "https://app.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
                .unwrap(),
            "Content-Type, Digest"
        );
    }
}
