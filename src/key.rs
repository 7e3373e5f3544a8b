//! # オブジェクトキー生成
//!
//! グローバルに一意な不透明キーを生成する。UUIDv4（122ビットのランダム値）を
//! ハイフンなし16進表記で描画するため、バケットの生存期間にわたって
//! 衝突確率は無視できる。調整・採番テーブルは不要。

/// 新しいオブジェクトキーを生成する。
///
/// URL-safeな32文字の16進文字列。セキュアな乱数源のみに依存し、
/// プロセス状態を共有しないため並行呼び出しに安全。
pub fn new_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
