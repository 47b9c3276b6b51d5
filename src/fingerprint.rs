//! 設定フィンガープリント
//!
//! どのカタログ・文献でレポートを作ったかを識別する短いハッシュ。

use crate::error::Result;
use sha2::{Digest, Sha256};
use skin_ai_common::{CitationStore, ProtocolCatalog};

const FINGERPRINT_LEN: usize = 12;

pub fn fingerprint(catalog: &ProtocolCatalog, citations: &CitationStore) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(catalog)?);
    hasher.update(b"\n");
    hasher.update(serde_json::to_vec(citations)?);

    let digest = hex::encode(hasher.finalize());
    Ok(digest[..FINGERPRINT_LEN].to_string())
}
