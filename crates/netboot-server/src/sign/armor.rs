//! ASCII armor for signatures

use super::{Result, SignError, Signer};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;

pub const ARMOR_BEGIN: &str = "-----BEGIN NETBOOT SIGNATURE-----";
pub const ARMOR_END: &str = "-----END NETBOOT SIGNATURE-----";

const LINE_WIDTH: usize = 64;

/// Wrap signature bytes as base64 text between armor lines
pub fn armor(signature: &[u8]) -> String {
    let encoded = STANDARD.encode(signature);
    let mut out = String::with_capacity(encoded.len() + 80);
    out.push_str(ARMOR_BEGIN);
    out.push('\n');
    for line in encoded.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(ARMOR_END);
    out.push('\n');
    out
}

/// Recover signature bytes from armored text
pub fn dearmor(text: &str) -> Result<Vec<u8>> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    if lines.next() != Some(ARMOR_BEGIN) {
        return Err(SignError::Armor("missing begin line".to_string()));
    }

    let mut encoded = String::new();
    for line in lines.by_ref() {
        if line == ARMOR_END {
            return STANDARD
                .decode(encoded)
                .map_err(|e| SignError::Armor(e.to_string()));
        }
        encoded.push_str(line);
    }
    Err(SignError::Armor("missing end line".to_string()))
}

/// Signer producing armored text from another signer's output
pub struct ArmoredSigner {
    inner: Arc<dyn Signer>,
}

impl ArmoredSigner {
    pub fn new(inner: Arc<dyn Signer>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Signer for ArmoredSigner {
    async fn sign(&self, content: &[u8]) -> Result<Vec<u8>> {
        let signature = self.inner.sign(content).await?;
        Ok(armor(&signature).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::Ed25519Signer;

    #[test]
    fn test_armor_layout() {
        let text = armor(&[0xab; 64]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first(), Some(&ARMOR_BEGIN));
        assert_eq!(lines.last(), Some(&ARMOR_END));
        assert!(lines[1..lines.len() - 1].iter().all(|l| l.len() <= LINE_WIDTH));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_dearmor() {
        let signature = vec![1u8, 2, 3, 250, 251, 252];
        assert_eq!(dearmor(&armor(&signature)).unwrap(), signature);
        assert!(dearmor("not armored").is_err());
        assert!(dearmor(&format!("{}\nAAAA\n", ARMOR_BEGIN)).is_err());
    }

    #[tokio::test]
    async fn test_armored_signer_wraps_inner() {
        let inner = Arc::new(Ed25519Signer::from_seed([7; 32]));
        let raw = inner.sign(b"metadata").await.unwrap();

        let armored = ArmoredSigner::new(inner).sign(b"metadata").await.unwrap();
        let text = String::from_utf8(armored).unwrap();
        assert_eq!(dearmor(&text).unwrap(), raw);
    }
}
