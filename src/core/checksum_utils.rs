/*
 * Provides checksum helpers used to detect whether the editor buffer diverged from
 * the text last read from or written to disk. Only a digest of the persisted text
 * is kept, so an open note is never held in memory twice.
 */
use sha2::{Digest, Sha256};

/*
 * Calculates the SHA256 checksum of a piece of text and returns it as a
 * hex-encoded string.
 */
pub fn calculate_text_checksum(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hex_checksum = format!("{:x}", hasher.finalize());
    log::trace!(
        "ChecksumUtils: Calculated checksum {} for {} bytes",
        hex_checksum,
        text.len()
    );
    hex_checksum
}
