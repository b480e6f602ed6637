//! Compressed transport form for QR codes and links.
//!
//! ```text
//! JSON -> minify -> raw deflate (primed with DICTIONARY) -> base64url, no padding
//! ```
//!
//! The dictionary holds the field names, type tags and enum literals that
//! show up in almost every transaction, so even a small document compresses
//! well. Both ends must use the same dictionary. Changing a single byte of
//! it is a hard compatibility break: bump [`DICTIONARY_VERSION`] when you do.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use serde_json::Value;

use super::CodecError;

/// Version of [`DICTIONARY`]. Part of the wire contract.
pub const DICTIONARY_VERSION: u32 = 1;

/// Upper bound on a decompressed document.
pub const MAX_DECOMPRESSED_SIZE: usize = 4 * 1024 * 1024;

/// Preset deflate dictionary. Most frequent strings go last, closest to the
/// data.
pub const DICTIONARY: &str = concat!(
    "\"init_args\":[],\"init_method\":\"init\",\"binary\":\"mmx1\",\"depends\":{},",
    "\"meta_data\":null,\"decimals\":6,\"symbol\":\"\",\"name\":\"\",",
    "\"__type\":\"mmx.contract.Executable\",",
    "\"exec_result\":null,\"deploy\":null,",
    "\"MINT\",\"BURN\",\"CLAIM\",\"REVOKE\",\"OFFER\",\"TRADE\",\"WITHDRAW\",\"MUTATE\",",
    "\"DEPLOY\",\"DEPOSIT\",\"EXECUTE\",\"TRANSFER\",",
    "\"currency\":\"mmx1\",\"user\":\"mmx1\",\"args\":[],\"method\":\"",
    "\"__type\":\"mmx.operation.Deposit\",",
    "\"__type\":\"mmx.operation.Execute\",",
    "\"signature\":\"\",\"pubkey\":\"\",",
    "\"__type\":\"mmx.solution.PubKey\",",
    "\"flags\":0,\"solution\":0,\"memo\":null,",
    "\"amount\":\"address\":\"mmx1\",\"contract\":\"mmx1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqdgytev\",",
    "\"content_hash\":\"\",\"solutions\":[],\"execute\":[],\"outputs\":[],\"inputs\":[",
    "\"sender\":\"mmx1\",\"network\":\"mainnet\",\"nonce\":",
    "\"note\":\"TRANSFER\",\"max_fee_amount\":\"static_cost\":\"fee_ratio\":1024,",
    "\"expires\":\"version\":0,\"id\":\"",
    "{\"__type\":\"mmx.Transaction\","
);

/// Minifies `json`, compresses it against [`DICTIONARY`] and returns the
/// base64url text.
pub fn compress_json(json: &str) -> Result<String, CodecError> {
    let value: Value = serde_json::from_str(json)?;
    let minified = serde_json::to_vec(&value)?;
    let compressed = deflate(&minified)?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Inverse of [`compress_json`]. Returns the minified JSON text.
pub fn decompress_json(text: &str) -> Result<String, CodecError> {
    let compressed = URL_SAFE_NO_PAD
        .decode(text.trim())
        .map_err(|e| CodecError::Base64(e.to_string()))?;
    let raw = inflate(&compressed)?;
    let json = String::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
    // Reject anything that does not parse; the caller expects JSON.
    serde_json::from_str::<Value>(&json)?;
    Ok(json)
}

fn deflate(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = Compress::new(Compression::best(), false);
    encoder
        .set_dictionary(DICTIONARY.as_bytes())
        .map_err(|e| CodecError::Compression(e.to_string()))?;

    let mut out = Vec::with_capacity(input.len() / 2 + 64);
    loop {
        let consumed = encoder.total_in() as usize;
        let status = encoder
            .compress_vec(&input[consumed..], &mut out, FlushCompress::Finish)
            .map_err(|e| CodecError::Compression(e.to_string()))?;
        match status {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError => out.reserve(out.capacity().max(64)),
        }
    }
}

fn inflate(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoder = Decompress::new(false);
    decoder
        .set_dictionary(DICTIONARY.as_bytes())
        .map_err(|e| CodecError::Compression(e.to_string()))?;

    let mut out = Vec::with_capacity(input.len() * 4 + 64);
    loop {
        let consumed = decoder.total_in() as usize;
        let produced = decoder.total_out();
        let status = decoder
            .decompress_vec(&input[consumed..], &mut out, FlushDecompress::Finish)
            .map_err(|e| CodecError::Compression(e.to_string()))?;
        match status {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError => {
                if out.len() > MAX_DECOMPRESSED_SIZE {
                    return Err(CodecError::TooLarge(MAX_DECOMPRESSED_SIZE));
                }
                let stalled = decoder.total_in() as usize == consumed
                    && decoder.total_out() == produced;
                if out.len() == out.capacity() {
                    out.reserve(out.capacity().max(256));
                } else if stalled || decoder.total_in() as usize == input.len() {
                    // Input exhausted with room to spare: the stream was cut short.
                    return Err(CodecError::Truncated);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "__type": "mmx.Transaction",
        "version": 0,
        "note": "TRANSFER",
        "network": "mainnet",
        "nonce": 12345,
        "inputs": [],
        "outputs": [{"address": "mmx1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqdgytev", "amount": 10}]
    }"#;

    #[test]
    fn round_trip_yields_minified_json() {
        let packed = compress_json(SAMPLE).unwrap();
        let unpacked = decompress_json(&packed).unwrap();

        let expected = serde_json::to_string(&serde_json::from_str::<Value>(SAMPLE).unwrap()).unwrap();
        assert_eq!(unpacked, expected);
    }

    #[test]
    fn output_is_url_safe_without_padding() {
        let packed = compress_json(SAMPLE).unwrap();
        assert!(packed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn dictionary_makes_small_documents_smaller() {
        let packed = compress_json(SAMPLE).unwrap();
        let minified = serde_json::to_string(&serde_json::from_str::<Value>(SAMPLE).unwrap()).unwrap();
        assert!(packed.len() < minified.len());
    }

    #[test]
    fn wrong_dictionary_fails_or_differs() {
        let minified = br#"{"__type":"mmx.Transaction","note":"TRANSFER"}"#;
        let compressed = deflate(minified).unwrap();

        let mut plain = Decompress::new(false);
        let mut out = Vec::with_capacity(1024);
        let result = plain.decompress_vec(&compressed, &mut out, FlushDecompress::Finish);
        assert!(result.is_err() || out != minified.to_vec());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(decompress_json("!!!"), Err(CodecError::Base64(_))));
        assert!(compress_json("{not json").is_err());

        let packed = compress_json(SAMPLE).unwrap();
        let truncated = &packed[..packed.len() / 2];
        assert!(decompress_json(truncated).is_err());
    }
}
