use drand_verify::Pubkey;
use sha2::{Digest, Sha256};

use crate::error::ContractError;

/// Quicknet public key (G2, 96 bytes), hex encoded.
/// Network: drand quicknet (bls-unchained-g1-rfc9380)
pub const QUICKNET_PK_HEX: &str = "83cf0f2896adee7eb8b5f01fcad3912212c437e0073e911fb90022d3e760183c8c4b450b6a0a6c3ac6a5776a2d1064510d1fec758c921cc22b0e17e63aaf4bcb5ed66304de9cf809bd274ca73bab4af5a6e9c76a4bc09e76eae8991ef5ece45a";

/// Decode a hex field, naming it in the error.
pub fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, ContractError> {
    hex::decode(value).map_err(|_| ContractError::InvalidHex {
        field: field.to_string(),
    })
}

/// Check a quicknet beacon signature and return the beacon randomness,
/// `sha256(signature)`.
///
/// Quicknet is unchained, so the message is the round number alone.
pub fn verify_beacon(
    pubkey_bytes: &[u8],
    round: u64,
    signature: &[u8],
) -> Result<[u8; 32], ContractError> {
    let pk_fixed: [u8; 96] =
        pubkey_bytes
            .try_into()
            .map_err(|_| ContractError::InvalidPubkeyLength {
                got: pubkey_bytes.len(),
            })?;

    let pk = drand_verify::G2PubkeyRfc::from_fixed(pk_fixed).map_err(|_| {
        ContractError::VerificationFailed {
            reason: "invalid pubkey (failed to parse G2 point)".to_string(),
        }
    })?;

    let valid = pk
        .verify(round, &[], signature)
        .map_err(|e| ContractError::VerificationFailed {
            reason: format!("{:?}", e),
        })?;
    if !valid {
        return Err(ContractError::VerificationFailed {
            reason: format!("invalid signature for round {}", round),
        });
    }

    Ok(Sha256::digest(signature).into())
}
