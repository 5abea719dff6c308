//! Signed transaction envelope.
//!
//! ```text
//! SignedTransaction:
//!   version            u32 LE
//!   num_signatures     u8
//!   signatures         64 bytes * num_signatures
//!   message            (see `message`)
//! ```
//!
//! `signatures[i]` belongs to `message.signers[i]`; pairing is positional.

use std::fmt;

use arch_codec::{CodecError, Fields, LenPrefix, Record, Schema, Value};
use serde::ser::{Serialize, Serializer};

use crate::error::TxError;
use crate::message::Message;

/// Envelope version understood by the ledger.
pub const TRANSACTION_VERSION: u32 = 0;

/// A normalized 64-byte signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub const LEN: usize = 64;

    pub fn from_slice(bytes: &[u8]) -> Result<Self, TxError> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            TxError::InvalidSignature(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Signature(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

// serde only derives arrays up to 32 elements; emit a plain number sequence.
impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// A message together with one signature per required signer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SignedTransaction {
    pub version: u32,
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl SignedTransaction {
    /// Wrap `message` with `signatures`, which must pair one-to-one with
    /// `message.signers`.
    ///
    /// Fewer signatures than signers is [`TxError::MissingSignature`]; a
    /// partially signed transaction is never built.
    pub fn new(message: Message, signatures: Vec<Signature>) -> Result<Self, TxError> {
        let expected = message.signers.len();
        let got = signatures.len();
        if got < expected {
            return Err(TxError::MissingSignature { expected, got });
        }
        if got > expected {
            return Err(TxError::SignatureCountMismatch { expected, got });
        }

        Ok(SignedTransaction {
            version: TRANSACTION_VERSION,
            signatures,
            message,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TxError> {
        Ok(self.encode()?)
    }
}

impl Record for SignedTransaction {
    fn schema() -> Schema {
        Schema::record([
            ("version", Schema::U32),
            ("signatures", Schema::vec(LenPrefix::U8, Schema::Bytes(Signature::LEN))),
            ("message", Message::schema()),
        ])
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            ("version", self.version.into()),
            (
                "signatures",
                Value::List(self.signatures.iter().map(|s| Value::from(s.0)).collect()),
            ),
            ("message", self.message.to_value()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = Fields::new(value, "")?;
        let version = f.u32("version")?;
        let signatures = f
            .list("signatures")?
            .into_iter()
            .map(|v| match v {
                Value::Bytes(b) if b.len() == Signature::LEN => {
                    let mut arr = [0u8; 64];
                    arr.copy_from_slice(&b);
                    Ok(Signature(arr))
                }
                other => Err(CodecError::MalformedInput {
                    field: "signatures".into(),
                    reason: format!("expected 64-byte signature, found {}", other.kind()),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let message = Message::from_value(f.take("message")?)?;
        Ok(SignedTransaction {
            version,
            signatures,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{build_instruction, event_instruction, AccountRef, Operation};
    use crate::message::assemble;
    use crate::pubkey::Identity;
    use crate::strategies;
    use proptest::prelude::*;

    fn id(b: u8) -> Identity {
        Identity::new([b; 32])
    }

    fn one_signer_message() -> Message {
        let ix = event_instruction(id(1), id(2), id(3), &Operation::close_event([6; 32])).unwrap();
        assemble(vec![ix])
    }

    fn two_signer_message() -> Message {
        let ix = build_instruction(
            id(1),
            vec![AccountRef::signer(id(3)), AccountRef::signer(id(4))],
            &Operation::close_event([6; 32]),
        )
        .unwrap();
        assemble(vec![ix])
    }

    #[test]
    fn matching_signatures_build_version_zero() {
        let tx = SignedTransaction::new(one_signer_message(), vec![Signature([9; 64])]).unwrap();
        assert_eq!(tx.version, 0);
        assert_eq!(tx.signatures.len(), tx.message.signers.len());
    }

    #[test]
    fn fewer_signatures_is_missing_signature() {
        let err = SignedTransaction::new(two_signer_message(), vec![Signature([9; 64])]).unwrap_err();
        assert_eq!(err, TxError::MissingSignature { expected: 2, got: 1 });
    }

    #[test]
    fn no_signatures_is_missing_signature() {
        let err = SignedTransaction::new(one_signer_message(), vec![]).unwrap_err();
        assert!(matches!(err, TxError::MissingSignature { .. }));
    }

    #[test]
    fn extra_signatures_are_rejected() {
        let err = SignedTransaction::new(
            one_signer_message(),
            vec![Signature([1; 64]), Signature([2; 64])],
        )
        .unwrap_err();
        assert_eq!(err, TxError::SignatureCountMismatch { expected: 1, got: 2 });
    }

    #[test]
    fn signature_from_slice_checks_length() {
        assert!(Signature::from_slice(&[0; 64]).is_ok());
        assert!(Signature::from_slice(&[0; 63]).is_err());
        assert!(Signature::from_slice(&[0; 66]).is_err());
    }

    #[test]
    fn wire_layout_and_roundtrip() {
        let tx = SignedTransaction::new(one_signer_message(), vec![Signature([0xab; 64])]).unwrap();
        let bytes = tx.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..69], &[0xab; 64]);
        assert_eq!(&bytes[69..], tx.message.to_bytes().unwrap().as_slice());
        assert_eq!(SignedTransaction::decode(&bytes).unwrap(), tx);
    }

    #[test]
    fn json_shape_matches_rpc() {
        let tx = SignedTransaction::new(one_signer_message(), vec![Signature([7; 64])]).unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["version"], 0);
        assert_eq!(json["signatures"][0].as_array().unwrap().len(), 64);
        assert_eq!(json["message"]["signers"][0].as_array().unwrap().len(), 32);
        assert_eq!(
            json["message"]["instructions"][0]["accounts"][1]["is_signer"],
            true
        );
    }

    #[test]
    fn debug_shows_hex() {
        let dbg = format!("{:?}", Signature([0x0f; 64]));
        assert!(dbg.starts_with("Signature(0f0f"));
    }

    proptest! {
        #[test]
        fn signed_transaction_roundtrips(tx in strategies::signed_transaction()) {
            let bytes = tx.to_bytes().unwrap();
            prop_assert_eq!(SignedTransaction::decode(&bytes).unwrap(), tx);
        }

        #[test]
        fn every_short_transaction_is_malformed(tx in strategies::signed_transaction()) {
            let bytes = tx.to_bytes().unwrap();
            for cut in 0..bytes.len() {
                let err = SignedTransaction::decode(&bytes[..cut]).unwrap_err();
                prop_assert!(matches!(err, CodecError::MalformedInput { .. }), "cut {}: {:?}", cut, err);
            }
        }
    }
}
