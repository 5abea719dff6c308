//! Local BIP-322 "simple" signer for key-path Taproot addresses.
//!
//! BIP-322 signs a message by spending a virtual output that commits to it:
//!
//! ```text
//! to_spend:  version 0, locktime 0
//!   in:  prevout 000..000:0xffffffff, sequence 0,
//!        script_sig = OP_0 PUSH32(tagged_hash("BIP0322-signed-message", msg))
//!   out: value 0, script_pubkey = P2TR(signer)
//!
//! to_sign:   version 0, locktime 0
//!   in:  prevout to_spend:0, sequence 0
//!   out: value 0, script_pubkey = OP_RETURN
//! ```
//!
//! The "simple" encoding is the consensus-serialized witness of the
//! `to_sign` input. For a key-path spend that is `[0x01][0x40][sig64]`.

use std::sync::Mutex;

use arch_tx::Identity;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash;
use bitcoin::key::TapTweak;
use bitcoin::opcodes::all::OP_RETURN;
use bitcoin::opcodes::OP_0;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::secp256k1::{schnorr, Keypair, Message, Secp256k1, SecretKey, XOnlyPublicKey};
use bitcoin::sighash::{Prevouts, SighashCache, TapSighashType};
use bitcoin::transaction::Version;
use bitcoin::{
    Address, Amount, Network, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness,
};
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::SignerError;
use crate::wallet::{SigningScheme, WalletCapability};

const BIP322_TAG: &[u8] = b"BIP0322-signed-message";

/// Chains [`LocalKeySigner::switch_chain`] accepts.
const KNOWN_CHAINS: &[(&str, Network)] = &[
    ("BITCOIN_MAINNET", Network::Bitcoin),
    ("BITCOIN_TESTNET", Network::Testnet),
    ("BITCOIN_TESTNET4", Network::Testnet),
    ("BITCOIN_SIGNET", Network::Signet),
    ("BITCOIN_REGTEST", Network::Regtest),
];

// ---------------------------------------------------------------------------
// BIP-322 construction
// ---------------------------------------------------------------------------

fn message_hash(message: &[u8]) -> [u8; 32] {
    let tag = Sha256::digest(BIP322_TAG);
    let mut engine = Sha256::new();
    engine.update(tag);
    engine.update(tag);
    engine.update(message);
    engine.finalize().into()
}

fn to_spend(script_pubkey: ScriptBuf, message: &[u8]) -> Result<Transaction, SignerError> {
    let commitment = PushBytesBuf::try_from(message_hash(message).to_vec())
        .map_err(|e| SignerError::SigningError(format!("message commitment: {e}")))?;

    Ok(Transaction {
        version: Version(0),
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: Builder::new()
                .push_opcode(OP_0)
                .push_slice(commitment)
                .into_script(),
            sequence: Sequence::ZERO,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::ZERO,
            script_pubkey,
        }],
    })
}

fn to_sign(to_spend: &Transaction) -> Transaction {
    Transaction {
        version: Version(0),
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::new(to_spend.compute_txid(), 0),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::ZERO,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::ZERO,
            script_pubkey: Builder::new().push_opcode(OP_RETURN).into_script(),
        }],
    }
}

/// Taproot key-spend sighash of the `to_sign` transaction for `message`.
fn signature_hash(internal_key: XOnlyPublicKey, message: &[u8]) -> Result<Message, SignerError> {
    let secp = Secp256k1::verification_only();
    let script_pubkey = ScriptBuf::new_p2tr(&secp, internal_key, None);
    let spend = to_spend(script_pubkey, message)?;
    let sign = to_sign(&spend);

    let prevouts = [spend.output[0].clone()];
    let mut cache = SighashCache::new(&sign);
    let sighash = cache
        .taproot_key_spend_signature_hash(0, &Prevouts::All(&prevouts), TapSighashType::Default)
        .map_err(|e| SignerError::SigningError(format!("sighash computation failed: {e}")))?;

    Ok(Message::from_digest(sighash.to_byte_array()))
}

/// Check a normalized 64-byte BIP-322 simple signature against the
/// identity's key-path Taproot output.
pub fn verify_simple(identity: &Identity, message: &[u8], signature: &[u8; 64]) -> bool {
    let Ok(internal_key) = XOnlyPublicKey::from_slice(identity.as_bytes()) else {
        return false;
    };
    let Ok(sig) = schnorr::Signature::from_slice(signature) else {
        return false;
    };
    let Ok(msg) = signature_hash(internal_key, message) else {
        return false;
    };

    let secp = Secp256k1::verification_only();
    let (tweaked, _parity) = internal_key.tap_tweak(&secp, None);
    secp.verify_schnorr(&sig, &msg, &tweaked.to_inner()).is_ok()
}

// ---------------------------------------------------------------------------
// Local key signer
// ---------------------------------------------------------------------------

/// An in-process wallet backed by a single secp256k1 key.
///
/// Produces the same signature blobs as browser-extension wallets, which
/// makes it suitable for CLIs, scripted flows, and tests.
pub struct LocalKeySigner {
    keypair: Keypair,
    network: Mutex<Network>,
}

impl LocalKeySigner {
    /// Create from a 32-byte secret key.
    pub fn new(private_key: &[u8; 32], network: Network) -> Result<Self, SignerError> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|e| SignerError::InvalidKey(format!("invalid secret key: {e}")))?;

        Ok(LocalKeySigner {
            keypair: Keypair::from_secret_key(&secp, &secret_key),
            network: Mutex::new(network),
        })
    }

    /// Create from a hex-encoded secret key.
    pub fn from_hex(private_key_hex: &str, network: Network) -> Result<Self, SignerError> {
        let bytes = Zeroizing::new(
            hex::decode(private_key_hex.trim())
                .map_err(|e| SignerError::InvalidKey(format!("hex decode failed: {e}")))?,
        );
        let mut key = Zeroizing::new([0u8; 32]);
        if bytes.len() != 32 {
            return Err(SignerError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        key.copy_from_slice(&bytes);
        Self::new(&key, network)
    }

    /// The signer's ledger identity (its untweaked x-only key).
    pub fn identity(&self) -> Identity {
        let (xonly, _parity) = self.keypair.x_only_public_key();
        Identity::new(xonly.serialize())
    }

    fn network(&self) -> Result<Network, SignerError> {
        self.network
            .lock()
            .map(|n| *n)
            .map_err(|_| SignerError::Wallet("network lock poisoned".into()))
    }

    /// Key-path Taproot address for the active network.
    pub fn address(&self) -> Result<String, SignerError> {
        let secp = Secp256k1::verification_only();
        let (xonly, _parity) = self.keypair.x_only_public_key();
        Ok(Address::p2tr(&secp, xonly, None, self.network()?).to_string())
    }

    /// BIP-322 simple signature over `message`, as raw witness bytes.
    pub fn sign_simple(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let secp = Secp256k1::new();
        let (internal_key, _parity) = self.keypair.x_only_public_key();
        let msg = signature_hash(internal_key, message)?;

        let tweaked = self.keypair.tap_tweak(&secp, None).to_inner();
        let signature = secp.sign_schnorr_no_aux_rand(&msg, &tweaked);

        let witness = Witness::from_slice(&[signature.serialize().as_slice()]);
        Ok(bitcoin::consensus::serialize(&witness))
    }
}

impl Drop for LocalKeySigner {
    fn drop(&mut self) {
        self.keypair.non_secure_erase();
    }
}

#[async_trait]
impl WalletCapability for LocalKeySigner {
    async fn switch_chain(&self, chain: &str) -> Result<(), SignerError> {
        let network = KNOWN_CHAINS
            .iter()
            .find(|(name, _)| *name == chain)
            .map(|(_, n)| *n)
            .ok_or_else(|| SignerError::Wallet(format!("unsupported chain {chain}")))?;

        *self
            .network
            .lock()
            .map_err(|_| SignerError::Wallet("network lock poisoned".into()))? = network;
        debug!(chain, "switched local signer network");
        Ok(())
    }

    async fn request_accounts(&self) -> Result<Vec<String>, SignerError> {
        Ok(vec![self.address()?])
    }

    async fn get_public_key(&self) -> Result<String, SignerError> {
        Ok(hex::encode(self.keypair.public_key().serialize()))
    }

    async fn sign_message(
        &self,
        message: &str,
        scheme: SigningScheme,
    ) -> Result<String, SignerError> {
        if scheme != SigningScheme::Bip322Simple {
            return Err(SignerError::Wallet(format!(
                "local signer does not support {scheme}"
            )));
        }
        Ok(STANDARD.encode(self.sign_simple(message.as_bytes())?))
    }
}
