//! proptest strategies for the transaction types.

use proptest::collection::vec;
use proptest::prelude::*;

use crate::instruction::{AccountRef, Instruction};
use crate::message::Message;
use crate::pubkey::Identity;
use crate::transaction::{Signature, SignedTransaction};

pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>().prop_map(Identity::new)
}

pub fn account() -> impl Strategy<Value = AccountRef> {
    (identity(), any::<bool>(), any::<bool>())
        .prop_map(|(id, is_signer, is_writable)| AccountRef::new(id, is_signer, is_writable))
}

pub fn instruction() -> impl Strategy<Value = Instruction> {
    (identity(), vec(account(), 0..4), vec(any::<u8>(), 0..64)).prop_map(
        |(program_id, accounts, data)| Instruction {
            program_id,
            accounts,
            data,
        },
    )
}

/// Messages whose signer list is independent of the account flags, so the
/// codec sees combinations `assemble` would never produce.
pub fn message() -> impl Strategy<Value = Message> {
    (vec(identity(), 0..4), vec(instruction(), 0..4)).prop_map(|(signers, instructions)| Message {
        signers,
        instructions,
    })
}

pub fn signature() -> impl Strategy<Value = Signature> {
    vec(any::<u8>(), Signature::LEN).prop_map(|bytes| {
        let mut arr = [0u8; Signature::LEN];
        arr.copy_from_slice(&bytes);
        Signature(arr)
    })
}

pub fn signed_transaction() -> impl Strategy<Value = SignedTransaction> {
    message()
        .prop_flat_map(|message| {
            let n = message.signers.len();
            (Just(message), vec(signature(), n))
        })
        .prop_map(|(message, signatures)| {
            SignedTransaction::new(message, signatures).expect("one signature per signer")
        })
}
