use crate::errors::ConfigurationError;
use crate::games::types::{DieFace, VRFBundle};
use schnorrkel::{
    context::SigningContext,
    vrf::{VRFPreOut, VRFProof},
    ExpansionMode, Keypair, MiniSecretKey, PublicKey,
};
use std::sync::Arc;

const VRF_SIGNING_CONTEXT: &[u8] = b"dice-casino";
const VRF_OUTPUT_CONTEXT: &[u8] = b"dice-casino-roll";

/// Errors raised while checking a published VRF bundle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VrfError {
    #[error("Invalid {field} hex: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("Invalid {0} encoding")]
    InvalidEncoding(&'static str),
}

/// VRF-based dice outcome generator
pub struct VRFGameEngine {
    keypair: Arc<Keypair>,
}

impl VRFGameEngine {
    /// Create a new VRF engine with a keypair
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Create a new VRF engine with a random keypair
    pub fn new_random() -> Self {
        use rand_core::OsRng;
        let keypair = Keypair::generate_with(OsRng);
        Self::new(keypair)
    }

    /// Derive the keypair from a 32-byte hex seed so the public key survives restarts
    pub fn from_seed_hex(seed_hex: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidValue {
            field: "randomness.vrf_seed".to_string(),
            value: "<redacted>".to_string(),
            reason,
        };

        let seed = hex::decode(seed_hex.trim()).map_err(|e| invalid(e.to_string()))?;
        let mini = MiniSecretKey::from_bytes(&seed)
            .map_err(|_| invalid("seed must be exactly 32 bytes".to_string()))?;
        Ok(Self::new(mini.expand_to_keypair(ExpansionMode::Ed25519)))
    }

    /// Produce a VRF output and proof for `input_message`.
    ///
    /// The output depends only on the key and the message.
    pub fn generate_outcome(&self, input_message: String) -> VRFBundle {
        self.evaluate(input_message).1
    }

    /// Roll a die for `input_message` and return it with its proof
    pub fn generate_roll(&self, input_message: String) -> (DieFace, VRFBundle) {
        let (output, bundle) = self.evaluate(input_message);
        (Self::compute_dice_roll(&output), bundle)
    }

    fn evaluate(&self, input_message: String) -> ([u8; 32], VRFBundle) {
        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        let (inout, proof, _) = self.keypair.vrf_sign(ctx.bytes(input_message.as_bytes()));
        let output: [u8; 32] = inout.make_bytes(VRF_OUTPUT_CONTEXT);

        let bundle = VRFBundle {
            vrf_output: hex::encode(output),
            vrf_preout: hex::encode(inout.to_preout().to_bytes()),
            vrf_proof: hex::encode(proof.to_bytes()),
            public_key: self.public_key_hex(),
            input_message,
        };
        (output, bundle)
    }

    /// Compute a die face from VRF output.
    ///
    /// Reduces the first 8 bytes modulo 6; the bias is below 2^-61.
    pub fn compute_dice_roll(vrf_output: &[u8]) -> DieFace {
        let mut head = [0u8; 8];
        for (dst, src) in head.iter_mut().zip(vrf_output.iter()) {
            *dst = *src;
        }
        DieFace::from_entropy(u64::from_be_bytes(head))
    }

    /// Verify a VRF proof (public verification function)
    pub fn verify_vrf_proof(vrf_bundle: &VRFBundle, expected_input: &str) -> Result<bool, VrfError> {
        if vrf_bundle.input_message != expected_input {
            return Ok(false);
        }

        let vrf_output = decode_hex("vrf_output", &vrf_bundle.vrf_output)?;
        let preout_bytes = decode_hex("vrf_preout", &vrf_bundle.vrf_preout)?;
        let proof_bytes = decode_hex("vrf_proof", &vrf_bundle.vrf_proof)?;
        let public_key_bytes = decode_hex("public_key", &vrf_bundle.public_key)?;

        let public_key = PublicKey::from_bytes(&public_key_bytes)
            .map_err(|_| VrfError::InvalidEncoding("public key"))?;
        let preout = VRFPreOut::from_bytes(&preout_bytes)
            .map_err(|_| VrfError::InvalidEncoding("VRF pre-output"))?;
        let proof = VRFProof::from_bytes(&proof_bytes)
            .map_err(|_| VrfError::InvalidEncoding("VRF proof"))?;

        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        let Ok((inout, _)) = public_key.vrf_verify(ctx.bytes(expected_input.as_bytes()), &preout, &proof) else {
            return Ok(false);
        };

        let computed_output: [u8; 32] = inout.make_bytes(VRF_OUTPUT_CONTEXT);
        Ok(computed_output.as_slice() == vrf_output.as_slice())
    }

    /// Get the public key for this VRF engine
    pub fn public_key(&self) -> Vec<u8> {
        self.keypair.public.to_bytes().to_vec()
    }

    /// Get the public key as hex string
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key())
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, VrfError> {
    hex::decode(value).map_err(|e| VrfError::InvalidHex {
        field,
        reason: e.to_string(),
    })
}
