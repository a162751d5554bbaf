//! Key generation and token minting shared by the unit tests.

use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroup, EcKey};
use openssl::nid::Nid;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use serde_json::{json, Value};

pub(crate) const REGION: &str = "us-east-1";
pub(crate) const POOL_ID: &str = "pool123";
pub(crate) const ISSUER: &str = "https://cognito-idp.us-east-1.amazonaws.com/pool123";

/// An RSA key pair published under `kid`.
pub(crate) struct TestKey {
    pub(crate) kid: String,
    pub(crate) n: String,
    pub(crate) e: String,
    encoding_key: EncodingKey,
}

impl TestKey {
    pub(crate) fn generate(kid: &str) -> TestKey {
        let rsa = Rsa::generate(2048).expect("Failed to generate RSA key");
        let private_pem = rsa
            .private_key_to_pem()
            .expect("Failed to export private key");
        let encoding_key = EncodingKey::from_rsa_pem(&private_pem)
            .expect("Failed to create encoding key");

        TestKey {
            kid: kid.to_owned(),
            n: BASE64_URL_SAFE_NO_PAD.encode(rsa.n().to_vec()),
            e: BASE64_URL_SAFE_NO_PAD.encode(rsa.e().to_vec()),
            encoding_key,
        }
    }

    /// Signs `claims` with RS256, naming this key in the header.
    pub(crate) fn sign(&self, claims: &Value) -> String {
        self.sign_with_kid(Some(&self.kid), claims)
    }

    pub(crate) fn sign_with_kid(&self, kid: Option<&str>, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(Into::into);
        encode(&header, claims, &self.encoding_key).expect("Failed to sign token")
    }

    pub(crate) fn jwk(&self) -> Value {
        json!({
            "kid": self.kid,
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "n": self.n,
            "e": self.e,
        })
    }
}

pub(crate) fn jwks_body(keys: &[&TestKey]) -> Value {
    json!({ "keys": keys.iter().map(|key| key.jwk()).collect::<Vec<_>>() })
}

pub(crate) fn now_as_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Claims of a fresh access token for `sub` issued by [`ISSUER`].
pub(crate) fn access_claims(sub: &str) -> Value {
    let now = now_as_secs();
    json!({
        "iss": ISSUER,
        "token_use": "access",
        "sub": sub,
        "client_id": "app-client",
        "username": sub,
        "scope": "openid profile",
        "cognito:groups": ["admins"],
        "iat": now,
        "exp": now + 3600,
    })
}

/// Flips bit `bit` of the decoded signature and re-encodes the token.
pub(crate) fn flip_signature_bit(token: &str, bit: usize) -> String {
    let (signed, signature) = token.rsplit_once('.').unwrap();
    let mut bytes = BASE64_URL_SAFE_NO_PAD.decode(signature).unwrap();
    bytes[bit / 8] ^= 1 << (bit % 8);
    format!("{signed}.{}", BASE64_URL_SAFE_NO_PAD.encode(bytes))
}

/// Flips the lowest bit of the first signature byte.
pub(crate) fn tamper_signature(token: &str) -> String {
    flip_signature_bit(token, 0)
}

/// An EC P-256 key pair published under `kid`.
pub(crate) struct TestEcKey {
    pub(crate) kid: String,
    x: String,
    y: String,
    encoding_key: EncodingKey,
}

impl TestEcKey {
    pub(crate) fn generate(kid: &str) -> TestEcKey {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).expect("Unknown curve");
        let ec = EcKey::generate(&group).expect("Failed to generate EC key");

        let mut ctx = BigNumContext::new().unwrap();
        let mut x = BigNum::new().unwrap();
        let mut y = BigNum::new().unwrap();
        ec.public_key()
            .affine_coordinates(&group, &mut x, &mut y, &mut ctx)
            .expect("Failed to read public point");

        let private_pem = PKey::from_ec_key(ec)
            .and_then(|pkey| pkey.private_key_to_pem_pkcs8())
            .expect("Failed to export private key");
        let encoding_key =
            EncodingKey::from_ec_pem(&private_pem).expect("Failed to create encoding key");

        TestEcKey {
            kid: kid.to_owned(),
            x: BASE64_URL_SAFE_NO_PAD.encode(x.to_vec_padded(32).unwrap()),
            y: BASE64_URL_SAFE_NO_PAD.encode(y.to_vec_padded(32).unwrap()),
            encoding_key,
        }
    }

    /// Signs `claims` with ES256, naming this key in the header.
    pub(crate) fn sign(&self, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.kid.clone());
        encode(&header, claims, &self.encoding_key).expect("Failed to sign token")
    }

    pub(crate) fn jwk(&self) -> Value {
        json!({
            "kid": self.kid,
            "kty": "EC",
            "crv": "P-256",
            "use": "sig",
            "x": self.x,
            "y": self.y,
        })
    }
}
