//! Credential generation for newly created entities.

use fleetbook_core::entity::Credential;
use rand_core::{OsRng, RngCore};

use crate::Result;

pub const CREDENTIAL_LEN: usize = 10;

/// ASCII letters, digits and punctuation.
pub const CREDENTIAL_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz\
ABCDEFGHIJKLMNOPQRSTUVWXYZ\
0123456789\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// A fresh credential from the operating system's RNG.
pub fn generate_credential() -> Result<Credential> { generate_with(&mut OsRng) }

/// Draw [`CREDENTIAL_LEN`] characters uniformly from
/// [`CREDENTIAL_ALPHABET`].
///
/// Bytes at or above the largest multiple of the alphabet size are rejected
/// so every character is equally likely.
pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Result<Credential> {
  let n = CREDENTIAL_ALPHABET.len();
  let limit = 256 - 256 % n;

  let mut out = String::with_capacity(CREDENTIAL_LEN);
  let mut buf = [0u8; 32];
  while out.len() < CREDENTIAL_LEN {
    rng.try_fill_bytes(&mut buf)?;
    for &b in buf.iter().filter(|&&b| usize::from(b) < limit) {
      out.push(char::from(CREDENTIAL_ALPHABET[usize::from(b) % n]));
      if out.len() == CREDENTIAL_LEN {
        break;
      }
    }
  }
  Ok(Credential::new(out))
}
