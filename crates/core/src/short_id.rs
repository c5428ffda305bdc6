//! Short public identifiers derived from sequential database ids.
//!
//! A form is inserted with a random UUID and, once its BIGSERIAL id is
//! known, receives a short token computed from that id. Tokens follow the
//! Hashids scheme for a single number with the default alphabet and no
//! minimum length, so links issued by earlier Hashids-based deployments
//! with the same salt keep resolving.
//!
//! Setup: separator characters are pulled out of the alphabet, a few more
//! are reserved as guards, and what is left is shuffled with the salt.
//! Encoding: a "lottery" character is picked from `id % 100`, the alphabet
//! is reshuffled with the lottery and salt, and the id is written in that
//! base. The lottery character is emitted first so decoding can rebuild
//! the alphabet.

/// Characters used in public identifiers.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Candidates for the characters that separate numbers in multi-number
/// tokens. They never carry digits.
const SEPARATORS: &[u8] = b"cfhistuCFHISTU";

/// Alphabet-to-separator ratio is kept at or below 7:2.
const SEPARATOR_RATIO: (usize, usize) = (7, 2);

/// One guard per this many alphabet characters, rounded up.
const GUARD_DIV: usize = 12;

/// Encodes and decodes short public identifiers.
#[derive(Debug, Clone)]
pub struct ShortIdCodec {
    salt: Vec<u8>,
    alphabet: Vec<u8>,
    separators: Vec<u8>,
    guards: Vec<u8>,
}

impl Default for ShortIdCodec {
    fn default() -> Self {
        Self::new("")
    }
}

impl ShortIdCodec {
    pub fn new(salt: &str) -> Self {
        let salt = salt.as_bytes().to_vec();

        let mut separators: Vec<u8> = SEPARATORS
            .iter()
            .copied()
            .filter(|c| ALPHABET.contains(c))
            .collect();
        let mut alphabet: Vec<u8> = ALPHABET
            .iter()
            .copied()
            .filter(|c| !separators.contains(c))
            .collect();
        consistent_shuffle(&mut separators, &salt);

        let (num, den) = SEPARATOR_RATIO;
        if separators.is_empty() || alphabet.len() * den > separators.len() * num {
            let wanted = (alphabet.len() * den).div_ceil(num).max(2);
            if wanted > separators.len() {
                let moved = wanted - separators.len();
                separators.extend(alphabet.drain(..moved));
            } else {
                separators.truncate(wanted);
            }
        }
        consistent_shuffle(&mut alphabet, &salt);

        let guard_count = alphabet.len().div_ceil(GUARD_DIV);
        let guards = if alphabet.len() < 3 {
            separators.drain(..guard_count).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Self {
            salt,
            alphabet,
            separators,
            guards,
        }
    }

    /// Encode a sequential id.
    pub fn encode(&self, id: u64) -> String {
        let lottery = self.alphabet[(id % 100) as usize % self.alphabet.len()];
        let alphabet = self.lottery_alphabet(lottery);

        let mut out = vec![lottery];
        out.extend(to_base(id, &alphabet));
        // Every byte comes from the ASCII alphabet.
        out.into_iter().map(char::from).collect()
    }

    /// Decode a public identifier back to the sequential id.
    ///
    /// Returns `None` for tokens this codec could not have produced,
    /// including multi-number Hashids.
    pub fn decode(&self, token: &str) -> Option<u64> {
        let pieces: Vec<&[u8]> = token
            .as_bytes()
            .split(|b| self.guards.contains(b))
            .collect();
        let body = match pieces.len() {
            2 | 3 => pieces[1],
            _ => pieces[0],
        };

        let (&lottery, digits) = body.split_first()?;
        if digits.is_empty() || digits.iter().any(|b| self.separators.contains(b)) {
            return None;
        }
        let alphabet = self.lottery_alphabet(lottery);
        let id = from_base(digits, &alphabet)?;

        (self.encode(id) == token).then_some(id)
    }

    /// The alphabet reshuffled with `lottery + salt + alphabet`, cut to the
    /// alphabet's length.
    fn lottery_alphabet(&self, lottery: u8) -> Vec<u8> {
        let mut seed = Vec::with_capacity(self.alphabet.len());
        seed.push(lottery);
        seed.extend_from_slice(&self.salt);
        seed.extend_from_slice(&self.alphabet);
        seed.truncate(self.alphabet.len());

        let mut alphabet = self.alphabet.clone();
        consistent_shuffle(&mut alphabet, &seed);
        alphabet
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deterministically permute `alphabet` using `salt`. No-op for an empty salt.
fn consistent_shuffle(alphabet: &mut [u8], salt: &[u8]) {
    if salt.is_empty() {
        return;
    }
    let mut v = 0usize;
    let mut p = 0usize;
    for i in (1..alphabet.len()).rev() {
        v %= salt.len();
        let n = salt[v] as usize;
        p += n;
        let j = (n + v + p) % i;
        alphabet.swap(i, j);
        v += 1;
    }
}

fn to_base(mut n: u64, alphabet: &[u8]) -> Vec<u8> {
    let base = alphabet.len() as u64;
    let mut digits = Vec::new();
    loop {
        digits.push(alphabet[(n % base) as usize]);
        n /= base;
        if n == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}

fn from_base(digits: &[u8], alphabet: &[u8]) -> Option<u64> {
    let base = alphabet.len() as u64;
    digits.iter().try_fold(0u64, |acc, d| {
        let pos = alphabet.iter().position(|a| a == d)? as u64;
        acc.checked_mul(base)?.checked_add(pos)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
