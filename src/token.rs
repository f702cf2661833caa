//! Token stream coding over two PPM models.
//!
//! A stream of tokens (byte strings without NUL) is coded as a sequence of
//! dictionary indices. The first occurrence of a token codes the next unused
//! index as a "new token" marker, followed by the token's spelling and a NUL
//! terminator through a second PPM model. Before each index is coded, every
//! index above the next unused one is excluded from the sequence model,
//! since no such token can occur yet.
//!
//! At most 256 distinct tokens fit, one per byte value.

use std::collections::HashMap;
use std::io::{Read, Write};

use tracing::debug;

use crate::coder::{ArithDecoder, ArithEncoder};
use crate::error::{ArithError, Result};
use crate::model::{ByteSet, PpmModel, Symbol};
use crate::stream::{decode_symbol, encode_symbol};

/// Number of distinct tokens a stream can define.
pub const MAX_TOKENS: usize = 256;

/// Spelling terminator.
const TERMINATOR: u8 = 0;

/// Indices above `next_index`, as a set of impossible outcomes.
#[derive(Debug, Clone)]
struct Dictionary {
    next_index: usize,
    impossible: ByteSet,
}

impl Dictionary {
    fn new() -> Self {
        let mut impossible = ByteSet::full();
        impossible.remove(0);
        Self {
            next_index: 0,
            impossible,
        }
    }

    /// Index the next new token receives, if any remain.
    fn marker(&self) -> Option<u8> {
        u8::try_from(self.next_index).ok()
    }

    fn define(&mut self) {
        self.next_index += 1;
        if let Some(marker) = self.marker() {
            self.impossible.remove(marker);
        }
    }
}

/// Encodes tokens into an arithmetic-coded stream.
pub struct TokenStreamEncoder<W: Write> {
    encoder: ArithEncoder<W>,
    sequence: PpmModel,
    spelling: PpmModel,
    indices: HashMap<Vec<u8>, u8>,
    dictionary: Dictionary,
    tokens_coded: u64,
}

impl<W: Write> TokenStreamEncoder<W> {
    /// Create an encoder writing to `inner`. `sequence_order` is the PPM
    /// order over token indices and `spelling_order` the order over the
    /// bytes of new tokens.
    pub fn new(inner: W, sequence_order: usize, spelling_order: usize) -> Self {
        Self {
            encoder: ArithEncoder::new(inner),
            sequence: PpmModel::new(sequence_order),
            spelling: PpmModel::new(spelling_order),
            indices: HashMap::new(),
            dictionary: Dictionary::new(),
            tokens_coded: 0,
        }
    }

    /// Number of distinct tokens seen.
    pub fn distinct_tokens(&self) -> usize {
        self.indices.len()
    }

    /// Code one token.
    ///
    /// Fails with [`ArithError::TokenContainsNul`] if the token contains a
    /// NUL byte, or [`ArithError::TooManyTokens`] if it would be the 257th
    /// distinct token. Nothing is coded on failure.
    pub fn encode(&mut self, token: &[u8]) -> Result<()> {
        if let Some(&index) = self.indices.get(token) {
            self.sequence.exclude_all(&self.dictionary.impossible);
            encode_symbol(&mut self.encoder, &mut self.sequence, Symbol::Byte(index))?;
        } else {
            if token.contains(&TERMINATOR) {
                return Err(ArithError::TokenContainsNul);
            }
            let marker = self.dictionary.marker().ok_or(ArithError::TooManyTokens)?;
            self.sequence.exclude_all(&self.dictionary.impossible);
            encode_symbol(&mut self.encoder, &mut self.sequence, Symbol::Byte(marker))?;
            for &byte in token.iter().chain(&[TERMINATOR]) {
                encode_symbol(&mut self.encoder, &mut self.spelling, Symbol::Byte(byte))?;
            }
            self.indices.insert(token.to_vec(), marker);
            self.dictionary.define();
        }
        self.tokens_coded += 1;
        Ok(())
    }

    /// Code the end of the token stream and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.sequence.exclude_all(&self.dictionary.impossible);
        encode_symbol(&mut self.encoder, &mut self.sequence, Symbol::Eof)?;
        debug!(
            tokens = self.tokens_coded,
            distinct = self.indices.len(),
            bits = self.encoder.bits_written(),
            "finished token stream"
        );
        Ok(self.encoder.finish()?)
    }
}

/// Decodes tokens written by a [`TokenStreamEncoder`] with the same orders.
pub struct TokenStreamDecoder<R: Read> {
    decoder: ArithDecoder<R>,
    sequence: PpmModel,
    spelling: PpmModel,
    tokens: Vec<Vec<u8>>,
    dictionary: Dictionary,
    done: bool,
}

impl<R: Read> TokenStreamDecoder<R> {
    /// Create a decoder reading from `inner`.
    pub fn new(inner: R, sequence_order: usize, spelling_order: usize) -> Result<Self> {
        Ok(Self {
            decoder: ArithDecoder::new(inner)?,
            sequence: PpmModel::new(sequence_order),
            spelling: PpmModel::new(spelling_order),
            tokens: Vec::new(),
            dictionary: Dictionary::new(),
            done: false,
        })
    }

    /// Tokens defined so far, in index order.
    pub fn dictionary(&self) -> &[Vec<u8>] {
        &self.tokens
    }

    /// Decode the next token; `None` at the end of the stream.
    pub fn next_token(&mut self) -> Result<Option<Vec<u8>>> {
        if self.done || self.decoder.end_of_stream() {
            self.done = true;
            return Ok(None);
        }
        self.sequence.exclude_all(&self.dictionary.impossible);
        let index = match decode_symbol(&mut self.decoder, &mut self.sequence)? {
            Symbol::Byte(index) => index,
            _ => {
                self.done = true;
                return Ok(None);
            }
        };
        if let Some(token) = self.tokens.get(usize::from(index)) {
            return Ok(Some(token.clone()));
        }
        if usize::from(index) != self.dictionary.next_index {
            return Err(ArithError::UnknownToken(index));
        }
        let mut token = Vec::new();
        loop {
            match decode_symbol(&mut self.decoder, &mut self.spelling)? {
                Symbol::Byte(TERMINATOR) => break,
                Symbol::Byte(byte) => token.push(byte),
                _ => {
                    // only a corrupt stream ends mid-spelling
                    self.done = true;
                    return Ok(None);
                }
            }
        }
        self.tokens.push(token.clone());
        self.dictionary.define();
        Ok(Some(token))
    }
}

impl<R: Read> Iterator for TokenStreamDecoder<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(tokens: &[&[u8]]) -> Vec<u8> {
        let mut encoder = TokenStreamEncoder::new(Vec::new(), 2, 3);
        for token in tokens {
            encoder.encode(token).unwrap();
        }
        encoder.finish().unwrap()
    }

    fn decode_all(coded: &[u8]) -> Vec<Vec<u8>> {
        TokenStreamDecoder::new(coded, 2, 3)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_roundtrip_words() {
        let text = "the cat sat on the mat and the cat ate the rat";
        let tokens: Vec<&[u8]> = text.split(' ').map(str::as_bytes).collect();
        let coded = encode_all(&tokens);
        let decoded = decode_all(&coded);
        assert_eq!(decoded, tokens);
    }

    #[test]
    fn test_empty_stream_and_empty_token() {
        assert!(decode_all(&encode_all(&[])).is_empty());
        let tokens: &[&[u8]] = &[b"", b"x", b"", b""];
        assert_eq!(decode_all(&encode_all(tokens)), tokens);
    }

    #[test]
    fn test_dictionary_assigns_indices_in_order() {
        let tokens: &[&[u8]] = &[b"b", b"a", b"b", b"c"];
        let coded = encode_all(tokens);
        let mut decoder = TokenStreamDecoder::new(&coded[..], 2, 3).unwrap();
        while decoder.next_token().unwrap().is_some() {}
        assert_eq!(decoder.dictionary(), &[b"b".to_vec(), b"a".to_vec(), b"c".to_vec()]);
        assert!(decoder.next_token().unwrap().is_none());
    }

    #[test]
    fn test_nul_rejected() {
        let mut encoder = TokenStreamEncoder::new(Vec::new(), 1, 1);
        let err = encoder.encode(b"a\0b").unwrap_err();
        assert!(matches!(err, ArithError::TokenContainsNul));
        assert_eq!(encoder.distinct_tokens(), 0);
    }

    #[test]
    fn test_token_limit() {
        let names: Vec<Vec<u8>> = (0..MAX_TOKENS).map(|i| format!("t{i}").into_bytes()).collect();
        let mut encoder = TokenStreamEncoder::new(Vec::new(), 2, 3);
        for name in &names {
            encoder.encode(name).unwrap();
        }
        let err = encoder.encode(b"one too many").unwrap_err();
        assert!(matches!(err, ArithError::TooManyTokens));
        // known tokens are still accepted
        encoder.encode(b"t7").unwrap();
        let coded = encoder.finish().unwrap();

        let decoded = decode_all(&coded);
        assert_eq!(decoded.len(), MAX_TOKENS + 1);
        assert_eq!(&decoded[..MAX_TOKENS], &names[..]);
        assert_eq!(decoded[MAX_TOKENS], b"t7");
    }

    #[test]
    fn test_repeated_tokens_compress() {
        let tokens: Vec<&[u8]> = [b"alpha" as &[u8], b"beta", b"gamma"]
            .iter()
            .copied()
            .cycle()
            .take(3000)
            .collect();
        let coded = encode_all(&tokens);
        assert!(coded.len() < 100, "{} bytes", coded.len());
        assert_eq!(decode_all(&coded), tokens);
    }
}
