#![no_main]
use arithcode::{TokenStreamDecoder, TokenStreamEncoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Split on NUL; every piece is a token
    let tokens: Vec<&[u8]> = data.split(|&b| b == 0).collect();

    let mut encoder = TokenStreamEncoder::new(Vec::new(), 2, 3);
    let mut accepted = Vec::new();
    for token in tokens {
        if encoder.encode(token).is_ok() {
            accepted.push(token.to_vec());
        }
    }
    let coded = encoder.finish().unwrap();

    let decoded: Vec<Vec<u8>> = TokenStreamDecoder::new(&coded[..], 2, 3)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(decoded, accepted);
});
