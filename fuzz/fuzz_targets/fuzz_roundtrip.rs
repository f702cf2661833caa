#![no_main]
use arithcode::{compress, decompress, ModelSpec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, input)) = data.split_first() else {
        return;
    };

    // Byte 0: model (0 uniform, 1 unigram, otherwise PPM of order 0-16)
    let spec = match selector % 20 {
        0 => ModelSpec::Uniform,
        1 => ModelSpec::Unigram,
        n => ModelSpec::Ppm {
            order: usize::from(n - 2) % 17,
        },
    };

    let coded = compress(input, spec.build()).unwrap();
    let decoded = decompress(&coded, spec.build()).unwrap();
    assert_eq!(decoded, input);
});
