use proptest::prelude::*;

use txforge_script::{chunk, Script};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Pushed data decodes back to the same payload.
    #[test]
    fn push_data_roundtrip(data in prop::collection::vec(any::<u8>(), 1..300)) {
        let mut script = Script::new();
        script.append_push_data(&data).unwrap();
        let chunks = script.chunks().unwrap();
        prop_assert_eq!(chunks.len(), 1);
        prop_assert_eq!(chunks[0].data.as_deref(), Some(&data[..]));
    }

    /// The push prefix length always matches the encoded chunk overhead.
    #[test]
    fn push_prefix_accounts_for_length(len in 1usize..70000) {
        let prefix = chunk::push_data_prefix(len).unwrap();
        let mut script = Script::new();
        script.append_push_data(&vec![0u8; len]).unwrap();
        prop_assert_eq!(script.len(), prefix.len() + len);
    }

    /// Decoding never panics on arbitrary byte soup.
    #[test]
    fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let script = Script::from_bytes(&bytes);
        let _ = script.chunks();
        let _ = script.script_type();
        let _ = script.to_asm();
    }
}
