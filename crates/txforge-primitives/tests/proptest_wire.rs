use proptest::prelude::*;

use txforge_primitives::{ByteReader, ByteWriter, TxHash, VarInt};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any u64 survives a VarInt encode/decode round-trip.
    #[test]
    fn varint_roundtrip(value in any::<u64>()) {
        let mut writer = ByteWriter::new();
        writer.write_varint(VarInt(value));
        let data = writer.into_bytes();
        let mut reader = ByteReader::new(&data);
        prop_assert_eq!(reader.read_varint().unwrap(), VarInt(value));
        prop_assert_eq!(reader.remaining(), 0);
    }

    /// Length-prefixed byte strings round-trip through the writer/reader.
    #[test]
    fn var_bytes_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut writer = ByteWriter::new();
        writer.write_var_bytes(&bytes);
        let data = writer.into_bytes();
        let mut reader = ByteReader::new(&data);
        let len = reader.read_varint().unwrap().value() as usize;
        prop_assert_eq!(reader.read_bytes(len).unwrap(), &bytes[..]);
    }

    /// Transaction hashes round-trip through display hex.
    #[test]
    fn txhash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = TxHash::new(bytes);
        let parsed = TxHash::from_hex(&hash.to_hex()).unwrap();
        prop_assert_eq!(hash, parsed);
    }
}
