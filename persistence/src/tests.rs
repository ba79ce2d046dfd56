//! Cross-module tests for the persistence crate

#[cfg(test)]
mod tests {
    use crate::ArtifactCodec;
    use crate::ArtifactKind;
    use crate::CompressionLevel;
    use crate::FrameHeader;
    use crate::read_if_exists;
    use crate::write_atomic;
    use proptest::prelude::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[test]
    fn test_framed_file_survives_disk_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legal_index.plx");
        let codec = ArtifactCodec::new(CompressionLevel::Maximum);
        let header = FrameHeader {
            kind: ArtifactKind::VectorIndex,
            build_id: Uuid::new_v4(),
        };

        let bytes = codec.encode(header, &[3u8; 4096]).unwrap();
        write_atomic(&path, &bytes).unwrap();

        let on_disk = read_if_exists(&path).unwrap().unwrap();
        let peeked = codec.read_header(&on_disk, ArtifactKind::VectorIndex).unwrap();
        assert_eq!(peeked.build_id, header.build_id);

        let (_, payload) = codec.decode(&on_disk, ArtifactKind::VectorIndex).unwrap();
        assert_eq!(payload.len(), 4096);
    }

    proptest! {
        #[test]
        fn prop_arbitrary_payload_is_recovered(payload in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let codec = ArtifactCodec::default();
            let header = FrameHeader { kind: ArtifactKind::Metadata, build_id: Uuid::new_v4() };

            let bytes = codec.encode(header, &payload).unwrap();
            let (decoded_header, decoded) = codec.decode(&bytes, ArtifactKind::Metadata).unwrap();

            prop_assert_eq!(decoded_header, header);
            prop_assert_eq!(decoded, payload);
        }
    }
}
