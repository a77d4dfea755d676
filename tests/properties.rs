use proptest::prelude::*;

use rushkit::compression::{lz77, read_compressed};
use rushkit::graphics::{BitDepth, IndexedImage, decode_tiles, encode_tiles};

proptest! {
    #[test]
    fn lz77_roundtrip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let packed = lz77::compress(&data).unwrap();
        prop_assert_eq!(lz77::decompress(&packed, 0).unwrap(), data);
    }

    #[test]
    fn lz77_roundtrip_repetitive(data in prop::collection::vec(0u8..3, 0..2048)) {
        let packed = lz77::compress(&data).unwrap();
        prop_assert_eq!(read_compressed(&packed, 0).unwrap(), data);
    }

    #[test]
    fn tiles_4bpp_roundtrip(pixels in (1usize..8).prop_flat_map(|n| {
        prop::collection::vec(0u8..16, n * 64)
    })) {
        let image = IndexedImage::from_pixels(8, pixels.len() / 8, pixels).unwrap();
        let tiles = image.to_tiles();
        let packed = encode_tiles(&tiles, BitDepth::Bpp4).unwrap();
        prop_assert_eq!(packed.len(), tiles.len() * 32);
        prop_assert_eq!(decode_tiles(&packed, BitDepth::Bpp4), tiles);
    }

    #[test]
    fn tiles_8bpp_roundtrip(tile_count in 1usize..8, seed in any::<u8>()) {
        let pixels: Vec<u8> = (0..tile_count * 64)
            .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
            .collect();
        let image = IndexedImage::from_pixels(8, tile_count * 8, pixels).unwrap();
        let tiles = image.to_tiles();
        let packed = encode_tiles(&tiles, BitDepth::Bpp8).unwrap();
        prop_assert_eq!(decode_tiles(&packed, BitDepth::Bpp8), tiles);
    }
}
