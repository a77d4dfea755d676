use rushkit::formats::bb::Bb;
use rushkit::formats::bbg::{Bbg, BbgHeader, EncodeOptions};
use rushkit::graphics::{IndexedImage, Palette, decode_palette};

fn palette16() -> Palette {
    let raw: Vec<u8> = (0..16u16)
        .flat_map(|i| (i | (31 - i) << 5 | (i * 2) << 10).to_le_bytes())
        .collect();
    decode_palette(&raw)
}

fn pattern(w: usize, h: usize, modulo: usize) -> IndexedImage {
    let pixels = (0..w * h).map(|i| ((i * 7 + i / w) % modulo) as u8).collect();
    IndexedImage::from_pixels(w, h, pixels).unwrap()
}

fn encode(color_format: i32, palette: Option<Palette>, image: &IndexedImage) -> Vec<u8> {
    let mut bbg = Bbg::new(BbgHeader::new(color_format, 0), palette);
    bbg.encode(image, &EncodeOptions::default()).unwrap()
}

#[test]
fn archive_of_backgrounds() {
    let small = pattern(16, 8, 16);
    let large = pattern(32, 16, 256);

    let bb = Bb::from_entries(vec![
        encode(1, Some(palette16()), &small),
        encode(2, None, &large),
    ]);
    let bytes = bb.save().unwrap();
    let bb = Bb::parse(&bytes).unwrap();
    assert_eq!(bb.len(), 2);

    let first = bb.bbg(0).unwrap();
    assert_eq!(first.palette.as_ref(), Some(&palette16()));
    let image = first.to_image(None);
    assert_eq!(image.pixels(), small.pixels());
    assert_eq!(image.palette, palette16());

    let second = bb.bbg(1).unwrap();
    assert!(second.palette.is_none());
    let image = second.to_image(None);
    assert_eq!((image.width(), image.height()), (32, 16));
    assert_eq!(image.pixels(), large.pixels());
    assert_eq!(image.palette, Palette::placeholder());
}

#[test]
fn replaced_entry_survives_save() {
    let original = pattern(8, 8, 16);
    let edited = pattern(8, 8, 5);

    let mut bb = Bb::from_entries(vec![
        encode(1, Some(palette16()), &original),
        vec![0xAB; 6],
    ]);
    let mut bbg = bb.bbg(0).unwrap();
    let bytes = bbg.encode(&edited, &EncodeOptions::default()).unwrap();
    bb.replace(0, bytes).unwrap();

    let bb = Bb::parse(&bb.save().unwrap()).unwrap();
    assert_eq!(bb.bbg(0).unwrap().to_image(None).pixels(), edited.pixels());
    assert_eq!(bb.contents[1], vec![0xAB; 6]);
    assert!(bb.bbg(1).is_err());
}

#[test]
fn external_palette_replaces_own() {
    let image = pattern(8, 8, 4);
    let bbg = Bbg::parse(&encode(1, None, &image)).unwrap();

    let external = palette16();
    let out = bbg.to_image(Some(&external));
    assert_eq!(out.palette, external);
    assert_eq!(out.pixels(), image.pixels());
}
