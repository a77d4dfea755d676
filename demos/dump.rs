use std::env;
use std::fs;
use std::path::Path;

use rushkit::Result;
use rushkit::formats::bac::Bac;
use rushkit::formats::bb::Bb;
use rushkit::formats::bbg::Bbg;

fn dump_bbg(bbg: &Bbg) {
    let h = &bbg.header;
    println!(
        "  {}x{} tiles, color format {}, bank {}, vram offset {:#x}",
        h.row_length,
        h.row_count,
        h.color_format,
        h.palette_bank(),
        bbg.vram_offset
    );
    println!(
        "  {} unique tiles, palette: {}",
        bbg.tiles.len(),
        bbg.palette.as_ref().map_or(0, |p| p.len())
    );
}

fn main() -> Result<()> {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: dump <file.bac|file.bbg|file.bb>");
        return Ok(());
    };
    let data = fs::read(&path)?;

    match Path::new(&path).extension().and_then(|e| e.to_str()) {
        Some("bac") => {
            let bac = Bac::parse(data)?;
            println!("{} frames", bac.frames.len());
            for (i, frame) in bac.frames.iter().enumerate() {
                println!(
                    "frame {i}: {}x{}, hot spot {:?}, {} parts",
                    frame.width(),
                    frame.height(),
                    frame.hot_spot,
                    frame.parts.len()
                );
                for part in &frame.parts {
                    let p = &part.placement;
                    println!(
                        "  {:?} {}x{} at ({}, {}), data {:#x}, {} tiles",
                        p.shape, p.width, p.height, p.x, p.y, part.data_offset, part.tile_count
                    );
                }
            }
        }
        Some("bbg") => dump_bbg(&Bbg::parse(&data)?),
        Some("bb") => {
            let bb = Bb::parse(&data)?;
            println!("{} entries", bb.len());
            for i in 0..bb.len() {
                println!("entry {i}:");
                match bb.bbg(i) {
                    Ok(bbg) => dump_bbg(&bbg),
                    Err(e) => println!("  skipped: {e}"),
                }
            }
        }
        _ => eprintln!("unrecognised extension: {path}"),
    }

    Ok(())
}
