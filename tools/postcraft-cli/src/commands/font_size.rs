//! Show the sizes a headline gets while editing and on export.

use postcraft_render_engine::sizing::{
    compute_export_font_size, editing_font_px, editing_word_count, EditingFontSize,
};

pub fn run(text: &str, width: f64) -> anyhow::Result<()> {
    let length = text.chars().count();
    let px = editing_font_px(text, width);
    let bucket = EditingFontSize::from_px(px);

    println!("Headline: {text}");
    println!("  Characters: {length}");
    println!("  Words: {}", editing_word_count(text));
    println!("  Export font size: {}px", compute_export_font_size(length));
    println!(
        "  Editing size: {px:.1}px -> {} ({}px)",
        bucket.class_name(),
        bucket.px()
    );
    Ok(())
}
