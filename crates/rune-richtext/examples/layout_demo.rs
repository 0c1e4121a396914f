use rune_richtext::{
    CursorController, FontCache, FontCollection, HarfrustShaper, LayoutBuilder, LayoutConfig,
    ObstacleFlow, Rect, ValueRuns,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Font path from argv, then RICHTEXT_FONT / richtext.toml.
    let mut config = LayoutConfig::load_or_default("richtext.toml");
    config.merge_with_env();
    let font_path = std::env::args()
        .nth(1)
        .map(Into::into)
        .or(config.font.clone())
        .ok_or_else(|| anyhow::anyhow!("usage: layout_demo <font.ttf>"))?;

    let mut fonts = FontCollection::new();
    let mut cache = FontCache::new();
    let id = cache.get_or_load(&mut fonts, &font_path, 0)?;
    let font = fonts
        .font(id, config.font_size)
        .ok_or_else(|| anyhow::anyhow!("font {id:?} was not registered"))?;

    let text = "Hello שלום, a mixed direction line.\n\tTabbed second paragraph that wraps.";
    let runs = ValueRuns::new(font, text.len());
    let params = config.params(240.0, 0.0);

    let mut builder = LayoutBuilder::new(HarfrustShaper::new(fonts));
    let layout = builder.build(text, &runs, &params)?;

    println!("Text: {text:?}");
    println!("Lines: {}", layout.line_count());
    for (index, line) in layout.lines().iter().enumerate() {
        println!(
            "  line {index}: {:?} width={:.2} height={:.2} rtl={}",
            &text[line.text_range.clone()],
            line.width,
            line.height,
            line.rtl
        );
        for run in layout.runs(line) {
            println!(
                "    run {:?} level={} glyphs={}",
                run.text_range,
                run.level,
                run.glyph_range.len()
            );
        }
    }
    println!();

    let mut cursor = CursorController::new(text);
    for x in [0.0, 40.0, 80.0, 120.0] {
        let position =
            cursor.closest_to_position(&layout, params.area_width, params.x_alignment, x, 4.0)?;
        let caret = cursor.caret(&layout, params.area_width, params.x_alignment, position)?;
        println!(
            "hit x={x:>5.1} -> offset {} ({:?}), caret x={:.2}",
            position.offset, position.affinity, caret.x
        );
    }
    println!();

    let flow = ObstacleFlow::new(Rect::new(0.0, 0.0, 240.0, 400.0), font)
        .with_obstacle(Rect::new(0.0, 20.0, 120.0, 40.0));
    for block in flow.layout(&mut builder, text)? {
        println!(
            "flow block at y={:.1}: bytes {:?}, {} lines, offsets {:?}",
            block.y,
            block.text_range,
            block.layout.line_count(),
            block.line_offsets
        );
    }

    Ok(())
}
