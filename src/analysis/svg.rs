use crate::models::chart::{ChartLayout, ChartRender, Label, TextAnchor};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

const BAR_FILL: RGBColor = RGBColor(0x3b, 0x82, 0xf6);
const GRID_STROKE: RGBColor = RGBColor(0xe5, 0xe7, 0xeb);
const VALUE_FILL: RGBColor = RGBColor(0x37, 0x41, 0x51);
const AXIS_FILL: RGBColor = RGBColor(0x6b, 0x72, 0x80);

/// Draw chart geometry onto an SVG surface of the layout's size.
///
/// Coordinates are rounded to whole pixels; identical input gives identical bytes.
pub fn render_svg(render: &ChartRender) -> Result<String, Box<dyn std::error::Error>> {
    let layout = match render {
        ChartRender::Empty { layout, .. } => layout,
        ChartRender::Bars(geometry) => &geometry.layout,
    };

    let mut svg_buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut svg_buffer, surface(layout)).into_drawing_area();

        match render {
            ChartRender::Empty { layout, message } => {
                let style = text_style(14.0, &AXIS_FILL, HPos::Center);
                let centre = (px(layout.width / 2.0), px(layout.height / 2.0));
                root.draw(&Text::new(message.as_str(), centre, style))?;
            }
            ChartRender::Bars(geometry) => {
                for line in &geometry.grid {
                    let y = px(line.y);
                    root.draw(&PathElement::new(
                        vec![(px(line.x_start), y), (px(line.x_end), y)],
                        GRID_STROKE.stroke_width(1),
                    ))?;
                    draw_label(&root, &line.label, 10.0, &AXIS_FILL)?;
                }

                for bar in &geometry.bars {
                    root.draw(&Rectangle::new(
                        [
                            (px(bar.x), px(bar.y)),
                            (px(bar.x + bar.width), px(bar.y + bar.height)),
                        ],
                        BAR_FILL.filled(),
                    ))?;
                    draw_label(&root, &bar.value_label, 12.0, &VALUE_FILL)?;
                    draw_label(&root, &bar.date_label, 10.0, &AXIS_FILL)?;
                }
            }
        }

        root.present()?;
    }

    Ok(svg_buffer)
}

fn draw_label(
    root: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    label: &Label,
    font_size: f64,
    fill: &RGBColor,
) -> Result<(), Box<dyn std::error::Error>> {
    let anchor = match label.anchor {
        TextAnchor::Middle => HPos::Center,
        TextAnchor::End => HPos::Right,
    };
    let style = text_style(font_size, fill, anchor);
    root.draw(&Text::new(label.text.as_str(), (px(label.x), px(label.y)), style))?;
    Ok(())
}

fn text_style(font_size: f64, fill: &RGBColor, anchor: HPos) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, font_size, FontStyle::Normal)
        .color(fill)
        .pos(Pos::new(anchor, VPos::Bottom))
}

fn surface(layout: &ChartLayout) -> (u32, u32) {
    (layout.width.round().max(1.0) as u32, layout.height.round().max(1.0) as u32)
}

fn px(value: f64) -> i32 {
    value.round() as i32
}
