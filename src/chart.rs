// Grouped bar chart of the bits-per-pixel estimates
//
// One group for the sum over all channels, followed by one group per channel.
// Each group has three bars: anchor, plain difference, motion-compensated residual.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

use crate::bitcost::CompressionRatio;
use crate::frame::ChromaFormat;
use crate::pipeline::{ChannelBits, FrameAnalysis};

pub const CHART_WIDTH: u32 = 1200;
pub const CHART_HEIGHT: u32 = 800;

const MARGIN: u32 = 60;
// Room above the plot for the title, legend and axis label
const PLOT_TOP: u32 = 140;
const BASELINE: u32 = CHART_HEIGHT - 70;
const BAR_WIDTH: u32 = 40;
const GROUP_GAP: u32 = 60;

// Glyphs are 8x8 pixels, drawn at an integer scale
const GLYPH_SIZE: u32 = 8;
const TITLE_SCALE: u32 = 3;
const LABEL_SCALE: u32 = 2;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const EDGE: Rgb<u8> = Rgb([128, 128, 128]);
const GRID: Rgb<u8> = Rgb([230, 230, 230]);

// Anchor, difference, residual
const BAR_COLOURS: [Rgb<u8>; 3] = [Rgb([220, 40, 40]), Rgb([40, 160, 40]), Rgb([40, 60, 220])];
const LEGEND: [&str; 3] = ["Initial Frame Size", "Frame Difference Size", "Motion Compensated Frame Size"];

pub const TOTAL_LABEL: &str = "All";
pub const Y_AXIS_LABEL: &str = "Bits per Pixel";

// Text drawn around the bars
#[derive(Clone, Debug, PartialEq)]
pub struct ChartLabels {
  pub title: String,
  // One per bar group: the total first, then each channel
  pub groups: Vec<String>,
  pub legend: [&'static str; 3],
  pub y_axis: &'static str
}

impl ChartLabels {
  pub fn new(format: ChromaFormat, ratio: CompressionRatio) -> Self {
    let mut groups = vec![TOTAL_LABEL.to_string()];
    groups.extend(format.channel_names().iter().map(|name| name.to_string()));

    Self {
      title: format!("Compression Ratio = {}", ratio),
      groups: groups,
      legend: LEGEND,
      y_axis: Y_AXIS_LABEL
    }
  }
}

fn bar_values(bits: &ChannelBits) -> [f64; 3] {
  [bits.anchor, bits.difference, bits.residual]
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, colour: Rgb<u8>) {
  for y in y0..y1.min(img.height()) {
    for x in x0..x1.min(img.width()) {
      img.put_pixel(x, y, colour);
    }
  }
}

fn text_width(text: &str, scale: u32) -> u32 {
  text.chars().count() as u32 * GLYPH_SIZE * scale
}

// Draw `text` with its top-left corner at (x, y)
// Characters without a glyph are left blank; anything past the image edge is clipped
fn draw_text(img: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, colour: Rgb<u8>) {
  for (n, c) in text.chars().enumerate() {
    let glyph = BASIC_FONTS.get(c).unwrap_or([0; 8]);
    let glyph_x = x + n as u32 * GLYPH_SIZE * scale;
    for (row, bits) in glyph.iter().enumerate() {
      for col in 0..GLYPH_SIZE {
        // Bit 0 is the leftmost pixel
        if bits & (1 << col) != 0 {
          let px = glyph_x + col * scale;
          let py = y + row as u32 * scale;
          fill_rect(img, px, py, px + scale, py + scale, colour);
        }
      }
    }
  }
}

// Filled bar with a one pixel outline
fn draw_bar(img: &mut RgbImage, x0: u32, top: u32, baseline: u32, colour: Rgb<u8>) {
  if top >= baseline {
    return;
  }
  fill_rect(img, x0, top, x0 + BAR_WIDTH, baseline, EDGE);
  if baseline - top > 2 {
    fill_rect(img, x0 + 1, top + 1, x0 + BAR_WIDTH - 1, baseline, colour);
  }
}

fn draw_legend(img: &mut RgbImage, legend: &[&str; 3]) {
  let swatch = GLYPH_SIZE * LABEL_SCALE;
  let widest = legend.iter().map(|text| text_width(text, LABEL_SCALE)).max().unwrap_or(0);
  let x = CHART_WIDTH - MARGIN - (swatch + swatch / 2 + widest);

  for (n, text) in legend.iter().enumerate() {
    let y = 56 + n as u32 * (swatch + 8);
    fill_rect(img, x, y, x + swatch, y + swatch, BAR_COLOURS[n]);
    draw_text(img, text, x + swatch + swatch / 2, y, LABEL_SCALE, AXIS);
  }
}

pub fn render_histogram(analysis: &FrameAnalysis, labels: &ChartLabels) -> RgbImage {
  let mut groups = vec![analysis.total];
  groups.extend(analysis.channels.iter().map(|c| c.bits));

  let max_value = groups.iter()
    .flat_map(bar_values)
    .fold(0.0f64, f64::max);
  // Leave some headroom above the tallest bar; an all-zero chart still gets a scale
  let scale_top = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };

  let mut img = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);
  let plot_height = (BASELINE - PLOT_TOP) as f64;
  let label_height = GLYPH_SIZE * LABEL_SCALE;

  let title_x = (CHART_WIDTH.saturating_sub(text_width(&labels.title, TITLE_SCALE))) / 2;
  draw_text(&mut img, &labels.title, title_x, 16, TITLE_SCALE, AXIS);
  draw_legend(&mut img, &labels.legend);
  draw_text(&mut img, labels.y_axis, MARGIN, PLOT_TOP - label_height - 12, LABEL_SCALE, AXIS);

  // Horizontal grid lines at each whole bit, numbered on the axis
  let mut level = 1.0;
  while level < scale_top {
    let y = BASELINE - (level / scale_top * plot_height).round() as u32;
    fill_rect(&mut img, MARGIN, y, CHART_WIDTH - MARGIN, y + 1, GRID);
    let tick = format!("{}", level as u32);
    let tick_x = (MARGIN - 8).saturating_sub(text_width(&tick, LABEL_SCALE));
    draw_text(&mut img, &tick, tick_x, y.saturating_sub(label_height / 2), LABEL_SCALE, AXIS);
    level += 1.0;
  }

  let group_width = 3 * BAR_WIDTH + GROUP_GAP;
  for (g, bits) in groups.iter().enumerate() {
    let group_x = MARGIN + GROUP_GAP / 2 + g as u32 * group_width;
    for (b, value) in bar_values(bits).iter().enumerate() {
      let height = (value / scale_top * plot_height).round() as u32;
      let x = group_x + b as u32 * BAR_WIDTH;
      draw_bar(&mut img, x, BASELINE - height, BASELINE, BAR_COLOURS[b]);
    }

    if let Some(label) = labels.groups.get(g) {
      let label_x = group_x + (3 * BAR_WIDTH).saturating_sub(text_width(label, LABEL_SCALE)) / 2;
      draw_text(&mut img, label, label_x, BASELINE + 14, LABEL_SCALE, AXIS);
    }
  }

  // Axes
  fill_rect(&mut img, MARGIN, BASELINE, CHART_WIDTH - MARGIN, BASELINE + 2, AXIS);
  fill_rect(&mut img, MARGIN - 2, PLOT_TOP, MARGIN, BASELINE + 2, AXIS);

  img
}

#[cfg(test)]
mod tests {
  use super::*;

  fn analysis_with(total: ChannelBits) -> FrameAnalysis {
    FrameAnalysis {
      channels: Vec::new(),
      total: total,
      ratio: CompressionRatio::new(total.anchor, total.residual)
    }
  }

  fn mono_labels(analysis: &FrameAnalysis) -> ChartLabels {
    ChartLabels::new(ChromaFormat::Mono, analysis.ratio)
  }

  fn has_text(img: &RgbImage, y0: u32, y1: u32) -> bool {
    (y0..y1).any(|y| (0..CHART_WIDTH).any(|x| *img.get_pixel(x, y) == AXIS))
  }

  #[test]
  fn labels_name_every_group_and_the_ratio() {
    let colour = ChartLabels::new(ChromaFormat::Cs420, CompressionRatio::Saturated);
    assert_eq!(colour.title, "Compression Ratio = inf");
    assert_eq!(colour.groups, vec!["All", "Y", "U", "V"]);
    assert_eq!(colour.legend[2], "Motion Compensated Frame Size");
    assert_eq!(colour.y_axis, "Bits per Pixel");

    let mono = ChartLabels::new(ChromaFormat::Mono, CompressionRatio::Finite(2.5));
    assert_eq!(mono.title, "Compression Ratio = 2.50");
    assert_eq!(mono.groups, vec!["All", "Y"]);
  }

  #[test]
  fn title_reflects_the_ratio() {
    let analysis = analysis_with(ChannelBits { anchor: 6.0, difference: 3.0, residual: 1.5 });
    let finite = render_histogram(&analysis, &mono_labels(&analysis));
    let saturated = render_histogram(&analysis, &ChartLabels::new(ChromaFormat::Mono, CompressionRatio::Saturated));

    let title_band = |img: &RgbImage| -> Vec<Rgb<u8>> {
      (16..16 + GLYPH_SIZE * TITLE_SCALE)
        .flat_map(|y| (0..CHART_WIDTH).map(move |x| (x, y)))
        .map(|(x, y)| *img.get_pixel(x, y))
        .collect()
    };
    assert!(has_text(&finite, 16, 16 + GLYPH_SIZE * TITLE_SCALE));
    assert_ne!(title_band(&finite), title_band(&saturated));
  }

  #[test]
  fn group_labels_are_drawn_under_the_axis() {
    let analysis = analysis_with(ChannelBits { anchor: 2.0, difference: 1.0, residual: 0.5 });
    let blank = ChartLabels { groups: Vec::new(), ..mono_labels(&analysis) };

    let labelled = render_histogram(&analysis, &mono_labels(&analysis));
    let unlabelled = render_histogram(&analysis, &blank);
    assert!(has_text(&labelled, BASELINE + 14, CHART_HEIGHT));
    assert!(!has_text(&unlabelled, BASELINE + 14, CHART_HEIGHT));
  }

  #[test]
  fn tallest_bar_is_the_largest_value() {
    let analysis = analysis_with(ChannelBits { anchor: 6.0, difference: 3.0, residual: 1.5 });
    let img = render_histogram(&analysis, &mono_labels(&analysis));
    assert_eq!(img.dimensions(), (CHART_WIDTH, CHART_HEIGHT));

    let column_height = |x: u32| (0..CHART_HEIGHT).filter(|&y| BAR_COLOURS.contains(img.get_pixel(x, y))).count();
    let group_x = MARGIN + GROUP_GAP / 2;
    let anchor = column_height(group_x + BAR_WIDTH / 2);
    let difference = column_height(group_x + BAR_WIDTH + BAR_WIDTH / 2);
    let residual = column_height(group_x + 2 * BAR_WIDTH + BAR_WIDTH / 2);
    assert!(anchor > difference && difference > residual && residual > 0);
  }

  #[test]
  fn all_zero_chart_has_no_bars() {
    let analysis = analysis_with(ChannelBits::default());
    let img = render_histogram(&analysis, &mono_labels(&analysis));
    // Only the legend swatches, which sit above the plot, use the bar colours
    for y in PLOT_TOP..CHART_HEIGHT {
      for x in 0..CHART_WIDTH {
        assert!(!BAR_COLOURS.contains(img.get_pixel(x, y)));
      }
    }
  }
}
