//! Block layout for the wireframe renderer.
//!
//! Every text-bearing block becomes a box stacked vertically; there is no
//! inline formatting, floats, or positioning.

use scraper::ElementRef;

/// Width of one glyph cell in CSS pixels at text scale 1.
pub const CELL: u32 = 8;

pub type Rgba = (u8, u8, u8, u8);

pub const TEXT_COLOR: Rgba = (34, 34, 34, 255);
pub const PLACEHOLDER_COLOR: Rgba = (214, 214, 214, 255);

const TEXT_BLOCKS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "blockquote", "figcaption", "pre", "td", "th",
    "dt", "dd", "button", "label", "caption",
];

const SKIPPED: &[&str] = &["script", "style", "template", "noscript", "title", "meta", "link"];

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub border: u32,
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    pub fn bottom(&self) -> u32 {
        (self.rect.y.max(0) as u32) + self.rect.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Title,
    Paragraph,
    Image,
    Rule,
    /// A container painted only for its background
    Block,
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub text: String,
    pub elem_type: ElementType,
    pub scale: u32,
    pub background: Option<Rgba>,
    pub color: Rgba,
}

/// The subset of an inline `style` attribute the renderer understands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    pub background: Option<Rgba>,
    pub color: Option<Rgba>,
}

impl InlineStyle {
    pub fn parse(style: Option<&str>) -> Self {
        let mut out = InlineStyle::default();
        for decl in style.unwrap_or_default().split(';') {
            let Some((prop, value)) = decl.split_once(':') else {
                continue;
            };
            match prop.trim().to_ascii_lowercase().as_str() {
                "background" | "background-color" => {
                    if let Some(c) = value.split_whitespace().find_map(parse_color) {
                        out.background = Some(c);
                    }
                }
                "color" => out.color = parse_color(value.trim()).or(out.color),
                _ => {}
            }
        }
        out
    }
}

/// `#rgb`, `#rrggbb` and a handful of keywords.
pub fn parse_color(value: &str) -> Option<Rgba> {
    let v = value.trim().to_ascii_lowercase();
    if let Some(hex) = v.strip_prefix('#') {
        let digits = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => hex.to_string(),
            _ => return None,
        };
        let n = u32::from_str_radix(&digits, 16).ok()?;
        return Some(((n >> 16) as u8, (n >> 8) as u8, n as u8, 255));
    }
    match v.as_str() {
        "white" => Some((255, 255, 255, 255)),
        "black" => Some((0, 0, 0, 255)),
        "red" => Some((255, 0, 0, 255)),
        "green" => Some((0, 128, 0, 255)),
        "blue" => Some((0, 0, 255, 255)),
        "gray" | "grey" => Some((128, 128, 128, 255)),
        _ => None,
    }
}

/// Lay out `root` and its descendants into a `width`-wide column.
pub fn layout_subtree(root: ElementRef<'_>, width: u32) -> Vec<LayoutNode> {
    let mut ctx = LayoutContext {
        width,
        y: 8,
        nodes: Vec::new(),
    };
    ctx.visit(root, TEXT_COLOR);
    ctx.nodes
}

/// Total height needed by `nodes`, including the bottom margin.
pub fn content_height(nodes: &[LayoutNode]) -> u32 {
    nodes.iter().map(|n| n.lb.bottom()).max().unwrap_or(0) + 8
}

struct LayoutContext {
    width: u32,
    y: u32,
    nodes: Vec<LayoutNode>,
}

impl LayoutContext {
    fn visit(&mut self, el: ElementRef<'_>, inherited_color: Rgba) {
        let name = el.value().name();
        if SKIPPED.contains(&name) {
            return;
        }
        let style = InlineStyle::parse(el.value().attr("style"));
        let color = style.color.unwrap_or(inherited_color);

        match name {
            "img" => self.push_image(el, style.background),
            "hr" => self.push_rule(),
            n if TEXT_BLOCKS.contains(&n) => {
                let text = el.text().collect::<String>();
                let kind = match n {
                    "h1" | "h2" => ElementType::Title,
                    _ => ElementType::Paragraph,
                };
                self.push_text(kind, &text, style.background, color);
            }
            _ => {
                let start_idx = self.nodes.len();
                let start_y = self.y;
                let mut direct = String::new();
                for child in el.children() {
                    if let Some(text) = child.value().as_text() {
                        direct.push_str(text);
                    } else if let Some(child_el) = ElementRef::wrap(child) {
                        self.push_text(ElementType::Paragraph, &direct, None, color);
                        direct.clear();
                        self.visit(child_el, color);
                    }
                }
                self.push_text(ElementType::Paragraph, &direct, None, color);

                if let Some(bg) = style.background {
                    if self.y > start_y {
                        let lb = self.full_width_box(start_y, self.y - start_y, 0);
                        self.nodes.insert(
                            start_idx,
                            LayoutNode {
                                lb,
                                text: String::new(),
                                elem_type: ElementType::Block,
                                scale: 1,
                                background: Some(bg),
                                color,
                            },
                        );
                    }
                }
            }
        }
    }

    fn full_width_box(&self, y: u32, height: u32, padding: u32) -> LayoutBox {
        LayoutBox {
            rect: Rect {
                x: 8,
                y: y as i32,
                width: self.width.saturating_sub(16),
                height,
            },
            box_model: BoxModel {
                margin: 8,
                border: 0,
                padding,
            },
        }
    }

    fn push_text(&mut self, kind: ElementType, text: &str, background: Option<Rgba>, color: Rgba) {
        if text.trim().is_empty() {
            return;
        }
        let scale = if kind == ElementType::Title { 2 } else { 1 };
        let padding = if kind == ElementType::Title { 8 } else { 6 };
        let content_w = self.width.saturating_sub(16).saturating_sub(padding * 2);
        let chars_per_line = ((content_w / (CELL * scale)) as usize).max(1);
        let wrapped = wrap(text, chars_per_line);
        let lines_count = (wrapped.lines().count() as u32).max(1);
        let box_h = lines_count * CELL * scale + padding * 2;

        let lb = self.full_width_box(self.y, box_h, padding);
        self.nodes.push(LayoutNode {
            lb,
            text: wrapped,
            elem_type: kind,
            scale,
            background,
            color,
        });
        self.y += box_h + padding;
    }

    fn push_image(&mut self, el: ElementRef<'_>, background: Option<Rgba>) {
        let attr = |name: &str| el.value().attr(name).and_then(|v| v.trim().parse::<u32>().ok());
        let max_w = self.width.saturating_sub(16).max(1);
        let mut w = attr("width").unwrap_or(96).max(1);
        let mut h = attr("height").unwrap_or(64).max(1);
        if w > max_w {
            h = ((h as u64 * max_w as u64) / w as u64).max(1) as u32;
            w = max_w;
        }
        let lb = LayoutBox {
            rect: Rect {
                x: 8,
                y: self.y as i32,
                width: w,
                height: h,
            },
            box_model: BoxModel {
                margin: 8,
                border: 0,
                padding: 0,
            },
        };
        self.nodes.push(LayoutNode {
            lb,
            text: el.value().attr("alt").unwrap_or_default().to_string(),
            elem_type: ElementType::Image,
            scale: 1,
            background: Some(background.unwrap_or(PLACEHOLDER_COLOR)),
            color: TEXT_COLOR,
        });
        self.y += h + 8;
    }

    fn push_rule(&mut self) {
        let lb = self.full_width_box(self.y, 2, 0);
        self.nodes.push(LayoutNode {
            lb,
            text: String::new(),
            elem_type: ElementType::Rule,
            scale: 1,
            background: Some(PLACEHOLDER_COLOR),
            color: TEXT_COLOR,
        });
        self.y += 2 + 8;
    }
}

fn wrap(text: &str, chars_per_line: usize) -> String {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let cur_len = cur.chars().count();
        if cur_len + word.chars().count() + 1 > chars_per_line && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
            cur.push_str(word);
        } else {
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(word);
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines.join("\n")
}
