//! Display list built from layout nodes

use super::layout::{ElementType, LayoutNode, Rgba};

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: Rgba,
    },
}

/// Backgrounds first, then content, in layout order.
pub fn build_display_list(nodes: &[LayoutNode]) -> Vec<PaintCommand> {
    let mut cmds = Vec::new();
    for node in nodes {
        let rect = &node.lb.rect;
        if let Some(bg) = node.background {
            cmds.push(PaintCommand::SolidRect {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                rgba: bg,
            });
        }
        match node.elem_type {
            ElementType::Title | ElementType::Paragraph => {
                let pad = node.lb.box_model.padding as i32;
                cmds.push(PaintCommand::Text {
                    x: rect.x + pad,
                    y: rect.y + pad,
                    text: node.text.clone(),
                    scale: node.scale,
                    rgba: node.color,
                });
            }
            ElementType::Image | ElementType::Rule | ElementType::Block => {}
        }
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::{BoxModel, LayoutBox, Rect, TEXT_COLOR};

    #[test]
    fn background_precedes_text() {
        let node = LayoutNode {
            lb: LayoutBox {
                rect: Rect { x: 8, y: 8, width: 100, height: 20 },
                box_model: BoxModel { margin: 8, border: 0, padding: 6 },
            },
            text: "hi".into(),
            elem_type: ElementType::Paragraph,
            scale: 1,
            background: Some((255, 0, 0, 255)),
            color: TEXT_COLOR,
        };
        let cmds = build_display_list(&[node]);
        assert_eq!(cmds.len(), 2);
        match &cmds[0] {
            PaintCommand::SolidRect { width, rgba, .. } => {
                assert_eq!(*width, 100);
                assert_eq!(*rgba, (255, 0, 0, 255));
            }
            _ => panic!("unexpected"),
        }
        match &cmds[1] {
            PaintCommand::Text { x, y, .. } => assert_eq!((*x, *y), (14, 14)),
            _ => panic!("unexpected"),
        }
    }
}
