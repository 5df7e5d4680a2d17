//! Styled SVG paths that make up one rendered block.
//!
//! The basic variant draws a single outlined path. The geras variant adds a
//! light highlight path along the top-left edges and a dark path offset one
//! pixel down and right to give blocks depth.

use super::colour::{self, BlockStyle};
use serde::Serialize;
use std::fmt;

const EMBOSS_FILTER: &str = "url(#embossFilter)";
const DISABLED_PATTERN: &str = "url(#disabledPattern)";
const DARK_PATH_TRANSFORM: &str = "translate(1,1)";
const RTL_TRANSFORM: &str = "scale(-1 1)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRole {
    Main,
    Light,
    Dark,
}

/// One `<path>` element with its presentation attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathLayer {
    pub role: PathRole,
    pub d: String,
    pub fill: String,
    pub stroke: Option<String>,
    pub transform: Option<String>,
    pub filter: Option<String>,
    pub visible: bool,
}

impl PathLayer {
    fn new(role: PathRole) -> Self {
        Self {
            role,
            d: String::new(),
            fill: "none".to_string(),
            stroke: None,
            transform: None,
            filter: None,
            visible: true,
        }
    }
}

/// The drawable paths of one block and their styling state.
pub trait PathObject: fmt::Debug {
    fn set_path(&mut self, d: &str);

    /// Only variants that draw a highlight keep this path.
    fn set_highlight_path(&mut self, _d: &str) {}

    /// Mirrors every path around the block origin.
    fn flip_rtl(&mut self);

    fn set_style(&mut self, style: BlockStyle);

    fn style(&self) -> &BlockStyle;

    /// Resets fills and strokes from the style, then applies shadow and disabled looks.
    fn apply_colour(&mut self, is_shadow: bool, disabled: bool);

    fn update_highlighted(&mut self, highlighted: bool);

    fn update_disabled(&mut self, disabled: bool);

    fn update_shadow(&mut self, shadow: bool);

    /// Paths in paint order.
    fn layers(&self) -> Vec<PathLayer>;
}

#[derive(Debug, Clone)]
pub struct BasicPathObject {
    style: BlockStyle,
    main: PathLayer,
}

impl BasicPathObject {
    pub fn new(style: BlockStyle) -> Self {
        let mut object = Self {
            style,
            main: PathLayer::new(PathRole::Main),
        };
        object.apply_colour(false, false);
        object
    }
}

impl PathObject for BasicPathObject {
    fn set_path(&mut self, d: &str) {
        self.main.d = d.to_string();
    }

    fn flip_rtl(&mut self) {
        self.main.transform = Some(RTL_TRANSFORM.to_string());
    }

    fn set_style(&mut self, style: BlockStyle) {
        self.style = style;
    }

    fn style(&self) -> &BlockStyle {
        &self.style
    }

    fn apply_colour(&mut self, is_shadow: bool, disabled: bool) {
        self.main.stroke = Some(self.style.colour_tertiary.clone());
        self.main.fill = self.style.colour_primary.clone();
        self.update_shadow(is_shadow);
        self.update_disabled(disabled);
    }

    fn update_highlighted(&mut self, highlighted: bool) {
        self.main.filter = highlighted.then(|| EMBOSS_FILTER.to_string());
    }

    fn update_disabled(&mut self, disabled: bool) {
        if disabled {
            self.main.fill = DISABLED_PATTERN.to_string();
        }
    }

    fn update_shadow(&mut self, shadow: bool) {
        if shadow {
            self.main.stroke = Some("none".to_string());
            self.main.fill = self.style.colour_secondary.clone();
        }
    }

    fn layers(&self) -> Vec<PathLayer> {
        vec![self.main.clone()]
    }
}

#[derive(Debug, Clone)]
pub struct GerasPathObject {
    style: BlockStyle,
    colour_dark: String,
    main: PathLayer,
    light: PathLayer,
    dark: PathLayer,
}

impl GerasPathObject {
    pub fn new(style: BlockStyle) -> Self {
        let mut dark = PathLayer::new(PathRole::Dark);
        dark.transform = Some(DARK_PATH_TRANSFORM.to_string());
        let mut object = Self {
            colour_dark: dark_colour(&style),
            style,
            main: PathLayer::new(PathRole::Main),
            light: PathLayer::new(PathRole::Light),
            dark,
        };
        object.apply_colour(false, false);
        object
    }

    pub fn colour_dark(&self) -> &str {
        &self.colour_dark
    }
}

fn dark_colour(style: &BlockStyle) -> String {
    colour::blend("#000000", &style.colour_primary, 0.2)
        .unwrap_or_else(|| style.colour_primary.clone())
}

impl PathObject for GerasPathObject {
    fn set_path(&mut self, d: &str) {
        self.main.d = d.to_string();
        self.dark.d = d.to_string();
    }

    fn set_highlight_path(&mut self, d: &str) {
        self.light.d = d.to_string();
    }

    fn flip_rtl(&mut self) {
        self.main.transform = Some(RTL_TRANSFORM.to_string());
        self.light.transform = Some(RTL_TRANSFORM.to_string());
        self.dark.transform = Some(format!("{} {}", DARK_PATH_TRANSFORM, RTL_TRANSFORM));
    }

    fn set_style(&mut self, style: BlockStyle) {
        self.colour_dark = dark_colour(&style);
        self.style = style;
    }

    fn style(&self) -> &BlockStyle {
        &self.style
    }

    fn apply_colour(&mut self, is_shadow: bool, disabled: bool) {
        self.light.visible = true;
        self.dark.visible = true;
        self.light.stroke = Some(self.style.colour_tertiary.clone());
        self.dark.fill = self.colour_dark.clone();
        self.main.fill = self.style.colour_primary.clone();
        self.main.stroke = Some("none".to_string());
        self.update_shadow(is_shadow);
        self.update_disabled(disabled);
    }

    fn update_highlighted(&mut self, highlighted: bool) {
        self.main.filter = highlighted.then(|| EMBOSS_FILTER.to_string());
        self.light.visible = !highlighted;
    }

    fn update_disabled(&mut self, disabled: bool) {
        if disabled {
            self.main.fill = DISABLED_PATTERN.to_string();
            self.main.stroke = Some("none".to_string());
        }
    }

    fn update_shadow(&mut self, shadow: bool) {
        if shadow {
            self.light.visible = false;
            self.dark.fill = self.style.colour_secondary.clone();
            self.main.stroke = Some("none".to_string());
            self.main.fill = self.style.colour_secondary.clone();
        }
    }

    fn layers(&self) -> Vec<PathLayer> {
        vec![self.dark.clone(), self.main.clone(), self.light.clone()]
    }
}
